//! Executed-script tracking.
//!
//! Browsers run a `<script>` element once; a script node carried across a
//! soft navigation must not run again, while scripts new to the page must
//! run exactly once. The registry keys external scripts by canonicalized
//! `src` and decides, per script, whether the merge installs a fresh
//! (runnable) clone or drops the node.

use rustc_hash::FxHashSet;

use crate::core::{Location, canonicalize_same_site};
use crate::dom::{Element, Node};

/// Collapse parent-directory segments out of a script path.
///
/// `/guide/../js/app.js` and `/js/app.js` load the same resource and must
/// dedupe against each other.
pub fn canonical_path(path: &str) -> String {
    let mut out = path.to_string();
    while out.contains("../") {
        out = out.replace("../", "");
    }
    out
}

// =============================================================================
// Registry
// =============================================================================

/// Set of external script sources that have already executed.
#[derive(Debug, Default)]
pub struct ExecutedScripts {
    seen: FxHashSet<String>,
}

impl ExecutedScripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Record a source as executed. Returns `true` if it was new.
    pub fn register(&mut self, src: &str, location: &Location) -> bool {
        self.seen.insert(self.key(src, location))
    }

    /// Whether a source has already executed.
    pub fn is_registered(&self, src: &str, location: &Location) -> bool {
        self.seen.contains(&self.key(src, location))
    }

    /// Registered sources, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }

    /// Record every external script already present in a subtree.
    ///
    /// Run once against the initial document so scripts the server rendered
    /// are not re-executed by the first soft navigation.
    pub fn seed_from(&mut self, el: &Element, location: &Location) {
        if el.tag == "script"
            && let Some(src) = el.attr("src")
        {
            self.register(src, location);
        }
        for child in &el.children {
            if let Node::Element(e) = child {
                self.seed_from(e, location);
            }
        }
    }

    fn key(&self, src: &str, location: &Location) -> String {
        canonical_path(&canonicalize_same_site(src, location))
    }
}

// =============================================================================
// Disposition
// =============================================================================

/// What the merge should do with an incoming script element.
#[derive(Debug)]
pub enum ScriptDisposition {
    /// Already executed; drop the node.
    Skip,
    /// Install this fresh clone so the host executes it.
    Execute(Element),
}

/// Decide the fate of an incoming script and update the registry.
///
/// External scripts are deduped by canonicalized source. Inline scripts
/// always execute; there is no identity to dedupe them on.
pub fn disposition(
    script: &Element,
    registry: &mut ExecutedScripts,
    location: &Location,
) -> ScriptDisposition {
    if let Some(src) = script.attr("src") {
        if registry.is_registered(src, location) {
            return ScriptDisposition::Skip;
        }
        registry.register(src, location);

        // A fresh element is required: hosts only execute scripts inserted
        // as new nodes, never ones whose parent moved.
        let mut fresh = Element::new("script");
        for (name, value) in &script.attrs {
            if name == "src" {
                fresh.set_attr("src", canonicalize_same_site(value, location));
            } else {
                fresh.set_attr(name.clone(), value.clone());
            }
        }
        fresh.children = script.children.clone();
        ScriptDisposition::Execute(fresh)
    } else {
        let mut fresh = Element::new("script");
        fresh.attrs = script.attrs.clone();
        fresh.children = script.children.clone();
        ScriptDisposition::Execute(fresh)
    }
}

/// Replace every script inside a subtree with its fresh clone, dropping the
/// already-executed ones. Returns the sources of scripts that will execute.
///
/// `<noscript>` subtrees are left alone; their content is inert.
pub fn refresh_embedded(
    el: &mut Element,
    registry: &mut ExecutedScripts,
    location: &Location,
) -> Vec<String> {
    let mut executed = Vec::new();
    refresh_in(el, registry, location, &mut executed);
    executed
}

fn refresh_in(
    el: &mut Element,
    registry: &mut ExecutedScripts,
    location: &Location,
    executed: &mut Vec<String>,
) {
    let mut idx = 0;
    while idx < el.children.len() {
        let Some(child) = el.children[idx].as_element_mut() else {
            idx += 1;
            continue;
        };

        if child.tag == "noscript" {
            idx += 1;
            continue;
        }

        if child.tag == "script" {
            match disposition(child, registry, location) {
                ScriptDisposition::Skip => {
                    el.children.remove(idx);
                    continue;
                }
                ScriptDisposition::Execute(fresh) => {
                    if let Some(src) = fresh.attr("src") {
                        executed.push(src.to_string());
                    }
                    el.children[idx] = Node::Element(Box::new(fresh));
                }
            }
        } else {
            refresh_in(child, registry, location, executed);
        }
        idx += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================
