//! Head reconciliation.
//!
//! Merges an incoming page's `<head>` into the live one. Stylesheets are
//! identity-keyed and survive across navigations (a sheet already loading
//! must never be torn out and re-requested), preconnect hints are deduped
//! by href, scripts go through the executed-script registry, and everything
//! else from the old head is scheduled for removal after the body swap.

use rustc_hash::FxHashSet;

use crate::core::{Location, canonicalize_same_site};
use crate::dom::{Document, Element, Node, render};
use crate::engine::scripts::{self, ExecutedScripts, ScriptDisposition};

/// Role of a head node during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadNodeKind {
    Stylesheet,
    Script,
    PreconnectHint,
    Other,
}

/// Classify a node from tag name and attributes alone.
pub fn classify(el: &Element) -> HeadNodeKind {
    match el.tag.as_str() {
        "script" => HeadNodeKind::Script,
        "style" => HeadNodeKind::Stylesheet,
        "link" => match el.attr("rel") {
            Some("stylesheet") => HeadNodeKind::Stylesheet,
            Some("preconnect") => HeadNodeKind::PreconnectHint,
            _ => HeadNodeKind::Other,
        },
        _ => HeadNodeKind::Other,
    }
}

/// Identity key for a stylesheet: resolved `href`, else `id`.
///
/// A keyless stylesheet (inline `<style>` without an id) has no identity
/// and is never deduplicated.
pub fn stylesheet_key(el: &Element, location: &Location) -> Option<String> {
    if let Some(href) = el.attr("href") {
        return Some(canonicalize_same_site(href, location));
    }
    el.attr("id").map(str::to_string)
}

// =============================================================================
// Removal plan
// =============================================================================

/// Deferred removal of stale old-head nodes.
///
/// Candidates are the live head's children as they stood before the merge
/// (positions `0..snapshot_len`); `keep` holds the indices exempted from
/// removal (stylesheets, and preconnect hints that matched an incoming one).
/// Applied by the orchestrator after the body swap has committed.
#[derive(Debug)]
pub struct RemovalPlan {
    snapshot_len: usize,
    keep: FxHashSet<usize>,
}

impl RemovalPlan {
    pub fn apply(self, head: &mut Element) {
        let mut idx = 0;
        head.children.retain(|_| {
            let retained = idx >= self.snapshot_len || self.keep.contains(&idx);
            idx += 1;
            retained
        });
    }
}

/// What the merge decided: the deferred removals and the sources of scripts
/// installed for execution.
#[derive(Debug)]
pub struct HeadOutcome {
    pub removals: RemovalPlan,
    pub executed: Vec<String>,
}

// =============================================================================
// Reconcile
// =============================================================================

/// Merge the incoming head into the live document's head.
///
/// `incoming_body` participates because stylesheets referenced only by the
/// new body (per-page inline styles) are hoisted into the head, and because
/// the live body's stylesheets must survive the coming swap.
pub fn reconcile(
    live: &mut Document,
    mut incoming_head: Element,
    incoming_body: &mut Element,
    registry: &mut ExecutedScripts,
    location: &Location,
) -> HeadOutcome {
    let mut executed = Vec::new();

    // Pre-merge snapshot of the live head.
    let snapshot_len = live.head().children.len();
    let mut keep: FxHashSet<usize> = FxHashSet::default();
    let mut present_keys: FxHashSet<String> = FxHashSet::default();
    let mut old_preconnects: Vec<(usize, String)> = Vec::new();

    for (idx, child) in live.head().children.iter().enumerate() {
        let Some(el) = child.as_element() else { continue };
        match classify(el) {
            HeadNodeKind::Stylesheet => {
                keep.insert(idx);
                if let Some(key) = stylesheet_key(el, location) {
                    present_keys.insert(key);
                }
            }
            HeadNodeKind::PreconnectHint => {
                if let Some(href) = el.attr("href") {
                    old_preconnects.push((idx, canonicalize_same_site(href, location)));
                }
            }
            _ => {}
        }
    }

    // Gather stylesheets that must survive but are not yet in the live
    // head: from the incoming body, the incoming head, and the live body
    // (which is about to be swapped away).
    let mut adopted: Vec<Element> = Vec::new();
    extract_stylesheets(incoming_body, &mut present_keys, &mut adopted, location);
    extract_stylesheets(&mut incoming_head, &mut present_keys, &mut adopted, location);
    extract_stylesheets(live.body_mut(), &mut present_keys, &mut adopted, location);
    for sheet in adopted {
        live.head_mut().push_elem(sheet);
    }

    // Merge the remaining incoming nodes.
    for node in incoming_head.children.drain(..) {
        let mut el = match node {
            Node::Element(el) => el,
            text => {
                live.head_mut().children.push(text);
                continue;
            }
        };

        match classify(&el) {
            // Every stylesheet was already moved or dropped above.
            HeadNodeKind::Stylesheet => {}
            HeadNodeKind::Script => match scripts::disposition(&el, registry, location) {
                ScriptDisposition::Skip => {}
                ScriptDisposition::Execute(fresh) => {
                    if let Some(src) = fresh.attr("src") {
                        executed.push(src.to_string());
                    }
                    live.head_mut().push_elem(fresh);
                }
            },
            HeadNodeKind::PreconnectHint => {
                let href = el
                    .attr("href")
                    .map(|h| canonicalize_same_site(h, location));
                match old_preconnects.iter().find(|(_, old)| Some(old) == href.as_ref()) {
                    // An identical hint already exists; keep the old node.
                    Some((idx, _)) => {
                        keep.insert(*idx);
                    }
                    None => live.head_mut().children.push(Node::Element(el)),
                }
            }
            HeadNodeKind::Other => {
                if el.tag == "noscript" {
                    literalize_noscript(&mut el);
                } else {
                    executed.extend(scripts::refresh_embedded(&mut el, registry, location));
                }
                live.head_mut().children.push(Node::Element(el));
            }
        }
    }

    HeadOutcome {
        removals: RemovalPlan { snapshot_len, keep },
        executed,
    }
}

/// Move stylesheets out of a subtree into `adopted`. A sheet whose
/// identity key is already present is a duplicate and is dropped, so each
/// key ends up with exactly one physical node in the document. Keyless
/// stylesheets always move.
fn extract_stylesheets(
    el: &mut Element,
    present: &mut FxHashSet<String>,
    adopted: &mut Vec<Element>,
    location: &Location,
) {
    let mut idx = 0;
    while idx < el.children.len() {
        let Some(child) = el.children[idx].as_element_mut() else {
            idx += 1;
            continue;
        };

        if classify(child) == HeadNodeKind::Stylesheet {
            match stylesheet_key(child, location) {
                Some(key) if present.contains(&key) => {
                    el.children.remove(idx);
                }
                key => {
                    if let Some(key) = key {
                        present.insert(key);
                    }
                    if let Node::Element(sheet) = el.children.remove(idx) {
                        adopted.push(*sheet);
                    }
                }
            }
        } else {
            extract_stylesheets(child, present, adopted, location);
            idx += 1;
        }
    }
}

/// Force `<noscript>` content back to literal text.
///
/// Parsers treat markup inside `<noscript>` differently depending on
/// whether scripting is assumed enabled, so reinserting it as parsed
/// elements would change its meaning.
fn literalize_noscript(el: &mut Element) {
    let literal = render::render_children(el);
    el.children = vec![Node::Text(literal)];
}

// =============================================================================
// Tests
// =============================================================================
