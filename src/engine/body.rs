//! Body swapping.
//!
//! The live `<body>` is replaced wholesale in a single assignment, so no
//! partially-populated body is ever observable. Scripts inside the incoming
//! body are handled through deferred actions: the walk records, per script,
//! either a refresh (swap in a fresh clone so the host executes it) or a
//! removal (already executed), and the actions are applied only after the
//! swap has committed.

use crate::core::Location;
use crate::dom::{Document, Element, Node};
use crate::engine::scripts::{self, ExecutedScripts, ScriptDisposition};

/// Record of a completed swap: sources of scripts installed for execution,
/// in the order they were encountered.
#[derive(Debug)]
pub struct BodyOutcome {
    pub executed: Vec<String>,
}

/// A deferred per-script action, addressed by child-index path from the
/// body root.
#[derive(Debug)]
enum ScriptAction {
    Refresh { path: Vec<usize>, fresh: Element },
    Remove { path: Vec<usize> },
}

/// Replace the live body with the incoming one.
pub fn swap(
    live: &mut Document,
    incoming_body: Element,
    registry: &mut ExecutedScripts,
    location: &Location,
) -> BodyOutcome {
    let mut actions = Vec::new();
    let mut executed = Vec::new();
    collect(
        &incoming_body,
        &mut Vec::new(),
        registry,
        location,
        &mut actions,
        &mut executed,
    );

    // The swap itself: one assignment, never a partial tree.
    let body_idx = live
        .root
        .child_index("body")
        .unwrap_or_else(|| unreachable!("document invariant: body child exists"));
    live.root.children[body_idx] = Node::Element(Box::new(incoming_body));

    // Applying in reverse keeps earlier paths valid across removals; the
    // resulting tree is identical to in-order application.
    let body = live.body_mut();
    for action in actions.into_iter().rev() {
        match action {
            ScriptAction::Refresh { path, fresh } => {
                let Some((parent, idx)) = parent_at_mut(body, &path) else {
                    continue;
                };
                parent.children[idx] = Node::Element(Box::new(fresh));
            }
            ScriptAction::Remove { path } => {
                let Some((parent, idx)) = parent_at_mut(body, &path) else {
                    continue;
                };
                parent.children.remove(idx);
            }
        }
    }

    BodyOutcome { executed }
}

/// Pre-order walk recording one action per script. `<noscript>` subtrees
/// are not descended into.
fn collect(
    el: &Element,
    path: &mut Vec<usize>,
    registry: &mut ExecutedScripts,
    location: &Location,
    actions: &mut Vec<ScriptAction>,
    executed: &mut Vec<String>,
) {
    for (idx, child) in el.children.iter().enumerate() {
        let Some(child) = child.as_element() else { continue };
        if child.tag == "noscript" {
            continue;
        }

        path.push(idx);
        if child.tag == "script" {
            match scripts::disposition(child, registry, location) {
                ScriptDisposition::Skip => actions.push(ScriptAction::Remove { path: path.clone() }),
                ScriptDisposition::Execute(fresh) => {
                    if let Some(src) = fresh.attr("src") {
                        executed.push(src.to_string());
                    }
                    actions.push(ScriptAction::Refresh {
                        path: path.clone(),
                        fresh,
                    });
                }
            }
        } else {
            collect(child, path, registry, location, actions, executed);
        }
        path.pop();
    }
}

fn parent_at_mut<'a>(body: &'a mut Element, path: &[usize]) -> Option<(&'a mut Element, usize)> {
    let (&last, parents) = path.split_last()?;
    let mut cur = body;
    for &idx in parents {
        cur = cur.children.get_mut(idx)?.as_element_mut()?;
    }
    if last < cur.children.len() {
        Some((cur, last))
    } else {
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
