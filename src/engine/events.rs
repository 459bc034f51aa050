//! Lifecycle listeners.
//!
//! Page scripts hook into transitions through `(event, predicate, callback)`
//! records. Listeners fire in registration order; a panicking listener is
//! logged and skipped so it cannot abort its siblings or the transition.
//!
//! Callbacks run against a snapshot of the matching listeners, never under
//! the registry itself, so a callback may register further listeners.
//! Registrations made mid-fire take effect from the next event on.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use url::Url;

use crate::log;

/// When a listener runs relative to the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Before the fetch starts, against the old URL.
    BeforeTransition,
    /// After the transition has fully committed, against the new URL.
    AfterTransition,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::BeforeTransition => write!(f, "before"),
            EventKind::AfterTransition => write!(f, "after"),
        }
    }
}

/// A single registration: when it fires, where it applies, what it runs.
pub struct Listener {
    kind: EventKind,
    predicate: Box<dyn Fn(&Url) -> bool + Send + Sync>,
    callback: Box<dyn Fn() + Send + Sync>,
}

/// Ordered listener registry. No removal API; registrations live for the
/// session.
#[derive(Default)]
pub struct ListenerSet {
    entries: Vec<Arc<Listener>>,
}

impl ListenerSet {
    pub fn register<P, C>(&mut self, kind: EventKind, predicate: P, callback: C)
    where
        P: Fn(&Url) -> bool + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.entries.push(Arc::new(Listener {
            kind,
            predicate: Box::new(predicate),
            callback: Box::new(callback),
        }));
    }

    /// Snapshot the listeners matching an event, in registration order.
    ///
    /// Callers holding a lock around the set take the snapshot, release the
    /// lock, and only then [`invoke`] it.
    pub fn matching(&self, kind: EventKind, url: &Url) -> Vec<Arc<Listener>> {
        self.entries
            .iter()
            .filter(|listener| listener.kind == kind && (listener.predicate)(url))
            .cloned()
            .collect()
    }

    /// Match and invoke in one step. Returns the number of listeners that
    /// ran.
    pub fn fire(&self, kind: EventKind, url: &Url, isolate_panics: bool) -> usize {
        invoke(&self.matching(kind, url), kind, url, isolate_panics)
    }
}

/// Run a snapshot of matched listeners in order.
pub fn invoke(listeners: &[Arc<Listener>], kind: EventKind, url: &Url, isolate_panics: bool) -> usize {
    for listener in listeners {
        if isolate_panics {
            if catch_unwind(AssertUnwindSafe(|| (listener.callback)())).is_err() {
                log!("events"; "{kind}-transition listener panicked for {url}, continuing");
            }
        } else {
            (listener.callback)();
        }
    }
    listeners.len()
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("entries", &self.entries.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
