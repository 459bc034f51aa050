//! Transition orchestration.
//!
//! `NavigationManager` is the public entry point: it owns the live
//! document, the current location, the executed-script registry, and the
//! listener set, and runs the fixed transition sequence. The fetch is the
//! only await point; all reconciliation happens under the document lock
//! with no suspension, so no torn intermediate state is observable.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use url::Url;

use crate::config::TransitionConfig;
use crate::core::{Location, short_form};
use crate::dom::{Document, Element};
use crate::engine::body;
use crate::engine::events::{self, EventKind, ListenerSet};
use crate::engine::head;
use crate::engine::scripts::ExecutedScripts;
use crate::error::NavigationError;
use crate::fetch::Fetch;
use crate::{debug, log};

/// Well-known name for the process-wide manager instance.
pub const MANAGER_MARKER: &str = "softnav.navigation-manager";

/// Guards against a second `install()` in the same process.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// The navigation manager.
///
/// `new` builds a detached instance (tests run many side by side);
/// `install` additionally claims the process-wide [`MANAGER_MARKER`] slot
/// and fails if it is already taken.
pub struct NavigationManager<F> {
    fetcher: F,
    config: TransitionConfig,
    // Lock order when nesting: document, then scripts, then location.
    // The listener set is never held across another lock or a callback.
    document: Mutex<Document>,
    location: Mutex<Location>,
    scripts: Mutex<ExecutedScripts>,
    listeners: Mutex<ListenerSet>,
    epoch: AtomicU64,
}

impl<F: Fetch> NavigationManager<F> {
    /// Build a detached manager around a live document.
    pub fn new(document: Document, location: Location, fetcher: F, config: TransitionConfig) -> Self {
        Self {
            fetcher,
            config,
            document: Mutex::new(document),
            location: Mutex::new(location),
            scripts: Mutex::new(ExecutedScripts::new()),
            listeners: Mutex::new(ListenerSet::default()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Build the process-wide manager.
    pub fn install(
        document: Document,
        location: Location,
        fetcher: F,
        config: TransitionConfig,
    ) -> Result<Self, NavigationError> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(NavigationError::AlreadyInstalled);
        }
        debug!("nav"; "installed as {MANAGER_MARKER}");
        Ok(Self::new(document, location, fetcher, config))
    }

    /// Register a listener fired before a transition starts, against the
    /// old URL.
    pub fn on_before<P, C>(&self, predicate: P, callback: C)
    where
        P: Fn(&Url) -> bool + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .register(EventKind::BeforeTransition, predicate, callback);
    }

    /// Register a listener fired after a transition commits, against the
    /// new URL.
    pub fn on_after<P, C>(&self, predicate: P, callback: C)
    where
        P: Fn(&Url) -> bool + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .register(EventKind::AfterTransition, predicate, callback);
    }

    /// The current document URL.
    pub fn location(&self) -> Location {
        self.location.lock().clone()
    }

    /// Inspect the live document.
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.document.lock())
    }

    /// Sources currently recorded as executed, sorted for stable output.
    pub fn executed_scripts(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.scripts.lock().iter().map(str::to_string).collect();
        sources.sort();
        sources
    }

    /// Navigate to a target URI, swapping the live document's content.
    ///
    /// On any error the live document is left untouched. A navigation that
    /// is overtaken by a newer one aborts with
    /// [`NavigationError::Superseded`] before mutating anything (unless
    /// superseding is disabled in the config).
    pub async fn navigate(&self, uri: &str) -> Result<(), NavigationError> {
        let ticket = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        // First navigation of the session: scripts already in the page ran
        // during the normal load and must never re-execute. Locks nest in
        // the struct's documented order.
        {
            let document = self.document.lock();
            let mut registry = self.scripts.lock();
            if registry.is_empty() {
                let location = self.location.lock();
                registry.seed_from(&document.root, &location);
            }
        }

        let (old_url, target) = {
            let location = self.location.lock();
            let target = location
                .join(uri)
                .map_err(|e| NavigationError::Parse {
                    uri: uri.to_string(),
                    message: e.to_string(),
                })?;
            (location.url().clone(), target)
        };
        // Request the resolved target, so relative URIs hit the right
        // resource regardless of the current page's depth.
        let request_uri = short_form(&target);

        let before = self
            .listeners
            .lock()
            .matching(EventKind::BeforeTransition, &old_url);
        events::invoke(
            &before,
            EventKind::BeforeTransition,
            &old_url,
            self.config.isolate_listener_panics,
        );

        debug!("nav"; "fetching {request_uri}");
        let response = self
            .fetcher
            .fetch(&request_uri, &self.config.accept)
            .await
            .map_err(|source| NavigationError::Network {
                uri: request_uri.clone(),
                source,
            })?;

        if !response.is_ok() {
            log!("nav"; "navigation to {request_uri} failed: status {}", response.status);
            return Err(NavigationError::Http {
                uri: request_uri,
                status: response.status,
            });
        }

        if self.config.supersede_in_flight && self.epoch.load(Ordering::SeqCst) != ticket {
            debug!("nav"; "navigation to {request_uri} superseded");
            return Err(NavigationError::Superseded { uri: request_uri });
        }

        let parsed = Document::parse(&response.body).map_err(|e| NavigationError::Parse {
            uri: request_uri.clone(),
            message: e.to_string(),
        })?;

        // Steps 4-8: all mutation happens here, without suspension.
        {
            let (incoming_root, incoming_head, mut incoming_body) = parsed.into_parts();
            let mut document = self.document.lock();
            let mut registry = self.scripts.lock();
            let location = Location::new(target.clone());

            let head_outcome = head::reconcile(
                &mut document,
                incoming_head,
                &mut incoming_body,
                &mut registry,
                &location,
            );
            reconcile_root_attrs(&mut document.root, incoming_root);
            let body_outcome = body::swap(&mut document, incoming_body, &mut registry, &location);
            head_outcome.removals.apply(document.head_mut());

            debug!(
                "nav";
                "{} scripts installed for execution",
                head_outcome.executed.len() + body_outcome.executed.len()
            );

            *self.location.lock() = location;
        }

        log!("nav"; "{} -> {}", short_form(&old_url), short_form(&target));

        let after = self
            .listeners
            .lock()
            .matching(EventKind::AfterTransition, &target);
        events::invoke(
            &after,
            EventKind::AfterTransition,
            &target,
            self.config.isolate_listener_panics,
        );

        Ok(())
    }
}

/// Reconcile `<html>`-level attributes.
///
/// Shared attributes take the incoming value, old-only attributes are
/// dropped, and attributes unique to the new page are added.
fn reconcile_root_attrs(live: &mut Element, mut incoming: Element) {
    let names: Vec<String> = live.attrs.iter().map(|(name, _)| name.clone()).collect();
    for name in names {
        match incoming.attr(&name) {
            Some(value) => {
                let value = value.to_string();
                live.set_attr(name.clone(), value);
                incoming.remove_attr(&name);
            }
            None => live.remove_attr(&name),
        }
    }
    for (name, value) in incoming.attrs {
        live.set_attr(name, value);
    }
}

// =============================================================================
// Tests
// =============================================================================
