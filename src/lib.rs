//! Softnav - a page transition engine for statically generated sites.
//!
//! Navigates between pages of a multi-page site without a full reload,
//! preserving script execution semantics, stylesheet continuity, and
//! document-level attributes.
//!
//! # Architecture
//!
//! ```text
//! NavigationManager -> Fetch -> parse -> head merge -> body swap -> events
//!    (orchestrate)    (HTTP)    (tl)    (reconcile)    (atomic)   (hooks)
//! ```
//!
//! # Modules
//!
//! - `core` - URL normalization and the current-document `Location`
//! - `dom` - owned element tree, HTML parsing and rendering
//! - `engine` - script tracker, head reconciler, body swapper, orchestrator
//! - `fetch` - document fetch seam (`Fetch` trait, in-memory `StaticSite`)
//! - `config` - transition policy knobs
//! - `error` - navigation error taxonomy
//!
//! # Example
//!
//! ```ignore
//! let document = Document::parse(initial_html)?;
//! let location = Location::parse("https://site.example/")?;
//! let manager = NavigationManager::new(document, location, site, TransitionConfig::default());
//!
//! manager.on_after(|url| url.path().starts_with("/guide"), || attach_guide_menu());
//! manager.navigate("/guide/intro/").await?;
//! ```

pub mod config;
pub mod core;
pub mod dom;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod logger;
pub mod utils;

pub use config::TransitionConfig;
pub use core::{Location, canonicalize_same_site, short_form};
pub use dom::{Document, Element, Node};
pub use engine::events::EventKind;
pub use engine::manager::{MANAGER_MARKER, NavigationManager};
pub use engine::scripts::{ExecutedScripts, canonical_path};
pub use error::NavigationError;
pub use fetch::{Fetch, FetchResponse, StaticSite};
