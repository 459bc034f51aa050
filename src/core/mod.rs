//! Core types - pure abstractions shared across the engine.

mod url;

pub use url::{Location, canonicalize_same_site, request_path, short_form};
