//! Error types for navigation.

use thiserror::Error;

/// Everything that can go wrong during a soft navigation.
///
/// Callers are expected to fall back to a full page load on any of these;
/// the live document is left untouched when a navigation fails.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The server answered with a non-success status.
    #[error("request for '{uri}' failed with status {status}")]
    Http { uri: String, status: u16 },

    /// The request never produced a response.
    #[error("request for '{uri}' failed")]
    Network {
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    /// The target URL or the fetched document could not be parsed.
    #[error("could not parse '{uri}': {message}")]
    Parse { uri: String, message: String },

    /// A newer navigation started while this one was in flight.
    #[error("navigation to '{uri}' superseded by a newer one")]
    Superseded { uri: String },

    /// `install()` was called twice for the same process.
    #[error("navigation manager is already installed")]
    AlreadyInstalled,
}
