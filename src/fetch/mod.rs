//! Page fetching seam.
//!
//! The engine never issues requests itself; it goes through the [`Fetch`]
//! trait so tests (and non-browser hosts) can supply documents from memory.
//! [`StaticSite`] is the in-memory implementation used throughout the test
//! suite.

use std::future::Future;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::core::request_path;

/// Result of fetching a page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    /// Whether the status is in the success range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches page markup for a URI.
pub trait Fetch: Send + Sync {
    fn fetch(
        &self,
        uri: &str,
        accept: &str,
    ) -> impl Future<Output = anyhow::Result<FetchResponse>> + Send;
}

// =============================================================================
// StaticSite
// =============================================================================

/// In-memory site serving pre-registered pages by decoded path.
///
/// Pages are keyed by the path portion of the request URI (query and
/// fragment stripped, percent-decoded). Unknown paths answer 404.
#[derive(Debug, Default)]
pub struct StaticSite {
    pages: FxHashMap<String, String>,
    latency: Option<Duration>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page under a path.
    pub fn page(mut self, path: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(path.into(), html.into());
        self
    }

    /// Delay every response, for exercising in-flight races.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

impl Fetch for StaticSite {
    fn fetch(
        &self,
        uri: &str,
        _accept: &str,
    ) -> impl Future<Output = anyhow::Result<FetchResponse>> + Send {
        let path = request_path(uri);
        let page = self.pages.get(&path).cloned();
        let latency = self.latency;

        async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            Ok(match page {
                Some(body) => FetchResponse { status: 200, body },
                None => FetchResponse {
                    status: 404,
                    body: "<html><head></head><body>not found</body></html>".to_string(),
                },
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
