//! Origin-aware URL normalization.
//!
//! - `short_form` - path + search + hash, discarding scheme and authority
//! - `canonicalize_same_site` - same-origin absolute URLs rewritten to the
//!   short form; everything else passes through unchanged
//! - `request_path` - decoded lookup path at the fetch boundary
//!
//! Parse failures are swallowed by policy: the helpers here are total and
//! return their input unmodified rather than erroring, so dedup and
//! comparison logic never has to handle a malformed-URL case.

use url::Url;

// =============================================================================
// Location
// =============================================================================

/// The current document URL.
///
/// Owned by the navigation manager and updated only after a transition has
/// fully committed, so in-flight work always compares against the page the
/// user actually sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Wrap an already-parsed URL.
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parse a fully-qualified document URL.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self::new)
    }

    /// The full underlying URL.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Short representation of this location (path + search + hash).
    pub fn short_form(&self) -> String {
        short_form(&self.url)
    }

    /// Resolve a navigation target against this location.
    pub fn join(&self, uri: &str) -> Result<Url, url::ParseError> {
        self.url.join(uri)
    }

    /// Check whether another URL shares this location's origin.
    pub fn same_origin(&self, other: &Url) -> bool {
        self.url.origin() == other.origin()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Short representation of a URL: `pathname + search + hash`.
///
/// Used to compare and display navigation targets without caring about
/// origin.
pub fn short_form(url: &Url) -> String {
    let mut out = url.path().to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Rewrite a same-origin absolute URL to its short form.
///
/// Fully-qualified URLs of other origins and already-relative URIs pass
/// through unchanged. A URI that fails to parse is treated as "not a full
/// URL" and returned as-is.
pub fn canonicalize_same_site(uri: &str, location: &Location) -> String {
    match Url::parse(uri) {
        Ok(parsed) if location.same_origin(&parsed) => short_form(&parsed),
        _ => uri.to_string(),
    }
}

/// Decoded lookup path for a request URI (query and fragment stripped,
/// percent-encoding decoded, leading slash ensured).
pub fn request_path(uri: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string());

    if decoded.starts_with('/') {
        decoded
    } else {
        format!("/{decoded}")
    }
}

// =============================================================================
// Tests
// =============================================================================
