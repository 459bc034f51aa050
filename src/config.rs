//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the navigation manager.
///
/// The defaults match normal production behavior; the escape hatches exist
/// mostly for tests and for sites that depend on legacy semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// `Accept` header sent with page requests.
    pub accept: String,

    /// Catch panics in transition listeners instead of letting them tear
    /// down the navigation.
    pub isolate_listener_panics: bool,

    /// Abandon an in-flight navigation when a newer one starts.
    /// Disabling this restores last-write-wins racing between navigations.
    pub supersede_in_flight: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            accept: "text/html".to_string(),
            isolate_listener_panics: true,
            supersede_in_flight: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
