//! Configuration for the `AuthN` resolver.

use std::time::Duration;

use serde::Deserialize;

/// Configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthNResolverConfig {
    /// Upper bound for a single verifier call, in milliseconds.
    ///
    /// A verifier that does not answer in time is treated as unavailable
    /// and ends the chain.
    pub verifier_timeout_ms: u64,
}

impl AuthNResolverConfig {
    #[must_use]
    pub fn verifier_timeout(&self) -> Duration {
        Duration::from_millis(self.verifier_timeout_ms)
    }
}

impl Default for AuthNResolverConfig {
    fn default() -> Self {
        Self {
            verifier_timeout_ms: 5_000,
        }
    }
}
