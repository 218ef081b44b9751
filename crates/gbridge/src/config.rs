use serde::{Deserialize, Serialize};

use crate::release::ReleasePolicy;

/// Tunables for a [`Bridge`](crate::Bridge).
///
/// Deserializable so front ends can load it from a TOML file:
///
/// ```toml
/// release-policy = "deferred"
/// debug-thread-checks = true
/// drain-batch = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BridgeConfig {
    pub release_policy: ReleasePolicy,
    /// Assert (in debug builds) that forwarding calls happen on the toolkit thread.
    pub debug_thread_checks: bool,
    /// Upper bound on releases performed by one drain call; `None` drains everything.
    pub drain_batch: Option<usize>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            release_policy: ReleasePolicy::Immediate,
            debug_thread_checks: true,
            drain_batch: None,
        }
    }
}

impl BridgeConfig {
    #[must_use]
    pub fn with_release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.release_policy = policy;
        self
    }

    #[must_use]
    pub fn with_thread_checks(mut self, enabled: bool) -> Self {
        self.debug_thread_checks = enabled;
        self
    }

    #[must_use]
    pub fn with_drain_batch(mut self, batch: Option<usize>) -> Self {
        self.drain_batch = batch;
        self
    }
}
