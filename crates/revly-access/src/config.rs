//! Access engine configuration.

use std::time::Duration;

/// Tunables for resolution and caching.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Upper bound on one full resolution (grant load + hierarchy
    /// snapshot). Expiry surfaces as a timeout error, which the gate
    /// treats as a denial.
    pub resolve_timeout: Duration,
    /// Optional freshness bound on cached entries. `None` (the
    /// default) relies purely on invalidation; set it in deployments
    /// where invalidation delivery is not trusted.
    pub entry_ttl: Option<Duration>,
    /// Maximum tree depth accepted before a traversal or insert is
    /// rejected. Guards against corrupted parent chains.
    pub max_depth: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(5),
            entry_ttl: None,
            max_depth: 64,
        }
    }
}
