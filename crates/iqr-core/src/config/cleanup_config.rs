use serde::{Deserialize, Serialize};

use super::defaults;

/// Registry cleanup thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Sessions idle for longer than this are removed (seconds).
    pub inactivity_timeout_secs: u64,
    /// Sessions older than this are removed regardless of activity (seconds).
    pub max_age_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: defaults::DEFAULT_INACTIVITY_TIMEOUT_SECS,
            max_age_secs: defaults::DEFAULT_MAX_AGE_SECS,
        }
    }
}
