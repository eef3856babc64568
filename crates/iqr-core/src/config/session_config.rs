use serde::{Deserialize, Serialize};

use super::defaults;

/// Per-session engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Neighbors pulled from the index for each positive seed when growing
    /// the working set. The working set ends up between this value and
    /// `N * P` entries, `P` being the number of positive seeds.
    pub pos_seed_neighbors: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pos_seed_neighbors: defaults::DEFAULT_POS_SEED_NEIGHBORS,
        }
    }
}
