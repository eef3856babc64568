use std::sync::Arc;

use crate::descriptor::DescriptorElement;
use crate::errors::IqrResult;

/// Nearest-neighbor query over an indexed descriptor collection.
pub trait INeighborIndex: Send + Sync {
    /// Up to `n` neighbors of `descriptor`, nearest first.
    ///
    /// Must be deterministic for a given index snapshot and must not mutate
    /// the index.
    fn nn(&self, descriptor: &DescriptorElement, n: usize) -> IqrResult<Vec<Arc<DescriptorElement>>>;
}
