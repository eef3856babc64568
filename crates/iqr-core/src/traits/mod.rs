//! Capabilities the session engine consumes but does not implement.

pub mod descriptor_factory;
pub mod neighbor_index;
pub mod relevancy_ranker;

pub use descriptor_factory::IDescriptorFactory;
pub use neighbor_index::INeighborIndex;
pub use relevancy_ranker::{IRelevancyRanker, RankedPool};
