/// Errors raised by implementations of the external capability traits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    #[error("neighbor query failed: {reason}")]
    NeighborQueryFailed { reason: String },

    #[error("ranking failed: {reason}")]
    RankingFailed { reason: String },
}
