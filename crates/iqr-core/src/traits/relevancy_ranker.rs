use crate::descriptor::DescriptorUid;
use crate::errors::IqrResult;

/// Output of one ranking pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedPool {
    /// Relevancy score per pool entry, aligned 1:1 with the pool.
    pub scores: Vec<f64>,
    /// Pool uids the ranker considers most informative to adjudicate next,
    /// most useful first.
    pub feedback: Vec<DescriptorUid>,
}

/// Relevancy ranking with a feedback shortlist.
pub trait IRelevancyRanker: Send + Sync {
    /// Score every pool vector against the positive and negative examples.
    fn rank_with_feedback(
        &self,
        positive: &[&[f64]],
        negative: &[&[f64]],
        pool: &[&[f64]],
        pool_uids: &[DescriptorUid],
    ) -> IqrResult<RankedPool>;
}
