//! Refinement — one ranking pass over the working set.

use std::collections::BTreeMap;
use std::sync::Arc;

use iqr_core::descriptor::{DescriptorElement, DescriptorSet, DescriptorUid};
use iqr_core::errors::{IqrError, IqrResult, SessionError};
use iqr_core::traits::IRelevancyRanker;

use crate::adjudication::AdjudicationStore;
use crate::views::ScoredDescriptor;
use crate::working_set::WorkingSet;

/// Everything produced by the most recent successful refinement.
#[derive(Debug, Clone)]
pub struct RefinementResults {
    /// Score per working-set member, in pool enumeration (uid) order.
    pub scores: BTreeMap<DescriptorUid, ScoredDescriptor>,
    /// Descriptors proposed for the next adjudication round, in the order
    /// the ranker returned them.
    pub feedback: Vec<Arc<DescriptorElement>>,
    /// Copy of the adjudication sets as they were when ranking ran.
    pub contributors: AdjudicationStore,
}

impl RefinementResults {
    pub fn score_of(&self, uid: &DescriptorUid) -> Option<f64> {
        self.scores.get(uid).map(|s| s.score)
    }
}

/// Rank the working set against the current adjudications.
///
/// All validation happens before anything is returned, so a failure leaves
/// the caller's previous results untouched.
pub fn refine(
    adjudications: &AdjudicationStore,
    working_set: &WorkingSet,
    ranker: &dyn IRelevancyRanker,
) -> IqrResult<RefinementResults> {
    let positive_set = adjudications.all_positive();
    if positive_set.is_empty() {
        return Err(SessionError::NoAdjudications.into());
    }
    let negative_set = adjudications.all_negative();

    let positive = vectors_of(&positive_set)?;
    let negative = vectors_of(&negative_set)?;
    let pool = vectors_of(working_set.members())?;
    let pool_uids: Vec<DescriptorUid> = working_set.members().uids().cloned().collect();

    let ranked = ranker.rank_with_feedback(&positive, &negative, &pool, &pool_uids)?;
    if ranked.scores.len() != pool.len() {
        return Err(SessionError::RankingShapeMismatch {
            expected: pool.len(),
            actual: ranked.scores.len(),
        }
        .into());
    }

    if let Some((descriptor, score)) = working_set
        .members()
        .iter()
        .zip(&ranked.scores)
        .find(|(_, score)| !score.is_finite())
    {
        return Err(SessionError::NonFiniteScore {
            uid: descriptor.uid().to_string(),
            score: *score,
        }
        .into());
    }

    let scores = working_set
        .members()
        .iter()
        .zip(ranked.scores)
        .map(|(descriptor, score)| {
            (
                descriptor.uid().clone(),
                ScoredDescriptor {
                    descriptor: Arc::clone(descriptor),
                    score,
                },
            )
        })
        .collect();

    let feedback = ranked
        .feedback
        .iter()
        .map(|uid| {
            working_set.members().get(uid).cloned().ok_or_else(|| {
                IqrError::from(SessionError::UnknownFeedbackDescriptor {
                    uid: uid.to_string(),
                })
            })
        })
        .collect::<IqrResult<Vec<_>>>()?;

    Ok(RefinementResults {
        scores,
        feedback,
        contributors: adjudications.clone(),
    })
}

fn vectors_of(set: &DescriptorSet) -> IqrResult<Vec<&[f64]>> {
    set.iter()
        .map(|d| {
            d.vector().ok_or_else(|| {
                IqrError::from(SessionError::MissingVector {
                    uid: d.uid().to_string(),
                })
            })
        })
        .collect()
}
