//! In-memory capabilities for exercising the IQR engine in tests.
//!
//! - `ScriptedNeighbors` / `LinearNeighborIndex` implement `INeighborIndex`
//! - `ScriptedRanker` / `CentroidRanker` implement `IRelevancyRanker`
//! - `MemoryDescriptorFactory` implements `IDescriptorFactory`

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use iqr_core::descriptor::{DescriptorElement, DescriptorUid};
use iqr_core::errors::{CapabilityError, IqrResult};
use iqr_core::traits::{IDescriptorFactory, INeighborIndex, IRelevancyRanker, RankedPool};

/// Shared descriptor with a vector.
pub fn descriptor(uid: &str, vector: &[f64]) -> Arc<DescriptorElement> {
    Arc::new(DescriptorElement::with_vector(uid, vector.to_vec()))
}

/// Descriptors on a line: `uid{i}` at `[i, 0.0]`.
pub fn line_descriptors(prefix: &str, count: usize) -> Vec<Arc<DescriptorElement>> {
    (0..count)
        .map(|i| descriptor(&format!("{prefix}{i}"), &[i as f64, 0.0]))
        .collect()
}

// ── Neighbor indexes ──────────────────────────────────────────────────────

/// Neighbor lists fixed per seed uid. Unknown seeds have no neighbors.
#[derive(Default)]
pub struct ScriptedNeighbors {
    neighbors: HashMap<DescriptorUid, Vec<Arc<DescriptorElement>>>,
    queries: AtomicUsize,
    failing: Option<DescriptorUid>,
}

impl ScriptedNeighbors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, seed: &str, neighbors: Vec<Arc<DescriptorElement>>) -> Self {
        self.neighbors.insert(DescriptorUid::from(seed), neighbors);
        self
    }

    /// Make queries for `seed` fail.
    pub fn failing_on(mut self, seed: &str) -> Self {
        self.failing = Some(DescriptorUid::from(seed));
        self
    }

    /// Number of `nn` calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl INeighborIndex for ScriptedNeighbors {
    fn nn(&self, descriptor: &DescriptorElement, n: usize) -> IqrResult<Vec<Arc<DescriptorElement>>> {
        if self.failing.as_ref() == Some(descriptor.uid()) {
            return Err(CapabilityError::NeighborQueryFailed {
                reason: format!("index unavailable for {}", descriptor.uid()),
            }
            .into());
        }
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .neighbors
            .get(descriptor.uid())
            .map(|list| list.iter().take(n).cloned().collect())
            .unwrap_or_default())
    }
}

/// Brute-force euclidean nearest neighbors over a fixed collection.
pub struct LinearNeighborIndex {
    elements: Vec<Arc<DescriptorElement>>,
}

impl LinearNeighborIndex {
    pub fn new(elements: Vec<Arc<DescriptorElement>>) -> Self {
        Self { elements }
    }
}

impl INeighborIndex for LinearNeighborIndex {
    fn nn(&self, descriptor: &DescriptorElement, n: usize) -> IqrResult<Vec<Arc<DescriptorElement>>> {
        let query = descriptor.vector().ok_or_else(|| CapabilityError::NeighborQueryFailed {
            reason: format!("descriptor {} has no vector", descriptor.uid()),
        })?;
        let mut ranked: Vec<(f64, &Arc<DescriptorElement>)> = self
            .elements
            .iter()
            .filter_map(|e| e.vector().map(|v| (squared_distance(query, v), e)))
            .collect();
        ranked.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.uid().cmp(b.1.uid()))
        });
        Ok(ranked.into_iter().take(n).map(|(_, e)| Arc::clone(e)).collect())
    }
}

// ── Rankers ───────────────────────────────────────────────────────────────

/// Returns fixed scores by uid (0.0 for unknown uids) and a fixed feedback
/// list.
#[derive(Default)]
pub struct ScriptedRanker {
    scores: HashMap<DescriptorUid, f64>,
    feedback: Vec<DescriptorUid>,
    /// Overrides the number of scores returned, to simulate a broken ranker.
    score_count: Option<usize>,
    calls: Mutex<Vec<RankCall>>,
}

/// Sizes of the inputs seen by one `rank_with_feedback` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankCall {
    pub positive: usize,
    pub negative: usize,
    pub pool_uids: Vec<DescriptorUid>,
}

impl ScriptedRanker {
    pub fn new(scores: &[(&str, f64)]) -> Self {
        Self {
            scores: scores
                .iter()
                .map(|(uid, s)| (DescriptorUid::from(*uid), *s))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_feedback(mut self, feedback: &[&str]) -> Self {
        self.feedback = feedback.iter().map(|u| DescriptorUid::from(*u)).collect();
        self
    }

    pub fn with_score_count(mut self, count: usize) -> Self {
        self.score_count = Some(count);
        self
    }

    pub fn calls(&self) -> Vec<RankCall> {
        self.calls.lock().clone()
    }
}

impl IRelevancyRanker for ScriptedRanker {
    fn rank_with_feedback(
        &self,
        positive: &[&[f64]],
        negative: &[&[f64]],
        _pool: &[&[f64]],
        pool_uids: &[DescriptorUid],
    ) -> IqrResult<RankedPool> {
        self.calls.lock().push(RankCall {
            positive: positive.len(),
            negative: negative.len(),
            pool_uids: pool_uids.to_vec(),
        });
        let mut scores: Vec<f64> = pool_uids
            .iter()
            .map(|uid| self.scores.get(uid).copied().unwrap_or(0.0))
            .collect();
        if let Some(count) = self.score_count {
            scores.resize(count, 0.0);
        }
        Ok(RankedPool {
            scores,
            feedback: self.feedback.clone(),
        })
    }
}

/// Scores pool vectors by closeness to the positive centroid relative to
/// the negative centroid. Feedback is the `feedback_size` pool entries whose
/// score is nearest 0.5.
pub struct CentroidRanker {
    pub feedback_size: usize,
}

impl IRelevancyRanker for CentroidRanker {
    fn rank_with_feedback(
        &self,
        positive: &[&[f64]],
        negative: &[&[f64]],
        pool: &[&[f64]],
        pool_uids: &[DescriptorUid],
    ) -> IqrResult<RankedPool> {
        let pos_centroid = centroid(positive).ok_or_else(|| CapabilityError::RankingFailed {
            reason: "no positive examples".to_string(),
        })?;
        let neg_centroid = centroid(negative);

        let scores: Vec<f64> = pool
            .iter()
            .map(|v| {
                let to_pos = squared_distance(v, &pos_centroid).sqrt();
                match &neg_centroid {
                    Some(neg) => {
                        let to_neg = squared_distance(v, neg).sqrt();
                        if to_pos + to_neg == 0.0 {
                            0.5
                        } else {
                            to_neg / (to_pos + to_neg)
                        }
                    }
                    None => 1.0 / (1.0 + to_pos),
                }
            })
            .collect();

        let mut uncertain: Vec<(f64, &DescriptorUid)> = scores
            .iter()
            .zip(pool_uids)
            .map(|(s, uid)| ((s - 0.5).abs(), uid))
            .collect();
        uncertain.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let feedback = uncertain
            .into_iter()
            .take(self.feedback_size)
            .map(|(_, uid)| uid.clone())
            .collect();

        Ok(RankedPool { scores, feedback })
    }
}

// ── Descriptor factory ────────────────────────────────────────────────────

/// Descriptor factory backed by a map of known vectors.
///
/// Uids with a stored vector come back with that vector already set, like a
/// persistent descriptor store would; others come back empty. Vectors
/// assigned on import are written back.
#[derive(Default)]
pub struct MemoryDescriptorFactory {
    known: Mutex<HashMap<DescriptorUid, Vec<f64>>>,
}

impl MemoryDescriptorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known(self, uid: &str, vector: &[f64]) -> Self {
        self.known.lock().insert(DescriptorUid::from(uid), vector.to_vec());
        self
    }

    /// Vector currently stored for `uid`.
    pub fn vector_of(&self, uid: &str) -> Option<Vec<f64>> {
        self.known.lock().get(&DescriptorUid::from(uid)).cloned()
    }
}

impl IDescriptorFactory for MemoryDescriptorFactory {
    fn new_descriptor(&self, uid: &DescriptorUid) -> DescriptorElement {
        match self.known.lock().get(uid) {
            Some(vector) => DescriptorElement::with_vector(uid.clone(), vector.clone()),
            None => DescriptorElement::new(uid.clone()),
        }
    }

    fn store_vector(&self, uid: &DescriptorUid, vector: &[f64]) {
        self.known.lock().insert(uid.clone(), vector.to_vec());
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn centroid(vectors: &[&[f64]]) -> Option<Vec<f64>> {
    let first = vectors.first()?;
    let mut sum = vec![0.0; first.len()];
    for v in vectors {
        for (acc, x) in sum.iter_mut().zip(v.iter()) {
            *acc += x;
        }
    }
    let n = vectors.len() as f64;
    Some(sum.into_iter().map(|x| x / n).collect())
}
