//! Ordered views over the latest refinement results.
//!
//! Each view is an explicit `Stale`/`Fresh` cache recomputed on read.
//! Invalidation rules:
//! - all four views go stale on refine and reset;
//! - the positive view also goes stale when live positives change;
//! - the negative view also goes stale when live negatives change;
//! - the unadjudicated view goes stale when either live set changes.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use iqr_core::descriptor::{DescriptorElement, DescriptorUid};

use crate::adjudication::AdjudicationDelta;
use crate::refinement::RefinementResults;

/// A working-set descriptor with its relevancy score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDescriptor {
    pub descriptor: Arc<DescriptorElement>,
    pub score: f64,
}

impl ScoredDescriptor {
    pub fn uid(&self) -> &DescriptorUid {
        self.descriptor.uid()
    }
}

/// Serialized as `[uid, score]`, the pair shape front ends page through.
impl Serialize for ScoredDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.descriptor.uid(), self.score).serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum CachedView {
    #[default]
    Stale,
    Fresh(Vec<ScoredDescriptor>),
}

impl CachedView {
    fn fresh(&self) -> Option<Vec<ScoredDescriptor>> {
        match self {
            CachedView::Fresh(view) => Some(view.clone()),
            CachedView::Stale => None,
        }
    }

    fn is_fresh(&self) -> bool {
        matches!(self, CachedView::Fresh(_))
    }
}

/// The four memoized projections of the latest results.
#[derive(Debug, Clone, Default)]
pub struct ResultViews {
    results: CachedView,
    positive: CachedView,
    negative: CachedView,
    unadjudicated: CachedView,
}

impl ResultViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate_all(&mut self) {
        *self = Self::default();
    }

    /// Stale the views affected by a live adjudication change.
    pub fn invalidate_for(&mut self, delta: AdjudicationDelta) {
        if delta.positive_changed {
            self.positive = CachedView::Stale;
        }
        if delta.negative_changed {
            self.negative = CachedView::Stale;
        }
        if delta.any() {
            self.unadjudicated = CachedView::Stale;
        }
    }

    /// All results by descending score. Ties keep uid order.
    pub fn ordered_results(&mut self, results: Option<&RefinementResults>) -> Vec<ScoredDescriptor> {
        if let Some(view) = self.results.fresh() {
            return view;
        }
        let Some(results) = results else {
            return Vec::new();
        };
        let mut ordered: Vec<ScoredDescriptor> = results.scores.values().cloned().collect();
        // Stable sort, so equal scores stay in enumeration order.
        ordered.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.results = CachedView::Fresh(ordered.clone());
        ordered
    }

    /// Results that were positive (working set or external) at refine time.
    pub fn ordered_positive(&mut self, results: Option<&RefinementResults>) -> Vec<ScoredDescriptor> {
        if let Some(view) = self.positive.fresh() {
            return view;
        }
        let contributing = results
            .map(|r| r.contributors.all_positive())
            .unwrap_or_default();
        let view: Vec<_> = self
            .ordered_results(results)
            .into_iter()
            .filter(|s| contributing.contains(s.uid()))
            .collect();
        self.positive = CachedView::Fresh(view.clone());
        view
    }

    /// Results that were negative (working set or external) at refine time.
    pub fn ordered_negative(&mut self, results: Option<&RefinementResults>) -> Vec<ScoredDescriptor> {
        if let Some(view) = self.negative.fresh() {
            return view;
        }
        let contributing = results
            .map(|r| r.contributors.all_negative())
            .unwrap_or_default();
        let view: Vec<_> = self
            .ordered_results(results)
            .into_iter()
            .filter(|s| contributing.contains(s.uid()))
            .collect();
        self.negative = CachedView::Fresh(view.clone());
        view
    }

    /// Results that were in none of the contributing sets.
    pub fn ordered_unadjudicated(
        &mut self,
        results: Option<&RefinementResults>,
    ) -> Vec<ScoredDescriptor> {
        if let Some(view) = self.unadjudicated.fresh() {
            return view;
        }
        let view: Vec<_> = self
            .ordered_results(results)
            .into_iter()
            .filter(|s| results.map_or(true, |r| !r.contributors.contains(s.uid())))
            .collect();
        self.unadjudicated = CachedView::Fresh(view.clone());
        view
    }

    /// Freshness of (results, positive, negative, unadjudicated).
    pub fn freshness(&self) -> [bool; 4] {
        [
            self.results.is_fresh(),
            self.positive.is_fresh(),
            self.negative.is_fresh(),
            self.unadjudicated.is_fresh(),
        ]
    }
}
