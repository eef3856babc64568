//! AdjudicationStore — the four positive/negative descriptor sets.

use serde::Serialize;

use iqr_core::descriptor::{DescriptorSet, DescriptorUid};

/// Positive/negative adjudications for one session.
///
/// `positive` and `negative` hold working-set descriptors labeled by the
/// user; the external sets hold descriptors supplied from outside the
/// working set. Each pair is kept disjoint.
///
/// Cloning yields an independent copy, which is how refinement snapshots
/// the sets that contributed to a result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjudicationStore {
    pub positive: DescriptorSet,
    pub negative: DescriptorSet,
    pub external_positive: DescriptorSet,
    pub external_negative: DescriptorSet,
}

/// Which live sets an `adjudicate` call actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjudicationDelta {
    pub positive_changed: bool,
    pub negative_changed: bool,
}

impl AdjudicationDelta {
    pub fn any(&self) -> bool {
        self.positive_changed || self.negative_changed
    }
}

/// Adjudication state of a single descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdjudicationStatus {
    pub is_pos: bool,
    pub is_neg: bool,
}

impl AdjudicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add externally supplied examples.
    ///
    /// `positive` is applied first (joins external positives, leaves external
    /// negatives), then `negative` (joins external negatives, leaves external
    /// positives), so a descriptor given in both ends up negative.
    pub fn set_external(&mut self, positive: &DescriptorSet, negative: &DescriptorSet) {
        self.external_positive.update(positive);
        self.external_negative.difference_update(positive);

        self.external_negative.update(negative);
        self.external_positive.difference_update(negative);
    }

    /// Update working-set adjudications.
    ///
    /// A descriptor listed as both a new positive and a new negative cancels
    /// out and ends up in neither set. A new positive is dropped from the
    /// negatives and vice versa.
    pub fn adjudicate(
        &mut self,
        new_positives: &DescriptorSet,
        new_negatives: &DescriptorSet,
        un_positives: &DescriptorSet,
        un_negatives: &DescriptorSet,
    ) -> AdjudicationDelta {
        let pos_before = self.positive.clone();
        self.positive.update(new_positives);
        self.positive.difference_update(un_positives);
        self.positive.difference_update(new_negatives);

        let neg_before = self.negative.clone();
        self.negative.update(new_negatives);
        self.negative.difference_update(un_negatives);
        self.negative.difference_update(new_positives);

        AdjudicationDelta {
            positive_changed: pos_before != self.positive,
            negative_changed: neg_before != self.negative,
        }
    }

    /// Working-set positives plus external positives.
    pub fn all_positive(&self) -> DescriptorSet {
        self.positive.union(&self.external_positive)
    }

    /// Working-set negatives plus external negatives.
    pub fn all_negative(&self) -> DescriptorSet {
        self.negative.union(&self.external_negative)
    }

    pub fn status(&self, uid: &DescriptorUid) -> AdjudicationStatus {
        AdjudicationStatus {
            is_pos: self.positive.contains(uid) || self.external_positive.contains(uid),
            is_neg: self.negative.contains(uid) || self.external_negative.contains(uid),
        }
    }

    /// Whether `uid` appears in any of the four sets.
    pub fn contains(&self, uid: &DescriptorUid) -> bool {
        let status = self.status(uid);
        status.is_pos || status.is_neg
    }

    /// Both pairs of sets are disjoint.
    pub fn is_consistent(&self) -> bool {
        !self.positive.intersects(&self.negative)
            && !self.external_positive.intersects(&self.external_negative)
    }

    pub fn clear(&mut self) {
        self.positive.clear();
        self.negative.clear();
        self.external_positive.clear();
        self.external_negative.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iqr_core::DescriptorElement;
    use std::sync::Arc;

    fn set(uids: &[&str]) -> DescriptorSet {
        uids.iter()
            .map(|u| Arc::new(DescriptorElement::with_vector(*u, vec![0.0])))
            .collect()
    }

    fn uids(set: &DescriptorSet) -> Vec<&str> {
        set.uids().map(|u| u.as_str()).collect()
    }

    #[test]
    fn new_positive_leaves_negative_set() {
        let mut store = AdjudicationStore::new();
        store.adjudicate(&set(&[]), &set(&["a"]), &set(&[]), &set(&[]));
        let delta = store.adjudicate(&set(&["a"]), &set(&[]), &set(&[]), &set(&[]));
        assert!(delta.positive_changed && delta.negative_changed);
        assert_eq!(uids(&store.positive), vec!["a"]);
        assert!(store.negative.is_empty());
    }

    #[test]
    fn unchanged_adjudication_reports_no_delta() {
        let mut store = AdjudicationStore::new();
        store.adjudicate(&set(&["a"]), &set(&[]), &set(&[]), &set(&[]));
        let delta = store.adjudicate(&set(&["a"]), &set(&[]), &set(&["zzz"]), &set(&[]));
        assert!(!delta.any());
    }

    #[test]
    fn external_overlap_resolves_negative() {
        let mut store = AdjudicationStore::new();
        store.set_external(&set(&["x", "y"]), &set(&["y"]));
        assert_eq!(uids(&store.external_positive), vec!["x"]);
        assert_eq!(uids(&store.external_negative), vec!["y"]);
    }

    #[test]
    fn external_reassignment_moves_between_sets() {
        let mut store = AdjudicationStore::new();
        store.set_external(&set(&[]), &set(&["x"]));
        store.set_external(&set(&["x"]), &set(&[]));
        assert_eq!(uids(&store.external_positive), vec!["x"]);
        assert!(store.external_negative.is_empty());
    }

    #[test]
    fn status_covers_external_sets() {
        let mut store = AdjudicationStore::new();
        store.set_external(&set(&["e"]), &set(&[]));
        store.adjudicate(&set(&[]), &set(&["n"]), &set(&[]), &set(&[]));
        assert_eq!(
            store.status(&"e".into()),
            AdjudicationStatus { is_pos: true, is_neg: false }
        );
        assert_eq!(
            store.status(&"n".into()),
            AdjudicationStatus { is_pos: false, is_neg: true }
        );
        assert!(!store.contains(&"other".into()));
    }
}
