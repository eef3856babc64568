//! WorkingSet — the candidate pool grown from positive seeds.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use iqr_core::descriptor::{DescriptorElement, DescriptorSet, DescriptorUid};

/// Outcome of one `grow` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GrowReport {
    /// Seeds that were sent to the neighbor index in this call.
    pub seeds_queried: usize,
    /// Descriptors newly added to the working set.
    pub added: usize,
    /// Working set size after the call.
    pub working_set_size: usize,
}

/// Candidate pool for ranking, plus bookkeeping of which seeds have already
/// been used to query the neighbor index.
///
/// Only ever grows: neighbors of a seed that is later un-adjudicated stay in
/// the pool until reset.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    members: DescriptorSet,
    seeds_used: BTreeSet<DescriptorUid>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds in `seeds` that have not been queried yet, in uid order.
    pub fn pending_seeds(&self, seeds: &DescriptorSet) -> Vec<Arc<DescriptorElement>> {
        seeds
            .iter()
            .filter(|seed| !self.seeds_used.contains(seed.uid()))
            .cloned()
            .collect()
    }

    /// Record the neighbors returned for `seed` and mark it used. Returns
    /// how many members were new.
    pub fn absorb(&mut self, seed: &DescriptorUid, neighbors: Vec<Arc<DescriptorElement>>) -> usize {
        let added = self.members.insert_many(neighbors);
        self.seeds_used.insert(seed.clone());
        added
    }

    pub fn members(&self) -> &DescriptorSet {
        &self.members
    }

    pub fn seeds_used(&self) -> &BTreeSet<DescriptorUid> {
        &self.seeds_used
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.seeds_used.clear();
    }
}
