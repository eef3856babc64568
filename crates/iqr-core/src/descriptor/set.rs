//! DescriptorSet — uid-keyed collection with set algebra.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::element::{DescriptorElement, DescriptorUid};

/// A set of shared descriptor elements keyed by uid.
///
/// Iteration is in ascending uid order, which is the enumeration order the
/// engine relies on for pool assembly, tie-breaking, and export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorSet {
    elements: BTreeMap<DescriptorUid, Arc<DescriptorElement>>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element. Returns false if an element with the same uid was
    /// already present (the existing element is kept).
    pub fn insert(&mut self, element: Arc<DescriptorElement>) -> bool {
        if self.elements.contains_key(element.uid()) {
            return false;
        }
        self.elements.insert(element.uid().clone(), element);
        true
    }

    /// Insert many elements, returning how many were new.
    pub fn insert_many<I>(&mut self, elements: I) -> usize
    where
        I: IntoIterator<Item = Arc<DescriptorElement>>,
    {
        let mut added = 0;
        for element in elements {
            if self.insert(element) {
                added += 1;
            }
        }
        added
    }

    pub fn remove(&mut self, uid: &DescriptorUid) -> Option<Arc<DescriptorElement>> {
        self.elements.remove(uid)
    }

    /// Remove every member of `other` from this set.
    pub fn difference_update(&mut self, other: &DescriptorSet) {
        for uid in other.elements.keys() {
            self.elements.remove(uid);
        }
    }

    /// Add every member of `other` to this set.
    pub fn update(&mut self, other: &DescriptorSet) {
        self.insert_many(other.iter().cloned());
    }

    /// A new set holding the members of both sets.
    pub fn union(&self, other: &DescriptorSet) -> DescriptorSet {
        let mut out = self.clone();
        out.update(other);
        out
    }

    pub fn contains(&self, uid: &DescriptorUid) -> bool {
        self.elements.contains_key(uid)
    }

    pub fn get(&self, uid: &DescriptorUid) -> Option<&Arc<DescriptorElement>> {
        self.elements.get(uid)
    }

    /// Whether this set shares at least one uid with `other`.
    pub fn intersects(&self, other: &DescriptorSet) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.uids().any(|uid| large.contains(uid))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DescriptorElement>> {
        self.elements.values()
    }

    pub fn uids(&self) -> impl Iterator<Item = &DescriptorUid> {
        self.elements.keys()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

impl FromIterator<Arc<DescriptorElement>> for DescriptorSet {
    fn from_iter<I: IntoIterator<Item = Arc<DescriptorElement>>>(iter: I) -> Self {
        let mut set = DescriptorSet::new();
        set.insert_many(iter);
        set
    }
}
