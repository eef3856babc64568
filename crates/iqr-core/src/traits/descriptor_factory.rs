use crate::descriptor::{DescriptorElement, DescriptorUid};

/// Builds descriptor elements when restoring session state.
pub trait IDescriptorFactory: Send + Sync {
    /// Element for `uid`. Backends with persistent storage may hand back an
    /// element that already carries a vector.
    fn new_descriptor(&self, uid: &DescriptorUid) -> DescriptorElement;

    /// Called after a vector was assigned to an element from `new_descriptor`
    /// that had none. Backends with persistent storage write it through here.
    fn store_vector(&self, _uid: &DescriptorUid, _vector: &[f64]) {}
}
