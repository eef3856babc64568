//! Descriptor identity, elements, and keyed sets.

pub mod element;
pub mod set;

pub use element::{DescriptorElement, DescriptorUid};
pub use set::DescriptorSet;
