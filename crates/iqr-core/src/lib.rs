//! # iqr-core
//!
//! Foundation crate for the IQR session engine.
//! Defines descriptor types, capability traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod descriptor;
pub mod errors;
pub mod tracing_setup;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::IqrConfig;
pub use descriptor::{DescriptorElement, DescriptorSet, DescriptorUid};
pub use errors::{IqrError, IqrResult};
