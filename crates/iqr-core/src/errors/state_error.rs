/// State snapshot (export/import) errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("malformed state bytes: {reason}")]
    MalformedState { reason: String },

    #[error("found existing vector for descriptor {uid} but vectors did not match")]
    InconsistentDescriptor { uid: String },

    #[error("state encoding failed: {reason}")]
    EncodeFailed { reason: String },
}
