//! Error handling for the IQR engine.
//! One error enum per subsystem, `thiserror` only, aggregated into `IqrError`.

pub mod capability_error;
pub mod config_error;
pub mod session_error;
pub mod state_error;

pub use capability_error::CapabilityError;
pub use config_error::ConfigError;
pub use session_error::SessionError;
pub use state_error::StateError;

/// Top-level error for every fallible engine operation.
#[derive(Debug, thiserror::Error)]
pub enum IqrError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type IqrResult<T> = Result<T, IqrError>;
