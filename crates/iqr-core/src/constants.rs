/// Name of the single entry inside an exported state archive.
///
/// Front ends that wrap session state must keep this name so the payload
/// stays importable.
pub const STATE_ZIP_FILENAME: &str = "iqr_state.json";

/// Environment variable consulted by `tracing_setup::init_tracing`.
pub const LOG_ENV_VAR: &str = "IQR_LOG";
