//! Tracing setup — structured logging and span definitions.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_ENV_VAR;

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects the `IQR_LOG` environment variable for filtering.
/// Falls back to `default_level` if not set.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .try_init();
}

/// Create a span for one session operation.
#[macro_export]
macro_rules! session_span {
    ($op:expr, $session_id:expr) => {
        tracing::info_span!("iqr.session", op = $op, session_id = %$session_id)
    };
}
