//! Session lifecycle management.
//!
//! Removes sessions that have been idle too long or have outlived the
//! maximum age.

use chrono::{Duration, Utc};

use crate::manager::SessionManager;

/// Default inactivity timeout: 1 hour.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::hours(1);

/// Default max session age for cleanup: 7 days.
pub const DEFAULT_MAX_AGE: Duration = Duration::days(7);

/// Clean up stale sessions from the manager.
///
/// Removes sessions that are:
/// - Inactive for longer than `inactivity_timeout`
/// - Older than `max_age`
///
/// Returns the number of sessions removed.
pub fn cleanup_stale_sessions(
    manager: &SessionManager,
    inactivity_timeout: Duration,
    max_age: Duration,
) -> usize {
    let now = Utc::now();
    let mut removed = 0;

    for id in manager.session_ids() {
        let should_remove = manager
            .get_session(&id)
            .map(|session| {
                now - session.last_activity() > inactivity_timeout
                    || now - session.created_at() > max_age
            })
            .unwrap_or(false);

        if should_remove && manager.remove_session(&id).is_some() {
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::info!(removed, "stale sessions cleaned up");
    }
    removed
}

/// Clean up sessions with the default thresholds.
pub fn cleanup_old_sessions(manager: &SessionManager) -> usize {
    cleanup_stale_sessions(manager, DEFAULT_INACTIVITY_TIMEOUT, DEFAULT_MAX_AGE)
}

/// Clean up sessions with thresholds from configuration.
pub fn cleanup_with_config(
    manager: &SessionManager,
    config: &iqr_core::config::CleanupConfig,
) -> usize {
    cleanup_stale_sessions(
        manager,
        threshold(config.inactivity_timeout_secs),
        threshold(config.max_age_secs),
    )
}

/// Seconds as a duration, saturating at `Duration::MAX`.
fn threshold(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
