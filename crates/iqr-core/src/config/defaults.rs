// Single source of truth for all default values.

// --- Session ---
pub const DEFAULT_POS_SEED_NEIGHBORS: usize = 500;

// --- Cleanup ---
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_MAX_AGE_SECS: u64 = 604_800; // 7 days
/// Largest cleanup threshold representable as a millisecond duration.
pub const MAX_CLEANUP_SECS: u64 = i64::MAX as u64 / 1_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
