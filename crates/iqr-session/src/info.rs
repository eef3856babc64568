//! SessionInfo — serializable summary of a session for front ends.

use chrono::{DateTime, Utc};
use serde::Serialize;

use iqr_core::descriptor::DescriptorUid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    /// Live working-set adjudications.
    pub positive_uids: Vec<DescriptorUid>,
    pub negative_uids: Vec<DescriptorUid>,
    /// Live external adjudications.
    pub external_positive_uids: Vec<DescriptorUid>,
    pub external_negative_uids: Vec<DescriptorUid>,
    /// Positives and negatives (working set and external) used by the last
    /// refinement. Empty before the first refinement.
    pub contributing_positive_uids: Vec<DescriptorUid>,
    pub contributing_negative_uids: Vec<DescriptorUid>,
    pub working_set_size: usize,
    pub seeds_used: usize,
    pub has_results: bool,
    pub feedback_size: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}
