//! SessionManager — concurrent per-session access via DashMap.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use iqr_core::config::SessionConfig;
use iqr_core::errors::{IqrResult, SessionError};

use crate::info::SessionInfo;
use crate::session::IqrSession;

/// Thread-safe registry of IQR sessions.
///
/// The map only guards membership; each session carries its own lock, so
/// work on different sessions never contends.
pub struct SessionManager {
    sessions: Arc<DashMap<String, Arc<IqrSession>>>,
    config: SessionConfig,
}

impl SessionManager {
    /// Create a new SessionManager.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a new session and return its ID. Generates an ID when none is
    /// given.
    pub fn create_session(&self, session_id: Option<String>) -> IqrResult<String> {
        let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        match self.sessions.entry(session_id.clone()) {
            Entry::Occupied(_) => Err(SessionError::SessionExists { session_id }.into()),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(IqrSession::from_config(
                    session_id.clone(),
                    &self.config,
                )));
                info!(session_id = %session_id, "session created");
                Ok(session_id)
            }
        }
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: &str) -> Option<Arc<IqrSession>> {
        self.sessions.get(session_id).map(|r| Arc::clone(r.value()))
    }

    /// Get a session by ID, failing with `SessionNotFound`.
    pub fn session(&self, session_id: &str) -> IqrResult<Arc<IqrSession>> {
        self.get_session(session_id).ok_or_else(|| {
            SessionError::SessionNotFound {
                session_id: session_id.to_string(),
            }
            .into()
        })
    }

    /// Remove a session. Callers still holding the `Arc` keep a working
    /// session; it is just no longer reachable through the manager.
    pub fn remove_session(&self, session_id: &str) -> Option<Arc<IqrSession>> {
        let removed = self.sessions.remove(session_id).map(|(_, v)| v);
        if removed.is_some() {
            info!(session_id = %session_id, "session removed");
        }
        removed
    }

    /// Reset a session to its empty state, keeping its ID.
    pub fn reset_session(&self, session_id: &str) -> IqrResult<()> {
        self.session(session_id)?.reset();
        Ok(())
    }

    pub fn session_info(&self, session_id: &str) -> IqrResult<SessionInfo> {
        Ok(self.session(session_id)?.info())
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Get all session IDs.
    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
