//! # iqr-session
//!
//! Interactive query refinement session engine.
//! Each session owns its adjudications, a working set grown from a
//! nearest-neighbor index, the latest ranking, and cached ordered views of
//! it, all behind one reentrant lock. Sessions live in a `DashMap`
//! registry for concurrent access.
//!
//! ## Modules
//!
//! - `adjudication`: the four positive/negative descriptor sets
//! - `working_set`: incremental candidate pool from positive seeds
//! - `refinement`: one ranking pass with feedback shortlist
//! - `views`: memoized ordered projections of the latest results
//! - `codec`: zipped JSON snapshots of adjudication state
//! - `session`: `IqrSession`, the locked aggregate
//! - `manager`: `SessionManager` registry
//! - `cleanup`: stale session removal
//! - `info`: serializable session summary

pub mod adjudication;
pub mod cleanup;
pub mod codec;
pub mod info;
pub mod manager;
pub mod refinement;
pub mod session;
pub mod views;
pub mod working_set;

pub use adjudication::{AdjudicationDelta, AdjudicationStatus, AdjudicationStore};
pub use cleanup::{cleanup_old_sessions, cleanup_stale_sessions, cleanup_with_config};
pub use codec::{decode_state, encode_state, StatePayload};
pub use info::SessionInfo;
pub use manager::SessionManager;
pub use refinement::RefinementResults;
pub use session::{IqrSession, SessionHold};
pub use views::ScoredDescriptor;
pub use working_set::{GrowReport, WorkingSet};
