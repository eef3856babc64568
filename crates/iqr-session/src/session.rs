//! IqrSession — one user's refinement state behind a reentrant lock.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::{debug, info};

use iqr_core::config::SessionConfig;
use iqr_core::descriptor::{DescriptorElement, DescriptorSet, DescriptorUid};
use iqr_core::errors::{IqrResult, SessionError};
use iqr_core::session_span;
use iqr_core::traits::{IDescriptorFactory, INeighborIndex, IRelevancyRanker};

use crate::adjudication::{AdjudicationDelta, AdjudicationStatus, AdjudicationStore};
use crate::codec;
use crate::info::SessionInfo;
use crate::refinement::{self, RefinementResults};
use crate::views::{ResultViews, ScoredDescriptor};
use crate::working_set::{GrowReport, WorkingSet};

/// Mutable state of a session. Only reachable through the session lock.
#[derive(Debug)]
struct SessionState {
    working_set: WorkingSet,
    adjudications: AdjudicationStore,
    results: Option<RefinementResults>,
    views: ResultViews,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl SessionState {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            working_set: WorkingSet::new(),
            adjudications: AdjudicationStore::new(),
            results: None,
            views: ResultViews::new(),
            created_at: now,
            last_activity: now,
        }
    }

    fn clear(&mut self) {
        self.working_set.clear();
        self.adjudications.clear();
        self.results = None;
        self.views.invalidate_all();
    }

    /// Resolve uids against the working set and the adjudicated sets.
    fn resolve(&self, uids: &[DescriptorUid]) -> DescriptorSet {
        let mut resolved = DescriptorSet::new();
        for uid in uids {
            let found = self
                .working_set
                .members()
                .get(uid)
                .or_else(|| self.adjudications.positive.get(uid))
                .or_else(|| self.adjudications.negative.get(uid));
            match found {
                Some(descriptor) => {
                    resolved.insert(Arc::clone(descriptor));
                }
                None => debug!(uid = %uid, "ignoring adjudication for unknown descriptor"),
            }
        }
        resolved
    }
}

/// Holds the session lock so several operations run as one unit.
///
/// Session methods called while a hold is alive re-enter the lock on the
/// same thread; other threads block until the hold is dropped.
pub struct SessionHold<'a> {
    _guard: ReentrantMutexGuard<'a, RefCell<SessionState>>,
}

/// Interactive query refinement session.
///
/// Every public operation takes the session lock for its whole duration, so
/// operations on one session are serialized and reads never observe a
/// half-applied mutation. Capabilities passed to `grow` and `refine` run
/// under the lock without borrowing the state, so they may call back into
/// the same session from the same thread.
pub struct IqrSession {
    session_id: String,
    pos_seed_neighbors: usize,
    state: ReentrantMutex<RefCell<SessionState>>,
}

impl IqrSession {
    /// Create a session with a generated id.
    pub fn new(pos_seed_neighbors: usize) -> Self {
        Self::with_id(uuid::Uuid::new_v4().simple().to_string(), pos_seed_neighbors)
    }

    pub fn with_id(session_id: impl Into<String>, pos_seed_neighbors: usize) -> Self {
        Self {
            session_id: session_id.into(),
            pos_seed_neighbors,
            state: ReentrantMutex::new(RefCell::new(SessionState::new())),
        }
    }

    pub fn from_config(session_id: impl Into<String>, config: &SessionConfig) -> Self {
        Self::with_id(session_id, config.pos_seed_neighbors)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn pos_seed_neighbors(&self) -> usize {
        self.pos_seed_neighbors
    }

    /// Take the session lock until the returned hold is dropped.
    pub fn hold(&self) -> SessionHold<'_> {
        SessionHold {
            _guard: self.state.lock(),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        state.last_activity = Utc::now();
        f(&mut *state)
    }

    // ── Adjudication ──────────────────────────────────────────────────────

    /// Add positive/negative examples from outside the working set.
    ///
    /// Positives are applied before negatives, so a descriptor passed in
    /// both ends up negative.
    pub fn set_external(&self, positive: &[Arc<DescriptorElement>], negative: &[Arc<DescriptorElement>]) {
        let positive: DescriptorSet = positive.iter().cloned().collect();
        let negative: DescriptorSet = negative.iter().cloned().collect();
        self.with_state(|state| state.adjudications.set_external(&positive, &negative));
    }

    /// Update working-set adjudications.
    ///
    /// A descriptor given as both a new positive and a new negative ends up
    /// in neither set. Descriptors not currently adjudicated are no-ops for
    /// the `un_*` arguments.
    pub fn adjudicate(
        &self,
        new_positives: &[Arc<DescriptorElement>],
        new_negatives: &[Arc<DescriptorElement>],
        un_positives: &[Arc<DescriptorElement>],
        un_negatives: &[Arc<DescriptorElement>],
    ) -> AdjudicationDelta {
        let sets: [DescriptorSet; 4] = [new_positives, new_negatives, un_positives, un_negatives]
            .map(|items| items.iter().cloned().collect());
        self.with_state(|state| {
            let delta = state
                .adjudications
                .adjudicate(&sets[0], &sets[1], &sets[2], &sets[3]);
            state.views.invalidate_for(delta);
            delta
        })
    }

    /// Adjudicate by uid. `neutral` uids are removed from both sets.
    ///
    /// Uids resolve against the working set and the current adjudications;
    /// unknown uids are ignored.
    pub fn adjudicate_uids(
        &self,
        positive: &[DescriptorUid],
        negative: &[DescriptorUid],
        neutral: &[DescriptorUid],
    ) -> AdjudicationDelta {
        self.with_state(|state| {
            let new_positives = state.resolve(positive);
            let new_negatives = state.resolve(negative);
            let neutral = state.resolve(neutral);
            let delta =
                state
                    .adjudications
                    .adjudicate(&new_positives, &new_negatives, &neutral, &neutral);
            state.views.invalidate_for(delta);
            delta
        })
    }

    pub fn adjudication_status(&self, uid: &DescriptorUid) -> AdjudicationStatus {
        self.with_state(|state| state.adjudications.status(uid))
    }

    // ── Working set & refinement ──────────────────────────────────────────

    /// Grow the working set from positive seeds not yet used.
    ///
    /// Fails with `NoPositiveExamples` when there are no positive seeds.
    /// Seeds queried before an index failure stay recorded.
    pub fn grow(&self, index: &dyn INeighborIndex) -> IqrResult<GrowReport> {
        let _span = session_span!("grow", self.session_id).entered();
        let guard = self.state.lock();

        let pending = {
            let mut state = guard.borrow_mut();
            state.last_activity = Utc::now();
            let seeds = state.adjudications.all_positive();
            if seeds.is_empty() {
                return Err(SessionError::NoPositiveExamples.into());
            }
            info!(
                session_id = %self.session_id,
                seeds = seeds.len(),
                external = state.adjudications.external_positive.len(),
                adjudicated = state.adjudications.positive.len(),
                "building working set"
            );
            state.working_set.pending_seeds(&seeds)
        };

        let mut report = GrowReport::default();
        for seed in pending {
            debug!(seed = %seed.uid(), fanout = self.pos_seed_neighbors, "querying neighbors");
            let neighbors = index.nn(&seed, self.pos_seed_neighbors)?;
            let mut state = guard.borrow_mut();
            report.added += state.working_set.absorb(seed.uid(), neighbors);
            report.seeds_queried += 1;
        }
        report.working_set_size = guard.borrow().working_set.len();

        debug!(
            session_id = %self.session_id,
            seeds_queried = report.seeds_queried,
            added = report.added,
            size = report.working_set_size,
            "working set updated"
        );
        Ok(report)
    }

    /// Re-rank the working set against the current adjudications.
    ///
    /// Ranks a copy of the adjudications and working set taken on entry. On
    /// success the previous results, feedback, and all views are replaced.
    /// On failure nothing changes.
    pub fn refine(&self, ranker: &dyn IRelevancyRanker) -> IqrResult<()> {
        let _span = session_span!("refine", self.session_id).entered();
        let guard = self.state.lock();

        let (adjudications, working_set) = {
            let mut state = guard.borrow_mut();
            state.last_activity = Utc::now();
            (state.adjudications.clone(), state.working_set.clone())
        };
        let results = refinement::refine(&adjudications, &working_set, ranker)?;
        info!(
            session_id = %self.session_id,
            pool = results.scores.len(),
            pos = results.contributors.all_positive().len(),
            neg = results.contributors.all_negative().len(),
            feedback = results.feedback.len(),
            "refinement complete"
        );

        let mut state = guard.borrow_mut();
        state.results = Some(results);
        state.views.invalidate_all();
        Ok(())
    }

    // ── Result views ──────────────────────────────────────────────────────

    /// All working-set descriptors by descending relevancy. Empty before the
    /// first refinement.
    pub fn ordered_results(&self) -> Vec<ScoredDescriptor> {
        self.with_state(|state| state.views.ordered_results(state.results.as_ref()))
    }

    /// The `[start, end)` slice of `ordered_results`, clamped to what exists.
    pub fn ordered_results_range(&self, start: usize, end: Option<usize>) -> Vec<ScoredDescriptor> {
        let all = self.ordered_results();
        let end = end.unwrap_or(all.len()).min(all.len());
        if start >= end {
            return Vec::new();
        }
        all[start..end].to_vec()
    }

    /// Results that were positive when the last refinement ran.
    pub fn ordered_positive(&self) -> Vec<ScoredDescriptor> {
        self.with_state(|state| state.views.ordered_positive(state.results.as_ref()))
    }

    /// Results that were negative when the last refinement ran.
    pub fn ordered_negative(&self) -> Vec<ScoredDescriptor> {
        self.with_state(|state| state.views.ordered_negative(state.results.as_ref()))
    }

    /// Results that were not adjudicated when the last refinement ran.
    pub fn ordered_unadjudicated(&self) -> Vec<ScoredDescriptor> {
        self.with_state(|state| state.views.ordered_unadjudicated(state.results.as_ref()))
    }

    /// Descriptors the ranker suggests adjudicating next, most useful first.
    pub fn feedback_results(&self) -> Vec<Arc<DescriptorElement>> {
        self.with_state(|state| {
            state
                .results
                .as_ref()
                .map(|r| r.feedback.clone())
                .unwrap_or_default()
        })
    }

    pub fn relevancy_score(&self, uid: &DescriptorUid) -> Option<f64> {
        self.with_state(|state| state.results.as_ref().and_then(|r| r.score_of(uid)))
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Clear everything: working set, seeds, adjudications, results, views.
    pub fn reset(&self) {
        self.with_state(|state| state.clear());
        info!(session_id = %self.session_id, "session reset");
    }

    /// Snapshot the four adjudication sets as archive bytes.
    pub fn export_state(&self) -> IqrResult<Vec<u8>> {
        self.with_state(|state| codec::encode_state(&state.adjudications))
    }

    /// Replace this session's state with a snapshot from `export_state`.
    ///
    /// Undecodable bytes fail before anything changes. Once decoded, the
    /// session is reset; if rebuilding descriptors then fails the session
    /// stays empty.
    pub fn import_state(&self, bytes: &[u8], factory: &dyn IDescriptorFactory) -> IqrResult<()> {
        let payload = codec::decode_state(bytes)?;

        let _hold = self.hold();
        self.reset();
        let restored = payload.restore(factory)?;
        self.with_state(|state| {
            info!(
                session_id = %self.session_id,
                pos = restored.positive.len(),
                neg = restored.negative.len(),
                external_pos = restored.external_positive.len(),
                external_neg = restored.external_negative.len(),
                "state imported"
            );
            state.adjudications = restored;
        });
        Ok(())
    }

    // ── Read accessors ────────────────────────────────────────────────────

    /// Copy of the live adjudication sets.
    pub fn adjudications(&self) -> AdjudicationStore {
        self.with_state(|state| state.adjudications.clone())
    }

    pub fn working_set(&self) -> DescriptorSet {
        self.with_state(|state| state.working_set.members().clone())
    }

    pub fn working_set_size(&self) -> usize {
        self.with_state(|state| state.working_set.len())
    }

    pub fn seeds_used(&self) -> BTreeSet<DescriptorUid> {
        self.with_state(|state| state.working_set.seeds_used().clone())
    }

    pub fn has_results(&self) -> bool {
        self.with_state(|state| state.results.is_some())
    }

    /// Freshness of the (results, positive, negative, unadjudicated) views.
    pub fn view_freshness(&self) -> [bool; 4] {
        self.with_state(|state| state.views.freshness())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.created_at
    }

    /// Time of the most recent operation. Does not count as activity itself.
    pub fn last_activity(&self) -> DateTime<Utc> {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.last_activity
    }

    pub fn info(&self) -> SessionInfo {
        self.with_state(|state| {
            let uids = |set: &DescriptorSet| set.uids().cloned().collect::<Vec<_>>();
            let a = &state.adjudications;
            let (contrib_pos, contrib_neg) = state
                .results
                .as_ref()
                .map(|r| {
                    (
                        uids(&r.contributors.all_positive()),
                        uids(&r.contributors.all_negative()),
                    )
                })
                .unwrap_or_default();
            SessionInfo {
                session_id: self.session_id.clone(),
                positive_uids: uids(&a.positive),
                negative_uids: uids(&a.negative),
                external_positive_uids: uids(&a.external_positive),
                external_negative_uids: uids(&a.external_negative),
                contributing_positive_uids: contrib_pos,
                contributing_negative_uids: contrib_neg,
                working_set_size: state.working_set.len(),
                seeds_used: state.working_set.seeds_used().len(),
                has_results: state.results.is_some(),
                feedback_size: state.results.as_ref().map_or(0, |r| r.feedback.len()),
                created_at: state.created_at,
                last_activity: state.last_activity,
            }
        })
    }
}

impl fmt::Debug for IqrSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IqrSession")
            .field("session_id", &self.session_id)
            .field("pos_seed_neighbors", &self.pos_seed_neighbors)
            .finish_non_exhaustive()
    }
}
