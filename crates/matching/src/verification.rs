//! Verification ledger: the human-in-the-loop review workflow.
//!
//! The ledger separates discovery from decision. The engine proposes
//! candidates; each identity gets exactly one durable record that moves
//! `pending -> confirmed | rejected` exactly once. Terminal identities are
//! never re-proposed, which is what keeps repeated discovery quiet about
//! pairs a human has already dispositioned.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use chrono::Utc;
use tracing::{debug, info};

use market_arb_core::error::{ArbError, Result};
use market_arb_core::traits::VerificationStore;
use market_arb_core::types::{CandidateId, MatchCandidate};
use market_arb_core::verification::{Decision, VerificationRecord, VerificationStatus};

// =============================================================================
// In-Memory Store
// =============================================================================

/// Concurrent map-backed store. The default for tests and single-process
/// runs; durable stores implement the same contract.
#[derive(Debug, Default)]
pub struct InMemoryVerificationStore {
    records: DashMap<CandidateId, VerificationRecord>,
}

impl InMemoryVerificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with existing records, as a durable backend
    /// would be after a restart.
    #[must_use]
    pub fn with_records(records: Vec<VerificationRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.candidate_id.clone(), record);
        }
        store
    }
}

impl VerificationStore for InMemoryVerificationStore {
    fn get(&self, id: &CandidateId) -> Option<VerificationRecord> {
        self.records.get(id).map(|r| r.clone())
    }

    fn insert_if_absent(&self, record: VerificationRecord) -> bool {
        match self.records.entry(record.candidate_id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(record);
                true
            }
        }
    }

    fn update<F, T>(&self, id: &CandidateId, f: F) -> Option<T>
    where
        F: FnOnce(&mut VerificationRecord) -> T,
    {
        // The shard lock held by get_mut gives per-identity exclusion.
        self.records.get_mut(id).map(|mut r| f(&mut r))
    }

    fn all(&self) -> Vec<VerificationRecord> {
        self.records.iter().map(|r| r.clone()).collect()
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Tracks the verification state of every identity the engine has ever
/// proposed, and holds the latest candidate snapshot per identity so the
/// detector can price confirmed pairs without re-running discovery.
pub struct VerificationLedger<S: VerificationStore> {
    store: S,
    snapshots: DashMap<CandidateId, MatchCandidate>,
}

impl<S: VerificationStore> VerificationLedger<S> {
    /// Creates a ledger over the given store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            snapshots: DashMap::new(),
        }
    }

    /// Folds a discovery pass into the ledger.
    ///
    /// Returns only the candidates that are genuinely new: identities with
    /// a terminal record are dropped, already-pending identities refresh
    /// their confidence and snapshot but are not re-emitted.
    pub fn ingest(&self, candidates: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
        let mut fresh = Vec::new();

        for candidate in candidates {
            let id = candidate.id.clone();
            self.snapshots.insert(id.clone(), candidate.clone());

            let record = VerificationRecord::pending(id.clone(), candidate.confidence);
            if self.store.insert_if_absent(record) {
                debug!(candidate = %id, confidence = candidate.confidence, "new pending candidate");
                fresh.push(candidate);
                continue;
            }

            self.store.update(&id, |existing| {
                existing.last_seen_confidence = candidate.confidence;
            });
        }

        info!(new_pending = fresh.len(), "discovery pass ingested");
        fresh
    }

    /// Records a human decision for an identity.
    ///
    /// First write wins: a second decision for the same identity fails with
    /// [`ArbError::AlreadyDecided`] and leaves the original intact.
    ///
    /// # Errors
    ///
    /// [`ArbError::UnknownCandidate`] when the ledger has never seen the
    /// identity; [`ArbError::AlreadyDecided`] when it is already terminal.
    pub fn record_decision(
        &self,
        id: &CandidateId,
        decision: Decision,
    ) -> Result<VerificationRecord> {
        let outcome = self.store.update(id, |record| {
            if record.status.is_terminal() {
                return Err(ArbError::already_decided(
                    record.candidate_id.clone(),
                    record.status,
                ));
            }
            record.status = decision.into_status();
            record.decided_at = Some(Utc::now());
            Ok(record.clone())
        });

        match outcome {
            Some(result) => {
                if let Ok(record) = &result {
                    info!(candidate = %id, status = %record.status, "decision recorded");
                }
                result
            }
            None => Err(ArbError::UnknownCandidate {
                candidate_id: id.clone(),
            }),
        }
    }

    /// Returns the record for an identity, if the ledger has seen it.
    #[must_use]
    pub fn status_of(&self, id: &CandidateId) -> Option<VerificationRecord> {
        self.store.get(id)
    }

    /// Latest snapshots of all confirmed identities.
    #[must_use]
    pub fn confirmed_candidates(&self) -> Vec<MatchCandidate> {
        self.candidates_where(|record| record.status == VerificationStatus::Confirmed, 0.0)
    }

    /// Latest snapshots of pending identities at or above the confidence
    /// floor. Auto mode prices these alongside the confirmed set.
    #[must_use]
    pub fn auto_confirmable(&self, min_confidence: f64) -> Vec<MatchCandidate> {
        self.candidates_where(
            |record| record.status == VerificationStatus::Pending,
            min_confidence,
        )
    }

    /// All durable records, for persistence or reporting.
    #[must_use]
    pub fn records(&self) -> Vec<VerificationRecord> {
        self.store.all()
    }

    fn candidates_where(
        &self,
        predicate: impl Fn(&VerificationRecord) -> bool,
        min_confidence: f64,
    ) -> Vec<MatchCandidate> {
        self.store
            .all()
            .into_iter()
            .filter(|record| predicate(record) && record.last_seen_confidence >= min_confidence)
            .filter_map(|record| {
                self.snapshots
                    .get(&record.candidate_id)
                    .map(|snapshot| snapshot.clone())
            })
            .collect()
    }
}
