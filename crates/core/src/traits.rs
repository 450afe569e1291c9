//! Boundary contracts for external collaborators.
//!
//! Venue adapters, notifiers, and stores do I/O and are async; the matching
//! and detection engines themselves never block. The embedding provider is
//! deliberately synchronous so the matching engine stays a pure function
//! that can be called from either a sync or an async caller.

use async_trait::async_trait;

use crate::alerts::{CandidateAlert, OpportunityAlert};
use crate::error::Result;
use crate::types::{CandidateId, MarketRecord, Venue};
use crate::verification::VerificationRecord;

/// Supplies normalized market records for one venue.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// The venue this adapter serves.
    fn venue(&self) -> Venue;

    /// Fetches the venue's current listings in normalized form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ArbError::VenueUnavailable`] on transport or
    /// auth failure. A partial or empty sequence is not an error.
    async fn fetch_normalized_markets(&self) -> Result<Vec<MarketRecord>>;
}

/// Produces fixed-dimension embedding vectors for market titles.
///
/// Optional: absence simply disables the semantic scorer. Implementations
/// may block internally (e.g. a local model) or pre-compute.
pub trait EmbeddingProvider: Send + Sync {
    /// Length of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Embeds a piece of text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ArbError::Embedding`] when the provider
    /// cannot produce a vector.
    fn embed(&self, text: &str) -> Result<Vec<f64>>;
}

/// Receives structured records for rendering and delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Called once per new match candidate needing review.
    async fn notify_candidate(&self, alert: &CandidateAlert) -> Result<()>;

    /// Called once per detected arbitrage opportunity.
    async fn notify_opportunity(&self, alert: &OpportunityAlert) -> Result<()>;
}

/// Persistence contract for verification records.
///
/// The records are the only core state that must survive a restart. The
/// format is the implementation's concern; the contract is
/// lookup-by-identity and full enumeration. Implementations must provide
/// per-identity mutual exclusion for [`VerificationStore::update`] so that
/// first-write-wins holds under concurrent decisions.
pub trait VerificationStore: Send + Sync {
    /// Looks up the record for an identity.
    fn get(&self, id: &CandidateId) -> Option<VerificationRecord>;

    /// Inserts a record if the identity is absent; returns whether it was
    /// inserted.
    fn insert_if_absent(&self, record: VerificationRecord) -> bool;

    /// Applies a closure to the record for `id` under the identity's lock.
    /// Returns `None` when the identity is unknown.
    fn update<F, T>(&self, id: &CandidateId, f: F) -> Option<T>
    where
        F: FnOnce(&mut VerificationRecord) -> T;

    /// Enumerates all records.
    fn all(&self) -> Vec<VerificationRecord>;
}
