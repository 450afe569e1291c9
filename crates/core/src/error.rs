//! Error taxonomy for the matching and detection core.
//!
//! Per-record and per-pair failures are isolated: data-quality problems are
//! skipped with a diagnostic and never crash a run. Only systemic failures
//! (both venues unavailable) surface to the caller.

use thiserror::Error;

use crate::types::{CandidateId, Venue};
use crate::verification::VerificationStatus;

/// Errors produced by the core and its collaborator contracts.
#[derive(Debug, Error)]
pub enum ArbError {
    /// One venue's records could not be fetched. The run proceeds with
    /// zero candidates involving that venue.
    #[error("venue unavailable: {venue} - {reason}")]
    VenueUnavailable {
        /// The venue that failed.
        venue: Venue,
        /// Transport or auth failure detail.
        reason: String,
    },

    /// Neither venue produced records; nothing to match against.
    #[error("all venues unavailable")]
    AllVenuesUnavailable,

    /// A record is missing required fields or violates a price invariant.
    /// Skipped with a diagnostic, never fatal.
    #[error("malformed record {venue}:{market_id} - {reason}")]
    MalformedRecord {
        /// Venue the record came from.
        venue: Venue,
        /// The offending market id (may be empty when that is the problem).
        market_id: String,
        /// What was wrong.
        reason: String,
    },

    /// A decision was submitted for an identity that already carries a
    /// terminal status. The original status is left unchanged.
    #[error("already decided: {candidate_id} is {status}")]
    AlreadyDecided {
        /// The terminal identity.
        candidate_id: CandidateId,
        /// Its existing status.
        status: VerificationStatus,
    },

    /// A decision referenced an identity the ledger has never seen.
    #[error("unknown candidate: {candidate_id}")]
    UnknownCandidate {
        /// The unknown identity.
        candidate_id: CandidateId,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The embedding provider failed for a piece of text.
    #[error("embedding error: {0}")]
    Embedding(String),
}

impl ArbError {
    /// Creates a venue-unavailable error.
    pub fn venue_unavailable(venue: Venue, reason: impl Into<String>) -> Self {
        Self::VenueUnavailable {
            venue,
            reason: reason.into(),
        }
    }

    /// Creates a malformed-record error.
    pub fn malformed_record(
        venue: Venue,
        market_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            venue,
            market_id: market_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an already-decided error.
    pub fn already_decided(candidate_id: CandidateId, status: VerificationStatus) -> Self {
        Self::AlreadyDecided {
            candidate_id,
            status,
        }
    }

    /// Returns true for data-quality failures handled by skip-and-continue.
    #[must_use]
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }

    /// Returns true for failures that must surface to the caller.
    #[must_use]
    pub fn is_systemic(&self) -> bool {
        matches!(self, Self::AllVenuesUnavailable | Self::Configuration(_))
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, ArbError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Construction Tests ====================

    #[test]
    fn test_venue_unavailable_display() {
        let err = ArbError::venue_unavailable(Venue::Kalshi, "401 unauthorized");
        let display = err.to_string();
        assert!(display.contains("Kalshi"));
        assert!(display.contains("401 unauthorized"));
    }

    #[test]
    fn test_malformed_record_display() {
        let err = ArbError::malformed_record(Venue::Polymarket, "P1", "bid above ask");
        let display = err.to_string();
        assert!(display.contains("Polymarket:P1"));
        assert!(display.contains("bid above ask"));
    }

    #[test]
    fn test_already_decided_display() {
        let id = CandidateId::new(Venue::Kalshi, "K1", Venue::Polymarket, "P1");
        let err = ArbError::already_decided(id, VerificationStatus::Confirmed);
        assert!(err.to_string().contains("confirmed"));
    }

    // ==================== Classification Tests ====================

    #[test]
    fn test_malformed_record_is_data_quality() {
        let err = ArbError::malformed_record(Venue::Kalshi, "K1", "no outcomes");
        assert!(err.is_data_quality());
        assert!(!err.is_systemic());
    }

    #[test]
    fn test_all_venues_unavailable_is_systemic() {
        assert!(ArbError::AllVenuesUnavailable.is_systemic());
        assert!(!ArbError::AllVenuesUnavailable.is_data_quality());
    }

    #[test]
    fn test_single_venue_unavailable_is_not_systemic() {
        let err = ArbError::venue_unavailable(Venue::Polymarket, "timeout");
        assert!(!err.is_systemic());
    }
}
