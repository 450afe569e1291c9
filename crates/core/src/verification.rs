//! Verification records: the durable state of the review workflow.
//!
//! These are the only records that must survive a process restart. The
//! state machine that transitions them lives in the matching crate; the
//! shapes live here because the persistence contract
//! ([`crate::traits::VerificationStore`]) is part of the core's boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CandidateId;

// =============================================================================
// Status & Decisions
// =============================================================================

/// Human-reviewed disposition of a candidate identity.
///
/// `Pending` can transition to either terminal state exactly once; records
/// are never deleted, so a rejected pair is never re-proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Awaiting a human decision.
    Pending,
    /// Confirmed as the same real-world event.
    Confirmed,
    /// Rejected as a false match.
    Rejected,
}

impl VerificationStatus {
    /// Returns true once no further transition is permitted.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected)
    }

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A human decision delivered by the decision source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// The pair is the same event.
    Confirmed,
    /// The pair is not the same event.
    Rejected,
}

impl Decision {
    /// The terminal status this decision produces.
    #[must_use]
    pub fn into_status(self) -> VerificationStatus {
        match self {
            Self::Confirmed => VerificationStatus::Confirmed,
            Self::Rejected => VerificationStatus::Rejected,
        }
    }
}

// =============================================================================
// Verification Record
// =============================================================================

/// One durable record per candidate identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// The canonical pair identity.
    pub candidate_id: CandidateId,

    /// Current disposition.
    pub status: VerificationStatus,

    /// Most recent confidence the matching engine produced for this pair.
    pub last_seen_confidence: f64,

    /// When this identity was first discovered.
    pub first_seen: DateTime<Utc>,

    /// When a terminal decision was recorded, if any.
    pub decided_at: Option<DateTime<Utc>>,
}

impl VerificationRecord {
    /// Creates a fresh pending record.
    #[must_use]
    pub fn pending(candidate_id: CandidateId, confidence: f64) -> Self {
        Self {
            candidate_id,
            status: VerificationStatus::Pending,
            last_seen_confidence: confidence,
            first_seen: Utc::now(),
            decided_at: None,
        }
    }
}
