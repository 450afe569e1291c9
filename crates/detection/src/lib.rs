//! Arbitrage detection over verified cross-venue matches.
//!
//! The cross-venue detector prices confirmed match candidates into
//! opposing-position opportunities with exact decimal arithmetic; the
//! single-venue detector scans one venue's books for markets whose full
//! outcome set costs less than the payout; the pipeline wires venue
//! adapters, the matching engine, the verification ledger, the detector,
//! and notifiers into a repeating fetch-match-verify-detect-notify cycle.

pub mod detector;
pub mod fees;
pub mod intra;
pub mod pipeline;

pub use detector::{ArbDetector, DetectorConfig};
pub use fees::FeeSchedule;
pub use intra::{IntraLeg, IntraVenueDetector, IntraVenueOpportunity};
pub use pipeline::{ArbPipeline, RunSummary};
