//! Core types, traits, and validation for cross-venue market arbitrage.
//!
//! This crate defines the data contracts shared by the matching and
//! detection engines: the normalized market record every venue adapter must
//! produce, the match-candidate and opportunity shapes, the durable
//! verification records, the error taxonomy, and the boundary traits for
//! external collaborators (venue adapters, embedding providers, notifiers,
//! and verification stores).

pub mod alerts;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod labels;
pub mod traits;
pub mod types;
pub mod validation;
pub mod verification;

pub use alerts::{AlertLeg, AlertMarket, CandidateAlert, OpportunityAlert};
pub use config::{AppConfig, DetectionSettings, FeeSettings, MatchingSettings};
pub use config_loader::ConfigLoader;
pub use error::{ArbError, Result};
pub use labels::{polarity, Polarity};
pub use traits::{EmbeddingProvider, Notifier, VenueAdapter, VerificationStore};
pub use types::{
    ArbitrageOpportunity, CandidateId, MarketRecord, MatchCandidate, OpportunityLeg, Outcome,
    SideAlignment, Venue,
};
pub use validation::{filter_valid, validate_record};
pub use verification::{Decision, VerificationRecord, VerificationStatus};
