//! Cross-venue market matching.
//!
//! Discovery pairs normalized listings from two venues that likely
//! represent the same real-world event, and the verification ledger routes
//! every proposed pair through an explicit review workflow before the
//! detector may price it.
//!
//! ```no_run
//! use market_arb_matching::{MatchConfig, MatchEngine};
//!
//! let engine = MatchEngine::new(MatchConfig::default());
//! let candidates = engine.find_candidates(&[], &[]);
//! assert!(candidates.is_empty());
//! ```

pub mod alignment;
pub mod engine;
pub mod scorers;
pub mod text;
pub mod verification;

pub use alignment::{has_negation_cue, resolve_alignment};
pub use engine::{MatchConfig, MatchEngine};
pub use scorers::{
    CategoricalScorer, LexicalScorer, Scorer, SemanticScorer, TemporalScorer,
};
pub use text::{normalize_text, similarity_ratio};
pub use verification::{InMemoryVerificationStore, VerificationLedger};
