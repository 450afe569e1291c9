//! Cross-venue matching engine.
//!
//! Runs the scoring pipeline over the cross product of two venues' record
//! lists: a lexical gate first, then the temporal and categorical vetoes,
//! then an optional semantic refinement of the surviving pairs' confidence.
//! Produces ranked [`MatchCandidate`]s; verification state is the ledger's
//! concern, not the engine's.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, trace};

use market_arb_core::config::MatchingSettings;
use market_arb_core::traits::EmbeddingProvider;
use market_arb_core::types::{CandidateId, MarketRecord, MatchCandidate};
use market_arb_core::validation::validate_record;

use crate::alignment::resolve_alignment;
use crate::scorers::{
    CategoricalScorer, LexicalScorer, Scorer, SemanticScorer, TemporalScorer,
};

// =============================================================================
// Configuration
// =============================================================================

/// Matching engine configuration.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Lexical gate: pairs scoring below this are never candidates.
    pub similarity_threshold: f64,

    /// Maximum allowed expiration difference before the temporal veto
    /// fires.
    pub temporal_tolerance: Duration,

    /// Weight of the semantic score when blending into the confidence.
    pub semantic_weight: f64,

    /// Categorical veto floor. Tag overlap below this (when both sides
    /// carry tags) rejects the pair; 0.0 vetoes only fully disjoint sets.
    pub min_categorical_overlap: f64,

    /// Include subtitles in the lexical comparison.
    pub compare_subtitles: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            temporal_tolerance: Duration::days(1),
            semantic_weight: 0.3,
            min_categorical_overlap: 0.0,
            compare_subtitles: false,
        }
    }
}

impl MatchConfig {
    /// High-precision preset: raises the lexical gate and tightens the
    /// expiration window.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            similarity_threshold: 0.9,
            temporal_tolerance: Duration::hours(6),
            ..Self::default()
        }
    }

    /// High-recall preset: lowers the gate and widens the window. Useful
    /// when a human reviews every candidate anyway.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            similarity_threshold: 0.65,
            temporal_tolerance: Duration::days(3),
            ..Self::default()
        }
    }

    /// Sets the lexical gate threshold.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Sets the temporal tolerance.
    #[must_use]
    pub fn with_temporal_tolerance(mut self, tolerance: Duration) -> Self {
        self.temporal_tolerance = tolerance;
        self
    }

    /// Sets the semantic blend weight.
    #[must_use]
    pub fn with_semantic_weight(mut self, weight: f64) -> Self {
        self.semantic_weight = weight;
        self
    }

    /// Sets the categorical veto floor.
    #[must_use]
    pub fn with_min_categorical_overlap(mut self, overlap: f64) -> Self {
        self.min_categorical_overlap = overlap;
        self
    }

    /// Enables subtitle comparison.
    #[must_use]
    pub fn with_subtitles(mut self) -> Self {
        self.compare_subtitles = true;
        self
    }
}

impl From<&MatchingSettings> for MatchConfig {
    fn from(settings: &MatchingSettings) -> Self {
        Self {
            similarity_threshold: settings.similarity_threshold,
            temporal_tolerance: Duration::seconds(settings.temporal_tolerance_secs),
            semantic_weight: settings.semantic_weight,
            min_categorical_overlap: settings.min_categorical_overlap,
            compare_subtitles: settings.compare_subtitles,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Pairs listings across two venues and ranks them by match confidence.
pub struct MatchEngine {
    config: MatchConfig,
    lexical: LexicalScorer,
    temporal: TemporalScorer,
    categorical: CategoricalScorer,
    semantic: Option<SemanticScorer>,
}

impl MatchEngine {
    /// Creates an engine without semantic refinement.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        let lexical = LexicalScorer {
            compare_subtitles: config.compare_subtitles,
        };
        let temporal = TemporalScorer::new(config.temporal_tolerance);
        Self {
            config,
            lexical,
            temporal,
            categorical: CategoricalScorer,
            semantic: None,
        }
    }

    /// Attaches an embedding provider, enabling the semantic blend.
    #[must_use]
    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.semantic = Some(SemanticScorer::new(provider));
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Finds match candidates across the two venues' record lists.
    ///
    /// Malformed records are skipped, never fatal. Output is sorted by
    /// confidence descending, ties broken by earlier expiration.
    #[must_use]
    pub fn find_candidates(
        &self,
        side_a: &[MarketRecord],
        side_b: &[MarketRecord],
    ) -> Vec<MatchCandidate> {
        let left: Vec<&MarketRecord> = side_a
            .iter()
            .filter(|r| self.record_usable(r))
            .collect();
        let right: Vec<&MarketRecord> = side_b
            .iter()
            .filter(|r| self.record_usable(r))
            .collect();

        let mut candidates = Vec::new();
        for a in &left {
            for b in &right {
                if a.venue == b.venue {
                    continue;
                }
                if let Some(candidate) = self.score_pair(a, b) {
                    candidates.push(candidate);
                }
            }
        }

        candidates.sort_by(|x, y| {
            y.confidence
                .total_cmp(&x.confidence)
                .then_with(|| match (x.earliest_expiration(), y.earliest_expiration()) {
                    (Some(ex), Some(ey)) => ex.cmp(&ey),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
        });

        info!(
            side_a = left.len(),
            side_b = right.len(),
            candidates = candidates.len(),
            "matching pass complete"
        );

        candidates
    }

    fn record_usable(&self, record: &MarketRecord) -> bool {
        match validate_record(record) {
            Ok(()) => true,
            Err(err) => {
                debug!(
                    venue = %record.venue,
                    market_id = %record.market_id,
                    error = %err,
                    "skipping malformed record"
                );
                false
            }
        }
    }

    /// Scores a single cross-venue pair, returning `None` when any gate or
    /// veto rejects it.
    fn score_pair(&self, a: &MarketRecord, b: &MarketRecord) -> Option<MatchCandidate> {
        let mut scores = BTreeMap::new();

        // Lexical gate. Always non-neutral; cheap enough to run over the
        // full cross product.
        let lexical = self.lexical.score(a, b)?;
        if lexical < self.config.similarity_threshold {
            return None;
        }
        scores.insert(self.lexical.name().to_string(), lexical);

        // Temporal veto is absolute: a non-neutral zero rejects no matter
        // how similar the titles read.
        if let Some(temporal) = self.temporal.score(a, b) {
            if temporal == 0.0 {
                trace!(
                    market_a = %a.market_id,
                    market_b = %b.market_id,
                    "temporal veto"
                );
                return None;
            }
            scores.insert(self.temporal.name().to_string(), temporal);
        }

        // Categorical veto fires only when both sides carry tags.
        if let Some(overlap) = self.categorical.score(a, b) {
            if overlap == 0.0 || overlap < self.config.min_categorical_overlap {
                trace!(
                    market_a = %a.market_id,
                    market_b = %b.market_id,
                    overlap,
                    "categorical veto"
                );
                return None;
            }
            scores.insert(self.categorical.name().to_string(), overlap);
        }

        // Semantic refinement blends into the confidence; a neutral
        // semantic leaves the lexical score as the confidence.
        let confidence = match self.semantic.as_ref().and_then(|s| s.score(a, b)) {
            Some(semantic) => {
                scores.insert("semantic".to_string(), semantic);
                let w = self.config.semantic_weight;
                ((1.0 - w) * lexical + w * semantic).clamp(0.0, 1.0)
            }
            None => lexical,
        };

        // Canonical record order must agree with the identity so that
        // repeated discovery lines up side A with side A.
        let id = CandidateId::of(a, b);
        let (record_a, record_b) = if (a.venue, a.market_id.as_str())
            <= (b.venue, b.market_id.as_str())
        {
            (a, b)
        } else {
            (b, a)
        };

        let alignment = resolve_alignment(record_a, record_b);

        debug!(
            candidate = %id,
            confidence,
            alignment = %alignment,
            "candidate found"
        );

        Some(MatchCandidate {
            id,
            record_a: (*record_a).clone(),
            record_b: (*record_b).clone(),
            scores,
            confidence,
            alignment,
            discovered_at: Utc::now(),
        })
    }
}
