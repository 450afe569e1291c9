//! Similarity scorers.
//!
//! Each scorer is an independent function from a record pair to a score in
//! [0, 1]. `None` means neutral: the scorer has nothing to say about this
//! pair and must not veto it. The engine decides how non-neutral outputs
//! gate, veto, or refine the combined confidence.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use tracing::warn;

use market_arb_core::traits::EmbeddingProvider;
use market_arb_core::types::{MarketRecord, Venue};

use crate::text::{normalize_text, similarity_ratio};

/// A composable similarity signal over a cross-venue record pair.
pub trait Scorer: Send + Sync {
    /// Stable name used as the key in a candidate's scores map.
    fn name(&self) -> &'static str;

    /// Scores the pair in [0, 1], or `None` when neutral.
    fn score(&self, a: &MarketRecord, b: &MarketRecord) -> Option<f64>;
}

// =============================================================================
// Lexical
// =============================================================================

/// Normalized edit-distance similarity over title text.
#[derive(Debug, Clone)]
pub struct LexicalScorer {
    /// Append subtitles to the compared text when present.
    pub compare_subtitles: bool,
}

impl LexicalScorer {
    /// Creates a title-only lexical scorer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compare_subtitles: false,
        }
    }

    fn comparable_text(&self, record: &MarketRecord) -> String {
        match (&record.subtitle, self.compare_subtitles) {
            (Some(subtitle), true) => normalize_text(&format!("{} {subtitle}", record.title)),
            _ => normalize_text(&record.title),
        }
    }
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for LexicalScorer {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn score(&self, a: &MarketRecord, b: &MarketRecord) -> Option<f64> {
        Some(similarity_ratio(
            &self.comparable_text(a),
            &self.comparable_text(b),
        ))
    }
}

// =============================================================================
// Temporal
// =============================================================================

/// Expiration proximity check.
///
/// Binary by construction: within tolerance scores 1.0, outside scores 0.0
/// (which the engine treats as an absolute veto). Neutral when either
/// expiration is unknown.
#[derive(Debug, Clone)]
pub struct TemporalScorer {
    /// Maximum allowed expiration difference.
    pub tolerance: Duration,
}

impl TemporalScorer {
    /// Creates a scorer with the given tolerance.
    #[must_use]
    pub fn new(tolerance: Duration) -> Self {
        Self { tolerance }
    }
}

impl Default for TemporalScorer {
    fn default() -> Self {
        // Same-calendar-day tolerance.
        Self::new(Duration::days(1))
    }
}

impl Scorer for TemporalScorer {
    fn name(&self) -> &'static str {
        "temporal"
    }

    fn score(&self, a: &MarketRecord, b: &MarketRecord) -> Option<f64> {
        let (exp_a, exp_b) = (a.expiration?, b.expiration?);
        let diff = (exp_a - exp_b).abs();
        Some(if diff <= self.tolerance { 1.0 } else { 0.0 })
    }
}

// =============================================================================
// Categorical
// =============================================================================

/// Jaccard overlap of the two records' tag sets; neutral when either set
/// is empty.
#[derive(Debug, Clone, Default)]
pub struct CategoricalScorer;

impl Scorer for CategoricalScorer {
    fn name(&self) -> &'static str {
        "categorical"
    }

    fn score(&self, a: &MarketRecord, b: &MarketRecord) -> Option<f64> {
        if a.tags.is_empty() || b.tags.is_empty() {
            return None;
        }
        Some(jaccard(&a.tags, &b.tags))
    }
}

fn jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    let intersection = left.intersection(right).count();
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

// =============================================================================
// Semantic
// =============================================================================

/// Cosine similarity of title embeddings.
///
/// Only constructed when an embedding provider is configured; the provider
/// is swappable behind the trait without touching the engine. Embeddings
/// are cached per `(venue, market_id)` for the scorer's lifetime, so a full
/// cross product embeds each record once. A provider failure is logged and
/// degrades the pair to neutral rather than failing the run.
pub struct SemanticScorer {
    provider: Arc<dyn EmbeddingProvider>,
    cache: DashMap<(Venue, String), Option<Vec<f64>>>,
}

impl SemanticScorer {
    /// Creates a scorer backed by the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            cache: DashMap::new(),
        }
    }

    fn embedding_for(&self, record: &MarketRecord) -> Option<Vec<f64>> {
        let key = (record.venue, record.market_id.clone());
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let embedded = match self.provider.embed(&record.title) {
            Ok(vector) => Some(vector),
            Err(err) => {
                warn!(
                    venue = %record.venue,
                    market_id = %record.market_id,
                    error = %err,
                    "embedding failed, pair degrades to lexical-only"
                );
                None
            }
        };
        self.cache.insert(key, embedded.clone());
        embedded
    }
}

impl Scorer for SemanticScorer {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn score(&self, a: &MarketRecord, b: &MarketRecord) -> Option<f64> {
        let va = self.embedding_for(a)?;
        let vb = self.embedding_for(b)?;
        cosine_similarity(&va, &vb)
    }
}

/// Cosine similarity mapped from [-1, 1] into [0, 1]. `None` on dimension
/// mismatch or zero-magnitude vectors.
fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return None;
    }
    let cosine = (dot / (mag_a * mag_b)).clamp(-1.0, 1.0);
    Some((cosine + 1.0) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use market_arb_core::error::ArbError;
    use market_arb_core::types::Outcome;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(venue: Venue, id: &str, title: &str) -> MarketRecord {
        MarketRecord::new(venue, id, title).with_outcomes(vec![
            Outcome::new("Yes", None, Some(dec!(0.5))),
            Outcome::new("No", None, Some(dec!(0.52))),
        ])
    }

    // ==================== Lexical Tests ====================

    #[test]
    fn test_lexical_identical_titles() {
        let scorer = LexicalScorer::new();
        let a = record(Venue::Kalshi, "K1", "Will BTC hit $100k?");
        let b = record(Venue::Polymarket, "P1", "will btc hit 100k");

        let score = scorer.score(&a, &b).unwrap();
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lexical_unrelated_titles() {
        let scorer = LexicalScorer::new();
        let a = record(Venue::Kalshi, "K1", "Fed cuts rates in March");
        let b = record(Venue::Polymarket, "P1", "Oscars best picture 2026");

        assert!(scorer.score(&a, &b).unwrap() < 0.5);
    }

    #[test]
    fn test_lexical_with_subtitles() {
        let scorer = LexicalScorer {
            compare_subtitles: true,
        };
        let a = record(Venue::Kalshi, "K1", "Presidential election").with_subtitle("Trump wins");
        let b = record(Venue::Polymarket, "P1", "Presidential election").with_subtitle("Trump wins");

        assert!((scorer.score(&a, &b).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    // ==================== Temporal Tests ====================

    #[test]
    fn test_temporal_within_tolerance() {
        let scorer = TemporalScorer::default();
        let base = Utc::now();
        let a = record(Venue::Kalshi, "K1", "t").with_expiration(base);
        let b = record(Venue::Polymarket, "P1", "t")
            .with_expiration(base + Duration::hours(6));

        assert_eq!(scorer.score(&a, &b), Some(1.0));
    }

    #[test]
    fn test_temporal_outside_tolerance() {
        let scorer = TemporalScorer::new(Duration::days(1));
        let base = Utc::now();
        let a = record(Venue::Kalshi, "K1", "t").with_expiration(base);
        let b = record(Venue::Polymarket, "P1", "t")
            .with_expiration(base + Duration::days(30));

        assert_eq!(scorer.score(&a, &b), Some(0.0));
    }

    #[test]
    fn test_temporal_neutral_when_unknown() {
        let scorer = TemporalScorer::default();
        let a = record(Venue::Kalshi, "K1", "t").with_expiration(Utc::now());
        let b = record(Venue::Polymarket, "P1", "t");

        assert_eq!(scorer.score(&a, &b), None);
        assert_eq!(scorer.score(&b, &a), None);
    }

    // ==================== Categorical Tests ====================

    #[test]
    fn test_categorical_overlap() {
        let a = record(Venue::Kalshi, "K1", "t")
            .with_tag("politics")
            .with_tag("us");
        let b = record(Venue::Polymarket, "P1", "t")
            .with_tag("politics")
            .with_tag("elections");

        // Intersection 1, union 3.
        let score = CategoricalScorer.score(&a, &b).unwrap();
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_categorical_neutral_when_empty() {
        let a = record(Venue::Kalshi, "K1", "t").with_tag("politics");
        let b = record(Venue::Polymarket, "P1", "t");

        assert_eq!(CategoricalScorer.score(&a, &b), None);
    }

    #[test]
    fn test_categorical_disjoint_scores_zero() {
        let a = record(Venue::Kalshi, "K1", "t").with_tag("crypto");
        let b = record(Venue::Polymarket, "P1", "t").with_tag("sports");

        assert_eq!(CategoricalScorer.score(&a, &b), Some(0.0));
    }

    // ==================== Semantic Tests ====================

    struct StubProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl EmbeddingProvider for StubProvider {
        fn dimension(&self) -> usize {
            3
        }

        fn embed(&self, text: &str) -> market_arb_core::Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ArbError::Embedding("stub failure".to_string()));
            }
            // Direction depends on the leading character so different
            // titles produce different vectors.
            let lead = f64::from(u32::from(text.chars().next().unwrap_or('a')));
            Ok(vec![lead, 1.0, 0.0])
        }
    }

    #[test]
    fn test_semantic_identical_titles_score_high() {
        let provider = Arc::new(StubProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let scorer = SemanticScorer::new(provider);

        let a = record(Venue::Kalshi, "K1", "same title");
        let b = record(Venue::Polymarket, "P1", "same title");

        let score = scorer.score(&a, &b).unwrap();
        assert!(score > 0.99);
    }

    #[test]
    fn test_semantic_caches_embeddings() {
        let provider = Arc::new(StubProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let scorer = SemanticScorer::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>);

        let a = record(Venue::Kalshi, "K1", "title one");
        let b = record(Venue::Polymarket, "P1", "title two");
        let c = record(Venue::Polymarket, "P2", "title three");

        let _ = scorer.score(&a, &b);
        let _ = scorer.score(&a, &c);

        // a embedded once, b and c once each.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_semantic_provider_failure_is_neutral() {
        let provider = Arc::new(StubProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let scorer = SemanticScorer::new(provider);

        let a = record(Venue::Kalshi, "K1", "t");
        let b = record(Venue::Polymarket, "P1", "t");

        assert_eq!(scorer.score(&a, &b), None);
    }

    // ==================== Cosine Tests ====================

    #[test]
    fn test_cosine_parallel_vectors() {
        let score = cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let score = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!(score.abs() < 1e-9);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), None);
    }
}
