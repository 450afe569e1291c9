//! Shared types for cross-venue market matching and arbitrage detection.
//!
//! This module defines the normalized market record every venue adapter must
//! produce, the match-candidate pair record, and the derived arbitrage
//! opportunity shape.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::labels::{polarity, Polarity};

// =============================================================================
// Venue Identifiers
// =============================================================================

/// Identifies which venue a market listing belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Venue {
    /// Kalshi prediction market.
    Kalshi,
    /// Polymarket CLOB.
    Polymarket,
}

impl Venue {
    /// Returns the display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kalshi => "Kalshi",
            Self::Polymarket => "Polymarket",
        }
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Outcome Sides
// =============================================================================

/// One bettable side of a market, with best-of-book quotes.
///
/// Prices are probabilities in (0, 1). A missing ask means the side cannot
/// currently be bought; such a record may still participate in matching but
/// is excluded from arbitrage consideration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Venue-supplied side label (e.g. "Yes", "No", "Up", "Down").
    pub label: String,

    /// Best bid for this side, if quoted.
    pub best_bid: Option<Decimal>,

    /// Best ask for this side, if quoted.
    pub best_ask: Option<Decimal>,

    /// Size available at the best ask, if the venue reports one.
    pub liquidity: Option<Decimal>,
}

impl Outcome {
    /// Creates an outcome with quotes and no liquidity signal.
    #[must_use]
    pub fn new(label: impl Into<String>, best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> Self {
        Self {
            label: label.into(),
            best_bid,
            best_ask,
            liquidity: None,
        }
    }

    /// Attaches a liquidity signal.
    #[must_use]
    pub fn with_liquidity(mut self, liquidity: Decimal) -> Self {
        self.liquidity = Some(liquidity);
        self
    }

    /// Returns the label's polarity, when the synonym table knows it.
    #[must_use]
    pub fn polarity(&self) -> Option<Polarity> {
        polarity(&self.label)
    }
}

// =============================================================================
// Normalized Market Record
// =============================================================================

/// The common shape every venue adapter must produce before a listing
/// enters the matching engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Venue this listing came from.
    pub venue: Venue,

    /// Venue-scoped stable market identifier.
    pub market_id: String,

    /// Optional venue-scoped event grouping identifier.
    pub event_id: Option<String>,

    /// Listing title.
    pub title: String,

    /// Listing subtitle, if the venue provides one.
    pub subtitle: Option<String>,

    /// Normalized category tags.
    pub tags: BTreeSet<String>,

    /// Expiration instant in UTC, if known.
    pub expiration: Option<DateTime<Utc>>,

    /// Ordered outcome sides.
    pub outcomes: Vec<Outcome>,

    /// Link to the listing, for notification rendering.
    pub url: Option<String>,
}

impl MarketRecord {
    /// Creates a record with the required fields; optional fields default
    /// to empty.
    #[must_use]
    pub fn new(venue: Venue, market_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            venue,
            market_id: market_id.into(),
            event_id: None,
            title: title.into(),
            subtitle: None,
            tags: BTreeSet::new(),
            expiration: None,
            outcomes: Vec::new(),
            url: None,
        }
    }

    /// Sets the expiration instant.
    #[must_use]
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Sets the outcome sides.
    #[must_use]
    pub fn with_outcomes(mut self, outcomes: Vec<Outcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Adds a category tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Sets the listing URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Returns true if the market has exactly two outcome sides.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.outcomes.len() == 2
    }

    /// Returns true if at least one side has a quoted ask.
    #[must_use]
    pub fn has_quoted_ask(&self) -> bool {
        self.outcomes.iter().any(|o| o.best_ask.is_some())
    }

    /// Returns the positive-polarity side of a binary market, if the
    /// labels resolve to exactly one positive and one negative side.
    #[must_use]
    pub fn positive_outcome(&self) -> Option<&Outcome> {
        self.resolved_sides().map(|(pos, _)| pos)
    }

    /// Returns the negative-polarity side of a binary market.
    #[must_use]
    pub fn negative_outcome(&self) -> Option<&Outcome> {
        self.resolved_sides().map(|(_, neg)| neg)
    }

    /// Resolves a binary market into (positive, negative) sides via the
    /// label polarity table. Returns `None` for non-binary markets and for
    /// label sets that do not split into one side of each polarity.
    #[must_use]
    pub fn resolved_sides(&self) -> Option<(&Outcome, &Outcome)> {
        if !self.is_binary() {
            return None;
        }
        let first = &self.outcomes[0];
        let second = &self.outcomes[1];
        match (first.polarity()?, second.polarity()?) {
            (Polarity::Positive, Polarity::Negative) => Some((first, second)),
            (Polarity::Negative, Polarity::Positive) => Some((second, first)),
            _ => None,
        }
    }
}

// =============================================================================
// Candidate Identity
// =============================================================================

/// Canonical identity of a cross-venue pair.
///
/// The identity is unordered: the lexicographically smaller
/// `(venue, market_id)` pair is always stored as side A, so the same two
/// listings produce the same identity no matter which venue's records were
/// passed first. Stable across runs, which is what lets repeated discovery
/// deduplicate against persisted verification state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId {
    /// Venue of side A.
    pub venue_a: Venue,
    /// Market id of side A.
    pub market_id_a: String,
    /// Venue of side B.
    pub venue_b: Venue,
    /// Market id of side B.
    pub market_id_b: String,
}

impl CandidateId {
    /// Creates a canonical identity from the two sides, in either order.
    #[must_use]
    pub fn new(
        venue_a: Venue,
        market_id_a: impl Into<String>,
        venue_b: Venue,
        market_id_b: impl Into<String>,
    ) -> Self {
        let a = (venue_a, market_id_a.into());
        let b = (venue_b, market_id_b.into());
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            venue_a: first.0,
            market_id_a: first.1,
            venue_b: second.0,
            market_id_b: second.1,
        }
    }

    /// Derives the identity of a record pair.
    #[must_use]
    pub fn of(a: &MarketRecord, b: &MarketRecord) -> Self {
        Self::new(a.venue, a.market_id.clone(), b.venue, b.market_id.clone())
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}|{}:{}",
            self.venue_a, self.market_id_a, self.venue_b, self.market_id_b
        )
    }
}

// =============================================================================
// Side Alignment
// =============================================================================

/// How the outcome sides of the two listings correspond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideAlignment {
    /// Side A's positive outcome corresponds to side B's positive outcome.
    SamePolarity,
    /// The venues phrase the proposition with opposite polarity: side A's
    /// positive outcome corresponds to side B's negative outcome.
    InvertedPolarity,
    /// Alignment could not be determined; requires human resolution and is
    /// excluded from automatic arbitrage detection.
    Unresolved,
}

impl SideAlignment {
    /// Returns true if the alignment is resolved either way.
    #[must_use]
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SamePolarity => "same polarity",
            Self::InvertedPolarity => "inverted polarity",
            Self::Unresolved => "unresolved",
        }
    }
}

impl std::fmt::Display for SideAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Match Candidate
// =============================================================================

/// A proposed cross-venue pairing of markets believed to represent the same
/// real-world event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Canonical pair identity.
    pub id: CandidateId,

    /// Normalized record of side A (canonical order).
    pub record_a: MarketRecord,

    /// Normalized record of side B.
    pub record_b: MarketRecord,

    /// Per-scorer outputs, keyed by scorer name. Neutral scorers are
    /// absent from the map.
    pub scores: BTreeMap<String, f64>,

    /// Combined confidence in [0, 1] used for ranking.
    pub confidence: f64,

    /// Resolved outcome-side correspondence.
    pub alignment: SideAlignment,

    /// When this candidate was produced.
    pub discovered_at: DateTime<Utc>,
}

impl MatchCandidate {
    /// Returns the earlier of the two known expirations, used as the
    /// ranking tie-breaker. `None` when neither side has one.
    #[must_use]
    pub fn earliest_expiration(&self) -> Option<DateTime<Utc>> {
        match (self.record_a.expiration, self.record_b.expiration) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Returns true if the confidence meets a threshold.
    #[must_use]
    pub fn meets_confidence_threshold(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

// =============================================================================
// Arbitrage Opportunity
// =============================================================================

/// One leg of an arbitrage opportunity: a position to buy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityLeg {
    /// Venue to buy on.
    pub venue: Venue,
    /// Market to buy in.
    pub market_id: String,
    /// Outcome side label to buy.
    pub side_label: String,
    /// Ask price to pay.
    pub ask_price: Decimal,
    /// Market expiration.
    pub expiration: DateTime<Utc>,
    /// Link to the listing.
    pub url: Option<String>,
}

/// A profit-quantified pair of opposing positions across venues.
///
/// Derived per detection cycle; identity-bearing state lives in the
/// verification records, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Identity of the confirmed match this opportunity is for.
    pub candidate_id: CandidateId,

    /// Position to buy on venue A.
    pub leg_a: OpportunityLeg,

    /// Position to buy on venue B.
    pub leg_b: OpportunityLeg,

    /// Sum of the two ask prices.
    pub combined_cost: Decimal,

    /// Additive fees applied, in price units.
    pub fees: Decimal,

    /// `1 - combined_cost - fees`.
    pub profit_margin: Decimal,

    /// Bounded by the smaller available liquidity signal. Absent when no
    /// leg carries one; callers must treat the opportunity as unsized.
    pub max_size_estimate: Option<Decimal>,

    /// When the opportunity was detected.
    pub detected_at: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    /// Profit margin rendered to four decimal places.
    #[must_use]
    pub fn profit_margin_display(&self) -> String {
        format!("{:.4}", self.profit_margin.round_dp(4))
    }

    /// Expected profit for a given position size.
    #[must_use]
    pub fn expected_profit(&self, size: Decimal) -> Decimal {
        self.profit_margin * size
    }
}
