//! Notification payloads.
//!
//! The core hands the notifier plain structured records; rendering and
//! delivery are the notifier's concern. One alert per new match candidate
//! needing review, one per detected arbitrage opportunity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    ArbitrageOpportunity, CandidateId, MatchCandidate, SideAlignment, Venue,
};

/// One side of a candidate alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMarket {
    /// Venue name.
    pub venue: Venue,
    /// Venue-scoped market id.
    pub market_id: String,
    /// Listing title.
    pub title: String,
    /// Expiration, if known.
    pub expiration: Option<DateTime<Utc>>,
    /// Market link, if known.
    pub url: Option<String>,
}

/// A new match candidate awaiting human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAlert {
    /// Canonical pair identity.
    pub candidate_id: CandidateId,
    /// Side A listing.
    pub market_a: AlertMarket,
    /// Side B listing.
    pub market_b: AlertMarket,
    /// Combined confidence.
    pub confidence: f64,
    /// Per-scorer outputs.
    pub scores: BTreeMap<String, f64>,
    /// Resolved side alignment, if any.
    pub alignment: SideAlignment,
}

impl From<&MatchCandidate> for CandidateAlert {
    fn from(candidate: &MatchCandidate) -> Self {
        let market = |record: &crate::types::MarketRecord| AlertMarket {
            venue: record.venue,
            market_id: record.market_id.clone(),
            title: record.title.clone(),
            expiration: record.expiration,
            url: record.url.clone(),
        };

        Self {
            candidate_id: candidate.id.clone(),
            market_a: market(&candidate.record_a),
            market_b: market(&candidate.record_b),
            confidence: candidate.confidence,
            scores: candidate.scores.clone(),
            alignment: candidate.alignment,
        }
    }
}

/// One leg of an opportunity alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertLeg {
    /// Venue to buy on.
    pub venue: Venue,
    /// Market to buy in.
    pub market_id: String,
    /// Side label to buy.
    pub side: String,
    /// Ask price to pay.
    pub ask_price: Decimal,
    /// Market expiration.
    pub expiration: DateTime<Utc>,
    /// Market link, if known.
    pub url: Option<String>,
}

/// A detected arbitrage opportunity, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityAlert {
    /// Identity of the underlying confirmed match.
    pub candidate_id: CandidateId,
    /// First position to buy.
    pub leg_a: AlertLeg,
    /// Second position to buy.
    pub leg_b: AlertLeg,
    /// Sum of the two asks.
    pub combined_cost: Decimal,
    /// Profit margin rendered to four decimal places.
    pub profit_margin: String,
    /// Size bound, when liquidity signals exist.
    pub max_size_estimate: Option<Decimal>,
    /// Detection instant.
    pub detected_at: DateTime<Utc>,
}

impl From<&ArbitrageOpportunity> for OpportunityAlert {
    fn from(opp: &ArbitrageOpportunity) -> Self {
        let leg = |l: &crate::types::OpportunityLeg| AlertLeg {
            venue: l.venue,
            market_id: l.market_id.clone(),
            side: l.side_label.clone(),
            ask_price: l.ask_price,
            expiration: l.expiration,
            url: l.url.clone(),
        };

        Self {
            candidate_id: opp.candidate_id.clone(),
            leg_a: leg(&opp.leg_a),
            leg_b: leg(&opp.leg_b),
            combined_cost: opp.combined_cost,
            profit_margin: opp.profit_margin_display(),
            max_size_estimate: opp.max_size_estimate,
            detected_at: opp.detected_at,
        }
    }
}
