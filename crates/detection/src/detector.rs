//! Arbitrage detection over verified match candidates.
//!
//! A candidate yields an opportunity when buying opposing sides across the
//! two venues costs less than the guaranteed 1.00 payout, after additive
//! fees. All price arithmetic is exact decimal; floats never touch money.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, trace};

use market_arb_core::config::DetectionSettings;
use market_arb_core::types::{
    ArbitrageOpportunity, MarketRecord, MatchCandidate, OpportunityLeg, Outcome, SideAlignment,
};

use crate::fees::FeeSchedule;

// =============================================================================
// Configuration
// =============================================================================

/// Detector thresholds.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Minimum profit margin, in price units, to emit an opportunity.
    pub min_profit_threshold: Decimal,

    /// A leg with any quote within this distance of 0 or 1 is excluded as
    /// effectively resolved.
    pub near_resolution_band: Decimal,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_profit_threshold: Decimal::new(1, 2), // 0.01
            near_resolution_band: Decimal::new(1, 2), // 0.01
        }
    }
}

impl DetectorConfig {
    /// Preset demanding wider margins and steering further clear of
    /// near-resolved books.
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            min_profit_threshold: Decimal::new(3, 2),
            near_resolution_band: Decimal::new(2, 2),
        }
    }

    /// Preset surfacing thinner edges.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            min_profit_threshold: Decimal::new(5, 3),
            near_resolution_band: Decimal::new(5, 3),
        }
    }

    /// Sets the profit floor.
    #[must_use]
    pub fn with_min_profit_threshold(mut self, threshold: Decimal) -> Self {
        self.min_profit_threshold = threshold;
        self
    }

    /// Sets the near-resolution band.
    #[must_use]
    pub fn with_near_resolution_band(mut self, band: Decimal) -> Self {
        self.near_resolution_band = band;
        self
    }
}

impl From<&DetectionSettings> for DetectorConfig {
    fn from(settings: &DetectionSettings) -> Self {
        Self {
            min_profit_threshold: settings.min_profit_threshold,
            near_resolution_band: settings.near_resolution_band,
        }
    }
}

// =============================================================================
// Detector
// =============================================================================

/// Prices verified candidates and emits profitable opposing-position pairs.
#[derive(Debug, Clone, Default)]
pub struct ArbDetector {
    config: DetectorConfig,
    fees: FeeSchedule,
}

impl ArbDetector {
    /// Creates a detector with a zero fee schedule.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            fees: FeeSchedule::zero(),
        }
    }

    /// Attaches a fee schedule.
    #[must_use]
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Evaluates candidates as of `now`, returning opportunities sorted by
    /// profit margin descending.
    ///
    /// Candidates with unresolved alignment are skipped; they must not be
    /// priced automatically. Both possible leg directions are evaluated per
    /// candidate, so a cheap "No" on either venue is found either way.
    #[must_use]
    pub fn detect(
        &self,
        candidates: &[MatchCandidate],
        now: DateTime<Utc>,
    ) -> Vec<ArbitrageOpportunity> {
        let mut opportunities = Vec::new();

        for candidate in candidates {
            if !candidate.alignment.is_resolved() {
                trace!(candidate = %candidate.id, "skipping unresolved alignment");
                continue;
            }
            let (Some((pos_a, neg_a)), Some((pos_b, neg_b))) = (
                candidate.record_a.resolved_sides(),
                candidate.record_b.resolved_sides(),
            ) else {
                continue;
            };

            // Opposing positions: with same polarity the two venues' "Yes"
            // sides mean the same thing, so pair each side with the other
            // venue's opposite; with inverted polarity like sides oppose.
            let directions = match candidate.alignment {
                SideAlignment::SamePolarity => [(pos_a, neg_b), (neg_a, pos_b)],
                SideAlignment::InvertedPolarity => [(pos_a, pos_b), (neg_a, neg_b)],
                SideAlignment::Unresolved => continue,
            };

            for (side_a, side_b) in directions {
                if let Some(opportunity) = self.price_direction(candidate, side_a, side_b, now) {
                    opportunities.push(opportunity);
                }
            }
        }

        opportunities.sort_by(|x, y| y.profit_margin.cmp(&x.profit_margin));

        info!(
            candidates = candidates.len(),
            opportunities = opportunities.len(),
            "detection pass complete"
        );

        opportunities
    }

    fn price_direction(
        &self,
        candidate: &MatchCandidate,
        side_a: &Outcome,
        side_b: &Outcome,
        now: DateTime<Utc>,
    ) -> Option<ArbitrageOpportunity> {
        let leg_a = self.usable_leg(&candidate.record_a, side_a, now)?;
        let leg_b = self.usable_leg(&candidate.record_b, side_b, now)?;

        let combined_cost = leg_a.ask_price + leg_b.ask_price;
        let fees = self.fees.total_for(leg_a.venue, leg_b.venue);
        let profit_margin = Decimal::ONE - combined_cost - fees;

        if profit_margin < self.config.min_profit_threshold {
            trace!(
                candidate = %candidate.id,
                %combined_cost,
                %profit_margin,
                "below profit threshold"
            );
            return None;
        }

        let max_size_estimate = match (side_a.liquidity, side_b.liquidity) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };

        debug!(
            candidate = %candidate.id,
            side_a = %leg_a.side_label,
            side_b = %leg_b.side_label,
            %profit_margin,
            "opportunity detected"
        );

        Some(ArbitrageOpportunity {
            candidate_id: candidate.id.clone(),
            leg_a,
            leg_b,
            combined_cost,
            fees,
            profit_margin,
            max_size_estimate,
            detected_at: now,
        })
    }

    /// Builds a leg when the side is actually buyable: a quoted ask, a
    /// known future expiration, and no quote inside the near-resolution
    /// band.
    fn usable_leg(
        &self,
        record: &MarketRecord,
        side: &Outcome,
        now: DateTime<Utc>,
    ) -> Option<OpportunityLeg> {
        let ask_price = side.best_ask?;
        let expiration = record.expiration?;
        if expiration <= now {
            return None;
        }

        let band = self.config.near_resolution_band;
        let near_edge = |price: Decimal| price <= band || price >= Decimal::ONE - band;
        if near_edge(ask_price) || side.best_bid.is_some_and(near_edge) {
            return None;
        }

        Some(OpportunityLeg {
            venue: record.venue,
            market_id: record.market_id.clone(),
            side_label: side.label.clone(),
            ask_price,
            expiration,
            url: record.url.clone(),
        })
    }
}
