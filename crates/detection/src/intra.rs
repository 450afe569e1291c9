//! Single-venue arbitrage over one market's own book.
//!
//! A market whose listed sides are mutually exclusive and exhaustive pays
//! exactly 1.00 to whichever side resolves, so buying every side for less
//! than 1.00 after fees locks in the difference. The binary case is the
//! familiar `yes_ask + no_ask < 1`; multi-outcome markets generalize to
//! the sum of all sides' asks. No cross-venue alignment is involved, so
//! this works on any market with quoted asks, not just polarity-resolved
//! binaries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use market_arb_core::types::{MarketRecord, Venue};
use market_arb_core::validation::validate_record;

use crate::detector::DetectorConfig;
use crate::fees::FeeSchedule;

// =============================================================================
// Opportunity Shape
// =============================================================================

/// One side to buy within the market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntraLeg {
    /// Outcome side label.
    pub side_label: String,
    /// Ask price to pay.
    pub ask_price: Decimal,
    /// Size available at the ask, if the venue reports one.
    pub liquidity: Option<Decimal>,
}

/// A buy-every-side position within a single market priced below payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntraVenueOpportunity {
    /// Venue the market trades on.
    pub venue: Venue,
    /// The market.
    pub market_id: String,
    /// Listing title, for rendering.
    pub title: String,
    /// One leg per outcome side, in listing order.
    pub legs: Vec<IntraLeg>,
    /// Sum of all legs' asks.
    pub combined_cost: Decimal,
    /// Additive fees applied, in price units.
    pub fees: Decimal,
    /// `1 - combined_cost - fees`.
    pub profit_margin: Decimal,
    /// Bounded by the smallest available liquidity signal; absent when no
    /// leg carries one.
    pub max_size_estimate: Option<Decimal>,
    /// Market expiration.
    pub expiration: DateTime<Utc>,
    /// When the opportunity was detected.
    pub detected_at: DateTime<Utc>,
}

// =============================================================================
// Detector
// =============================================================================

/// Scans one venue's records for markets whose full outcome set costs less
/// than the payout.
#[derive(Debug, Clone, Default)]
pub struct IntraVenueDetector {
    config: DetectorConfig,
    fees: FeeSchedule,
}

impl IntraVenueDetector {
    /// Creates a detector with a zero fee schedule.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            fees: FeeSchedule::zero(),
        }
    }

    /// Attaches a fee schedule. The per-leg fee is charged once per
    /// outcome side bought.
    #[must_use]
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Evaluates each record as of `now`, returning opportunities sorted by
    /// profit margin descending.
    ///
    /// A market qualifies only when every side has a quoted ask: a missing
    /// ask means the position cannot be completed and the payout is no
    /// longer guaranteed. A quote inside the near-resolution band on any
    /// side excludes the whole market, the way a dominant side signals a
    /// near-certain outcome.
    #[must_use]
    pub fn detect(
        &self,
        records: &[MarketRecord],
        now: DateTime<Utc>,
    ) -> Vec<IntraVenueOpportunity> {
        let mut opportunities: Vec<IntraVenueOpportunity> = records
            .iter()
            .filter(|record| match validate_record(record) {
                Ok(()) => true,
                Err(err) => {
                    debug!(error = %err, "skipping malformed record");
                    false
                }
            })
            .filter_map(|record| self.price_market(record, now))
            .collect();

        opportunities.sort_by(|x, y| y.profit_margin.cmp(&x.profit_margin));

        info!(
            records = records.len(),
            opportunities = opportunities.len(),
            "single-venue detection pass complete"
        );

        opportunities
    }

    fn price_market(&self, record: &MarketRecord, now: DateTime<Utc>) -> Option<IntraVenueOpportunity> {
        let expiration = record.expiration?;
        if expiration <= now || record.outcomes.len() < 2 {
            return None;
        }

        let band = self.config.near_resolution_band;
        let near_edge = |price: Decimal| price <= band || price >= Decimal::ONE - band;

        let mut legs = Vec::with_capacity(record.outcomes.len());
        for outcome in &record.outcomes {
            let ask_price = outcome.best_ask?;
            if near_edge(ask_price) || outcome.best_bid.is_some_and(near_edge) {
                trace!(
                    venue = %record.venue,
                    market_id = %record.market_id,
                    side = %outcome.label,
                    "near-resolution side, skipping market"
                );
                return None;
            }
            legs.push(IntraLeg {
                side_label: outcome.label.clone(),
                ask_price,
                liquidity: outcome.liquidity,
            });
        }

        let combined_cost: Decimal = legs.iter().map(|leg| leg.ask_price).sum();
        let fees = self.fees.leg_fee(record.venue) * Decimal::from(legs.len() as u64);
        let profit_margin = Decimal::ONE - combined_cost - fees;

        if profit_margin < self.config.min_profit_threshold {
            trace!(
                venue = %record.venue,
                market_id = %record.market_id,
                %combined_cost,
                "below profit threshold"
            );
            return None;
        }

        let max_size_estimate = legs
            .iter()
            .filter_map(|leg| leg.liquidity)
            .min();

        debug!(
            venue = %record.venue,
            market_id = %record.market_id,
            sides = legs.len(),
            %profit_margin,
            "single-venue opportunity detected"
        );

        Some(IntraVenueOpportunity {
            venue: record.venue,
            market_id: record.market_id.clone(),
            title: record.title.clone(),
            legs,
            combined_cost,
            fees,
            profit_margin,
            max_size_estimate,
            expiration,
            detected_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use market_arb_core::types::Outcome;
    use rust_decimal_macros::dec;

    fn binary(id: &str, yes_ask: Decimal, no_ask: Decimal) -> MarketRecord {
        MarketRecord::new(Venue::Kalshi, id, "Will it happen?")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![
                Outcome::new("Yes", None, Some(yes_ask)),
                Outcome::new("No", None, Some(no_ask)),
            ])
    }

    // ==================== Binary Tests ====================

    #[test]
    fn test_binary_below_payout_emitted() {
        let detector = IntraVenueDetector::new(DetectorConfig::default());
        let opportunities = detector.detect(&[binary("K1", dec!(0.45), dec!(0.52))], Utc::now());

        assert_eq!(opportunities.len(), 1);
        let opp = &opportunities[0];
        assert_eq!(opp.combined_cost, dec!(0.97));
        assert_eq!(opp.profit_margin, dec!(0.03));
        assert_eq!(opp.legs.len(), 2);
    }

    #[test]
    fn test_binary_at_or_above_payout_not_emitted() {
        let detector = IntraVenueDetector::new(DetectorConfig::default());

        assert!(detector
            .detect(&[binary("K1", dec!(0.48), dec!(0.52))], Utc::now())
            .is_empty());
        assert!(detector
            .detect(&[binary("K2", dec!(0.55), dec!(0.52))], Utc::now())
            .is_empty());
    }

    // ==================== Multi-Outcome Tests ====================

    #[test]
    fn test_multi_outcome_sum_below_payout() {
        let record = MarketRecord::new(Venue::Kalshi, "K1", "Who wins the primary?")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![
                Outcome::new("Alice", None, Some(dec!(0.30))),
                Outcome::new("Bob", None, Some(dec!(0.30))),
                Outcome::new("Carol", None, Some(dec!(0.35))),
            ]);

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        let opportunities = detector.detect(&[record], Utc::now());

        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].combined_cost, dec!(0.95));
        assert_eq!(opportunities[0].legs.len(), 3);
    }

    #[test]
    fn test_missing_ask_on_any_side_excludes_market() {
        // Without an ask on Carol the position cannot be completed.
        let record = MarketRecord::new(Venue::Kalshi, "K1", "Who wins the primary?")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![
                Outcome::new("Alice", None, Some(dec!(0.20))),
                Outcome::new("Bob", None, Some(dec!(0.20))),
                Outcome::new("Carol", Some(dec!(0.30)), None),
            ]);

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        assert!(detector.detect(&[record], Utc::now()).is_empty());
    }

    // ==================== Exclusion Tests ====================

    #[test]
    fn test_dominant_side_excludes_market() {
        // The No bid at 0.005 signals a near-certain outcome; the wide
        // edge on paper carries disproportionate execution risk.
        let record = MarketRecord::new(Venue::Kalshi, "K1", "Will it happen?")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![
                Outcome::new("Yes", None, Some(dec!(0.45))),
                Outcome::new("No", Some(dec!(0.005)), Some(dec!(0.02))),
            ]);

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        assert!(detector.detect(&[record], Utc::now()).is_empty());
    }

    #[test]
    fn test_near_edge_ask_excludes_market() {
        let detector = IntraVenueDetector::new(DetectorConfig::default());
        assert!(detector
            .detect(&[binary("K1", dec!(0.995), dec!(0.001))], Utc::now())
            .is_empty());
    }

    #[test]
    fn test_expired_market_excluded() {
        let mut record = binary("K1", dec!(0.45), dec!(0.52));
        record.expiration = Some(Utc::now() - Duration::hours(1));

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        assert!(detector.detect(&[record], Utc::now()).is_empty());
    }

    #[test]
    fn test_single_outcome_market_excluded() {
        let record = MarketRecord::new(Venue::Kalshi, "K1", "t")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![Outcome::new("Yes", None, Some(dec!(0.40)))]);

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        assert!(detector.detect(&[record], Utc::now()).is_empty());
    }

    // ==================== Fee Tests ====================

    #[test]
    fn test_fees_charged_per_leg() {
        // Three legs at 0.005 each eat 0.015 of the 0.05 edge.
        let record = MarketRecord::new(Venue::Kalshi, "K1", "Who wins the primary?")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![
                Outcome::new("Alice", None, Some(dec!(0.30))),
                Outcome::new("Bob", None, Some(dec!(0.30))),
                Outcome::new("Carol", None, Some(dec!(0.35))),
            ]);

        let detector = IntraVenueDetector::new(DetectorConfig::default())
            .with_fees(FeeSchedule::zero().with_venue_fee(Venue::Kalshi, dec!(0.005)));

        let opportunities = detector.detect(&[record], Utc::now());
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].fees, dec!(0.015));
        assert_eq!(opportunities[0].profit_margin, dec!(0.035));
    }

    // ==================== Sizing & Ordering Tests ====================

    #[test]
    fn test_max_size_is_smallest_signal() {
        let record = MarketRecord::new(Venue::Kalshi, "K1", "Will it happen?")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![
                Outcome::new("Yes", None, Some(dec!(0.45))).with_liquidity(dec!(300)),
                Outcome::new("No", None, Some(dec!(0.50))).with_liquidity(dec!(120)),
            ]);

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        let opportunities = detector.detect(&[record], Utc::now());
        assert_eq!(opportunities[0].max_size_estimate, Some(dec!(120)));
    }

    #[test]
    fn test_max_size_absent_without_signals() {
        let detector = IntraVenueDetector::new(DetectorConfig::default());
        let opportunities = detector.detect(&[binary("K1", dec!(0.45), dec!(0.52))], Utc::now());
        assert_eq!(opportunities[0].max_size_estimate, None);
    }

    #[test]
    fn test_sorted_by_margin_descending() {
        let thin = binary("K1", dec!(0.50), dec!(0.48));
        let wide = binary("K2", dec!(0.45), dec!(0.45));

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        let opportunities = detector.detect(&[thin, wide], Utc::now());

        assert_eq!(opportunities.len(), 2);
        assert_eq!(opportunities[0].market_id, "K2");
        assert_eq!(opportunities[0].profit_margin, dec!(0.10));
    }

    #[test]
    fn test_malformed_record_skipped() {
        let bad = MarketRecord::new(Venue::Kalshi, "K1", "t")
            .with_expiration(Utc::now() + Duration::hours(6))
            .with_outcomes(vec![
                Outcome::new("Yes", None, Some(dec!(1.5))),
                Outcome::new("No", None, Some(dec!(0.40))),
            ]);

        let detector = IntraVenueDetector::new(DetectorConfig::default());
        assert!(detector.detect(&[bad], Utc::now()).is_empty());
    }
}
