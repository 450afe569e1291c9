//! Additive per-leg fee modeling.
//!
//! Fees are flat amounts in price units added to an opportunity's combined
//! cost, one per leg by venue. The default schedule is zero so detection
//! works out of the box; operators configure real venue fees through
//! [`FeeSettings`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::warn;

use market_arb_core::config::FeeSettings;
use market_arb_core::types::Venue;

/// Per-venue additive fee per leg.
#[derive(Debug, Clone, Default)]
pub struct FeeSchedule {
    per_leg: BTreeMap<Venue, Decimal>,
}

impl FeeSchedule {
    /// A schedule with no fees.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sets the per-leg fee for a venue.
    #[must_use]
    pub fn with_venue_fee(mut self, venue: Venue, fee: Decimal) -> Self {
        self.per_leg.insert(venue, fee);
        self
    }

    /// The fee charged for one leg on the given venue.
    #[must_use]
    pub fn leg_fee(&self, venue: Venue) -> Decimal {
        self.per_leg.get(&venue).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total fees for a two-leg position across the given venues.
    #[must_use]
    pub fn total_for(&self, venue_a: Venue, venue_b: Venue) -> Decimal {
        self.leg_fee(venue_a) + self.leg_fee(venue_b)
    }
}

impl From<&FeeSettings> for FeeSchedule {
    fn from(settings: &FeeSettings) -> Self {
        let mut schedule = Self::zero();
        for (name, fee) in &settings.per_leg {
            let venue = match name.to_lowercase().as_str() {
                "kalshi" => Venue::Kalshi,
                "polymarket" => Venue::Polymarket,
                other => {
                    warn!(venue = other, "ignoring fee for unknown venue");
                    continue;
                }
            };
            schedule.per_leg.insert(venue, *fee);
        }
        schedule
    }
}
