//! Normalized-record validation.
//!
//! Adapters are expected to hand over well-formed records, but one venue's
//! bad listing must never suppress unrelated valid opportunities, so
//! everything here is skip-and-continue with a diagnostic.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{ArbError, Result};
use crate::types::MarketRecord;

/// Validates a single normalized record.
///
/// Checks: non-empty market id and title, at least one outcome, every
/// quoted price strictly inside (0, 1), and `best_bid <= best_ask` on every
/// outcome where both are present. A record with no quoted ask at all is
/// still valid; the detector excludes it later.
///
/// # Errors
///
/// Returns [`ArbError::MalformedRecord`] describing the first violation.
pub fn validate_record(record: &MarketRecord) -> Result<()> {
    let malformed = |reason: &str| {
        Err(ArbError::malformed_record(
            record.venue,
            record.market_id.clone(),
            reason,
        ))
    };

    if record.market_id.trim().is_empty() {
        return malformed("missing market id");
    }
    if record.title.trim().is_empty() {
        return malformed("missing title");
    }
    if record.outcomes.is_empty() {
        return malformed("no outcome sides");
    }

    for outcome in &record.outcomes {
        for price in [outcome.best_bid, outcome.best_ask].into_iter().flatten() {
            if price <= Decimal::ZERO || price >= Decimal::ONE {
                return malformed("price outside (0, 1)");
            }
        }
        if let (Some(bid), Some(ask)) = (outcome.best_bid, outcome.best_ask) {
            if bid > ask {
                return malformed("best bid above best ask");
            }
        }
    }

    Ok(())
}

/// Filters a batch down to valid records, logging each rejection.
#[must_use]
pub fn filter_valid(records: Vec<MarketRecord>) -> Vec<MarketRecord> {
    let total = records.len();
    let valid: Vec<MarketRecord> = records
        .into_iter()
        .filter(|record| match validate_record(record) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "skipping malformed record");
                false
            }
        })
        .collect();

    if valid.len() < total {
        debug!(
            total,
            skipped = total - valid.len(),
            "record validation dropped malformed entries"
        );
    }

    valid
}
