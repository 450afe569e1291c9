//! Application configuration.
//!
//! Plain serde structs with sensible defaults; the matching and detection
//! crates build their engine configs from these settings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Top-level configuration, loadable via [`crate::config_loader::ConfigLoader`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Matching engine settings.
    pub matching: MatchingSettings,
    /// Arbitrage detector settings.
    pub detection: DetectionSettings,
    /// Additive per-leg fees, keyed by venue name.
    pub fees: FeeSettings,
}

/// Matching engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    /// Lexical gate: pairs below this similarity are never candidates.
    pub similarity_threshold: f64,

    /// Temporal tolerance window in seconds. The default of 86 400 keeps
    /// the "same UTC calendar day" behavior.
    pub temporal_tolerance_secs: i64,

    /// Weight of the semantic score when blending with lexical.
    pub semantic_weight: f64,

    /// Categorical veto floor: a non-neutral tag overlap below this
    /// rejects the pair. 0.0 means only fully disjoint tag sets veto.
    pub min_categorical_overlap: f64,

    /// Include subtitles in lexical comparison.
    pub compare_subtitles: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            temporal_tolerance_secs: 86_400,
            semantic_weight: 0.3,
            min_categorical_overlap: 0.0,
            compare_subtitles: false,
        }
    }
}

/// Arbitrage detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum profit margin (in price units) to emit an opportunity.
    pub min_profit_threshold: Decimal,

    /// Near-resolution exclusion band: a leg whose best bid or ask is
    /// within this distance of 0 or 1 is excluded.
    pub near_resolution_band: Decimal,

    /// Detect over high-confidence pending candidates without waiting for
    /// human confirmation.
    pub auto_mode: bool,

    /// Confidence floor for auto mode.
    pub auto_confidence_threshold: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_profit_threshold: Decimal::new(1, 2),  // 0.01
            near_resolution_band: Decimal::new(1, 2),  // 0.01
            auto_mode: false,
            auto_confidence_threshold: 0.95,
        }
    }
}

/// Additive per-leg fees in price units, keyed by venue name
/// ("kalshi" / "polymarket"). Empty means no fees are modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSettings {
    /// Per-venue additive fee per leg.
    pub per_leg: BTreeMap<String, Decimal>,
}
