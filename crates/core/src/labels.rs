//! Outcome-label polarity table.
//!
//! Venues label their binary sides differently ("Yes"/"No", "Up"/"Down",
//! "Over"/"Under"). This table canonicalizes a label to a polarity so side
//! alignment and leg selection can work across venues without parsing
//! free-form text.

use serde::{Deserialize, Serialize};

/// Canonical polarity of an outcome-side label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// The side that pays out when the proposition holds.
    Positive,
    /// The opposing side.
    Negative,
}

impl Polarity {
    /// Returns the opposite polarity.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Positive-side label synonyms, lower-cased.
const POSITIVE_LABELS: &[&str] = &["yes", "up", "over", "above", "true", "win", "long"];

/// Negative-side label synonyms, lower-cased.
const NEGATIVE_LABELS: &[&str] = &["no", "down", "under", "below", "false", "lose", "short"];

/// Resolves a venue-supplied side label to a polarity.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Labels
/// outside the table return `None`; multi-outcome label sets ("Alice",
/// "Bob") are deliberately unresolvable, forcing human alignment.
#[must_use]
pub fn polarity(label: &str) -> Option<Polarity> {
    let normalized = label.trim().to_lowercase();
    if POSITIVE_LABELS.contains(&normalized.as_str()) {
        Some(Polarity::Positive)
    } else if NEGATIVE_LABELS.contains(&normalized.as_str()) {
        Some(Polarity::Negative)
    } else {
        None
    }
}
