//! Outcome-side alignment across venues.
//!
//! Automatic alignment is restricted to binary markets whose side labels
//! resolve through the polarity table; everything else is flagged
//! `Unresolved` and left to a human. Polarity inversion ("Will X win?" vs
//! "Will X lose?") is detected from a small negation-cue list, never from
//! general language understanding.

use market_arb_core::types::{MarketRecord, SideAlignment};

use crate::text::normalize_text;

/// Negation cues checked as whole tokens of the normalized title.
const NEGATION_TOKENS: &[&str] = &[
    "not", "fail", "fails", "miss", "misses", "lose", "loses", "below", "under",
];

/// Returns true when the title carries a negation cue.
#[must_use]
pub fn has_negation_cue(title: &str) -> bool {
    // Contractions ("won't", "doesn't") lose their apostrophe during
    // normalization, so check the raw text for them first.
    if title.to_lowercase().contains("n't") {
        return true;
    }
    normalize_text(title)
        .split_whitespace()
        .any(|token| NEGATION_TOKENS.contains(&token))
}

/// Resolves how the two listings' outcome sides correspond.
///
/// Both records must be binary with one positive- and one negative-polarity
/// label. When exactly one of the two titles carries a negation cue, the
/// venues are phrasing the proposition with opposite polarity and the
/// alignment inverts.
#[must_use]
pub fn resolve_alignment(a: &MarketRecord, b: &MarketRecord) -> SideAlignment {
    if a.resolved_sides().is_none() || b.resolved_sides().is_none() {
        return SideAlignment::Unresolved;
    }

    if has_negation_cue(&a.title) != has_negation_cue(&b.title) {
        SideAlignment::InvertedPolarity
    } else {
        SideAlignment::SamePolarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_arb_core::types::{Outcome, Venue};
    use rust_decimal_macros::dec;

    fn binary(venue: Venue, id: &str, title: &str) -> MarketRecord {
        MarketRecord::new(venue, id, title).with_outcomes(vec![
            Outcome::new("Yes", None, Some(dec!(0.5))),
            Outcome::new("No", None, Some(dec!(0.52))),
        ])
    }

    // ==================== Negation Cue Tests ====================

    #[test]
    fn test_negation_tokens() {
        assert!(has_negation_cue("Will the bill fail to pass?"));
        assert!(has_negation_cue("Team to lose the final"));
        assert!(has_negation_cue("Will X not attend?"));
        assert!(has_negation_cue("Won't the Fed cut rates?"));
    }

    #[test]
    fn test_no_false_negation_on_substrings() {
        // "lost" and "notable" contain cue substrings but are not cues.
        assert!(!has_negation_cue("The lost city"));
        assert!(!has_negation_cue("A notable election"));
        assert!(!has_negation_cue("Will Trump win in 2024?"));
    }

    // ==================== Alignment Tests ====================

    #[test]
    fn test_same_polarity() {
        let a = binary(Venue::Kalshi, "K1", "Will Trump win in 2024?");
        let b = binary(Venue::Polymarket, "P1", "Trump wins 2024 election?");

        assert_eq!(resolve_alignment(&a, &b), SideAlignment::SamePolarity);
    }

    #[test]
    fn test_inverted_polarity() {
        let a = binary(Venue::Kalshi, "K1", "Will Trump win in 2024?");
        let b = binary(Venue::Polymarket, "P1", "Will Trump lose in 2024?");

        assert_eq!(resolve_alignment(&a, &b), SideAlignment::InvertedPolarity);
    }

    #[test]
    fn test_threshold_phrasing_inverts() {
        let a = binary(Venue::Kalshi, "K1", "BTC above 100k at year end?");
        let b = binary(Venue::Polymarket, "P1", "BTC below 100k at year end?");

        assert_eq!(resolve_alignment(&a, &b), SideAlignment::InvertedPolarity);
    }

    #[test]
    fn test_both_negated_is_same_polarity() {
        let a = binary(Venue::Kalshi, "K1", "Will the bill fail?");
        let b = binary(Venue::Polymarket, "P1", "Bill fails in the Senate?");

        assert_eq!(resolve_alignment(&a, &b), SideAlignment::SamePolarity);
    }

    #[test]
    fn test_unresolved_for_non_binary() {
        let a = binary(Venue::Kalshi, "K1", "Who wins?");
        let b = MarketRecord::new(Venue::Polymarket, "P1", "Who wins?").with_outcomes(vec![
            Outcome::new("Alice", None, Some(dec!(0.3))),
            Outcome::new("Bob", None, Some(dec!(0.3))),
            Outcome::new("Carol", None, Some(dec!(0.3))),
        ]);

        assert_eq!(resolve_alignment(&a, &b), SideAlignment::Unresolved);
    }

    #[test]
    fn test_unresolved_for_unknown_labels() {
        let a = binary(Venue::Kalshi, "K1", "Final winner?");
        let b = MarketRecord::new(Venue::Polymarket, "P1", "Final winner?").with_outcomes(vec![
            Outcome::new("Chiefs", None, Some(dec!(0.5))),
            Outcome::new("Eagles", None, Some(dec!(0.5))),
        ]);

        assert_eq!(resolve_alignment(&a, &b), SideAlignment::Unresolved);
    }
}
