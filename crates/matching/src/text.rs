//! Text normalization and string similarity.
//!
//! Titles are compared after lower-casing, stripping punctuation, and
//! collapsing whitespace, so "Will BTC hit $100k?" and "will btc hit 100k"
//! compare equal.

/// Lower-cases, replaces non-alphanumeric characters with spaces, and
/// collapses runs of whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut result = String::with_capacity(lower.len());
    for ch in lower.chars() {
        if ch.is_alphanumeric() {
            result.push(ch);
        } else {
            result.push(' ');
        }
    }
    result.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Normalized edit-distance similarity in [0, 1] over already-normalized
/// text: `1 - levenshtein / max_len`. Two empty strings are identical;
/// one empty string is maximally distant.
#[must_use]
pub fn similarity_ratio(left: &str, right: &str) -> f64 {
    let a: Vec<char> = left.chars().collect();
    let b: Vec<char> = right.chars().collect();

    match (a.len(), b.len()) {
        (0, 0) => return 1.0,
        (0, _) | (_, 0) => return 0.0,
        _ => {}
    }

    let distance = levenshtein(&a, &b);
    let max_len = a.len().max(b.len());
    1.0 - distance as f64 / max_len as f64
}

/// Classic two-row Levenshtein distance.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(prev[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}
