//! String similarity measures for fuzzy label matching.

use std::collections::HashSet;

/// Score given when a candidate phrase occurs as whole words in a label.
pub const CONTAINMENT_SCORE: f64 = 0.8;

/// Edit similarity below this is ignored; it only catches typos and
/// spelling variants ("e mail", "adress").
pub const TYPO_SIMILARITY: f64 = 0.8;

/// Single tokens too generic to match anything but themselves.
const GENERIC_TOKENS: &[&str] = &["name", "number", "address", "date", "code", "type", "id"];

/// Character-level Levenshtein distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];
    for i in 1..=a_chars.len() {
        curr[0] = i;
        for j in 1..=b_chars.len() {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// `1 - distance / longest`, in `[0, 1]`.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Sørensen-Dice coefficient over token sets.
pub fn dice(a: &[&str], b: &[&str]) -> f64 {
    let a: HashSet<&str> = a.iter().copied().collect();
    let b: HashSet<&str> = b.iter().copied().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    2.0 * shared as f64 / (a.len() + b.len()) as f64
}

/// `needle` occurs as a contiguous run of whole tokens in `haystack`.
pub fn contains_phrase(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Fuzzy score of label tokens against candidate tokens.
pub fn score(label: &[&str], candidate: &[&str]) -> f64 {
    if label.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let label_text = label.join(" ");
    let candidate_text = candidate.join(" ");
    if label_text == candidate_text {
        return 1.0;
    }
    if candidate.len() == 1 && GENERIC_TOKENS.contains(&candidate[0]) {
        return 0.0;
    }

    let mut best = dice(label, candidate);
    let edit = edit_similarity(&label_text, &candidate_text);
    if edit + f64::EPSILON >= TYPO_SIMILARITY {
        best = best.max(edit);
    }
    if contains_phrase(label, candidate) {
        best = best.max(CONTAINMENT_SCORE);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("email", "email"), 0);
        assert_eq!(levenshtein("e mail", "email"), 1);
    }

    #[test]
    fn test_dice() {
        assert_eq!(dice(&["email", "address"], &["email", "address"]), 1.0);
        assert!((dice(&["mobile", "phone"], &["phone"]) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(dice(&[], &["phone"]), 0.0);
    }

    #[test]
    fn test_contains_phrase() {
        assert!(contains_phrase(
            &["require", "visa", "sponsorship"],
            &["visa", "sponsorship"]
        ));
        assert!(!contains_phrase(&["visa"], &["visa", "sponsorship"]));
        assert!(!contains_phrase(&["sponsorship", "visa"], &["visa", "sponsorship"]));
    }

    #[test]
    fn test_score_typo() {
        assert!(score(&["frist", "name"], &["first", "name"]) > 0.75);
    }

    #[test]
    fn test_score_generic_token_only_exact() {
        assert_eq!(score(&["company", "name"], &["name"]), 0.0);
        assert_eq!(score(&["name"], &["name"]), 1.0);
    }

    #[test]
    fn test_score_last_vs_first_name_below_threshold() {
        assert!(score(&["last", "name"], &["first", "name"]) < 0.6);
    }
}
