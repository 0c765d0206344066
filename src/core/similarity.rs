//! Token-set fuzzy matching between a raw citation string and fetched metadata.

use crate::domain::model::{SimilarityScores, WorkMetadata};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("static regex"))
}

/// 轉小寫並把非英數字元換成空白
fn preprocess(text: &str) -> String {
    non_alphanumeric()
        .replace_all(text, " ")
        .trim()
        .to_lowercase()
}

/// Normalized edit similarity on a 0..=100 scale.
fn ratio(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

fn join_sorted<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

/// Token set ratio of two strings, in `[0, 100]`.
///
/// Both strings are reduced to sets of lowercase alphanumeric tokens. The
/// shared tokens are compared against each side's full token set, so a short
/// string whose tokens all appear in the longer one scores 100 regardless of
/// order or extra words. Returns 0 when either side has no tokens.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = preprocess(a);
    let b = preprocess(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = join_sorted(tokens_a.intersection(&tokens_b));
    let diff_ab = join_sorted(tokens_a.difference(&tokens_b));
    let diff_ba = join_sorted(tokens_b.difference(&tokens_a));

    let combined_ab = format!("{} {}", intersection, diff_ab).trim().to_string();
    let combined_ba = format!("{} {}", intersection, diff_ba).trim().to_string();

    [
        ratio(&intersection, &combined_ab),
        ratio(&intersection, &combined_ba),
        ratio(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Scores a reference text against the fetched first author and title.
pub fn score_reference(ref_text: &str, metadata: &WorkMetadata) -> SimilarityScores {
    SimilarityScores {
        author_similarity: token_set_ratio(ref_text, &metadata.first_author),
        title_similarity: token_set_ratio(ref_text, &metadata.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_token_sets_score_100() {
        assert_eq!(token_set_ratio("Title Here", "Title Here"), 100);
        assert_eq!(token_set_ratio("here title", "Title, Here!"), 100);
    }

    #[test]
    fn test_subset_scores_100() {
        assert_eq!(token_set_ratio("Smith J. Title Here", "Smith"), 100);
        assert_eq!(token_set_ratio("Smith J. Title Here", "Title Here"), 100);
    }

    #[test]
    fn test_disjoint_tokens_score_low() {
        let score = token_set_ratio("quantum chromodynamics lattice", "xy");
        assert!(score < 20, "score was {}", score);
    }

    #[test]
    fn test_empty_side_scores_zero() {
        assert_eq!(token_set_ratio("Smith J. Title Here", ""), 0);
        assert_eq!(token_set_ratio("", "Title"), 0);
        assert_eq!(token_set_ratio("...", "Title"), 0);
    }

    #[test]
    fn test_symmetric() {
        let a = "Deep learning for protein folding";
        let b = "Protein folding with deep networks";
        assert_eq!(token_set_ratio(a, b), token_set_ratio(b, a));
    }

    #[test]
    fn test_more_overlap_scores_higher() {
        let reference = "Doe A. Graph neural networks for molecules. Nature 2020";
        let close = token_set_ratio(reference, "Graph neural networks for molecular property");
        let far = token_set_ratio(reference, "Economic history of medieval trade routes");
        assert!(close > far, "close={} far={}", close, far);
    }

    #[test]
    fn test_score_reference_pairs_author_and_title() {
        let metadata = WorkMetadata::new("Title Here", "Smith");
        let scores = score_reference("Smith J. Title Here", &metadata);
        assert_eq!(scores.author_similarity, 100);
        assert_eq!(scores.title_similarity, 100);

        let missing = score_reference("Smith J. Title Here", &WorkMetadata::default());
        assert_eq!(missing.author_similarity, 0);
        assert_eq!(missing.title_similarity, 0);
    }
}
