//! Length and sentence measurements used by the search.
//!
//! Lengths are counted in characters, not bytes, so multi-byte text
//! compresses by the same ratio a reader would see.

/// Character that terminates a sentence for the purpose of
/// [`sentence_count`].
pub const SENTENCE_TERMINATOR: char = '.';

/// Approximate sentence count: the number of pieces left after splitting
/// on [`SENTENCE_TERMINATOR`], ignoring trailing empty pieces.
///
/// `"a.b."` has two sentences, `"a..b"` three, and `""` none. This is not a
/// linguistic segmenter; it only seeds the initial search estimate and
/// bounds how far the search may grow.
pub fn sentence_count(text: &str) -> usize {
    let mut pieces: Vec<&str> = text.split(SENTENCE_TERMINATOR).collect();
    while pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
    }
    pieces.len()
}

/// Length of `text` in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Length of `summary` relative to `original`.
///
/// Returns `0.0` for an empty original; callers reject empty input before
/// a ratio matters.
pub fn compression_ratio(summary: &str, original: &str) -> f64 {
    let original_len = char_len(original);
    if original_len == 0 {
        return 0.0;
    }
    char_len(summary) as f64 / original_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_count_drops_trailing_empty_pieces() {
        assert_eq!(sentence_count("First. Second."), 2);
        assert_eq!(sentence_count("First. Second"), 2);
        assert_eq!(sentence_count("a.b..."), 2);
    }

    #[test]
    fn sentence_count_keeps_inner_and_leading_empty_pieces() {
        assert_eq!(sentence_count("a..b"), 3);
        assert_eq!(sentence_count(".a"), 2);
    }

    #[test]
    fn sentence_count_of_degenerate_text() {
        assert_eq!(sentence_count(""), 0);
        assert_eq!(sentence_count("..."), 0);
        assert_eq!(sentence_count("no terminator at all"), 1);
    }

    #[test]
    fn char_len_counts_characters() {
        assert_eq!(char_len("héllo"), 5);
        assert_eq!("héllo".len(), 6);
    }

    #[test]
    fn ratio_of_halves() {
        assert!((compression_ratio("abcd", "abcdefgh") - 0.5).abs() < f64::EPSILON);
        assert_eq!(compression_ratio("abc", ""), 0.0);
    }
}
