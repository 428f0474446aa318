//! Whitespace word chunker
//!
//! Splits extracted text into spans of at most `max_words` words, preserving
//! word order. Pure and deterministic: identical input and chunk size always
//! produce identical output.

/// Split `text` into chunks of at most `max_words` words each.
///
/// The final chunk may be shorter. Empty or all-whitespace input yields a
/// single empty chunk, so every document carries at least one span.
///
/// # Panics
/// Panics if `max_words` is zero; that is a caller bug, not an input error.
pub fn chunk(text: &str, max_words: usize) -> Vec<String> {
    assert!(max_words > 0, "chunk size must be nonzero");

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }

    words
        .chunks(max_words)
        .map(|w| w.join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_scenario_alpha_beta() {
        let chunks = chunk("alpha beta gamma delta", 2);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_final_chunk_may_be_short() {
        let chunks = chunk("one two three four five", 2);
        assert_eq!(chunks, vec!["one two", "three four", "five"]);
    }

    #[test]
    fn test_empty_input_yields_single_empty_chunk() {
        assert_eq!(chunk("", 500), vec![String::new()]);
        assert_eq!(chunk("   \n\t ", 500), vec![String::new()]);
    }

    #[test]
    fn test_collapses_interior_whitespace() {
        let chunks = chunk("a\n\nb\t c", 10);
        assert_eq!(chunks, vec!["a b c"]);
    }

    #[test]
    fn test_chunk_size_larger_than_input() {
        let chunks = chunk("just three words", 500);
        assert_eq!(chunks, vec!["just three words"]);
    }

    #[quickcheck]
    fn prop_concatenation_reproduces_normalized_input(text: String, size: usize) -> bool {
        let size = size % 64 + 1;
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let rejoined = chunk(&text, size).join(" ");
        // The single-empty-chunk case rejoins to "" which matches the
        // normalized form of whitespace-only input.
        rejoined == normalized
    }

    #[quickcheck]
    fn prop_no_chunk_exceeds_size(text: String, size: usize) -> bool {
        let size = size % 64 + 1;
        chunk(&text, size)
            .iter()
            .all(|c| c.split_whitespace().count() <= size)
    }

    #[quickcheck]
    fn prop_chunking_is_idempotent(text: String, size: usize) -> bool {
        let size = size % 64 + 1;
        chunk(&text, size) == chunk(&text, size)
    }
}
