//! Boundary-aware chunk splitting.

use crate::NATURAL_BREAK_WINDOW;

/// Split `text` into chunks of up to `max_length` characters, preferring a
/// natural break (paragraph, then sentence, then word) near the end of each
/// tentative chunk over an arbitrary cut.
///
/// `overlap` characters are repeated between consecutive chunks; it never
/// applies before the first or after the last chunk. Each emitted chunk is
/// trimmed of surrounding whitespace; chunks that trim to nothing are
/// skipped. Positions and lengths are Unicode scalar values, so multibyte
/// input cannot be cut mid-character.
pub fn split_text(text: &str, max_length: usize, overlap: usize) -> Vec<String> {
    // A zero maximum could never advance; treat it as one.
    let max_length = max_length.max(1);

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut position = 0usize;

    while position < total {
        let mut length = max_length.min(total - position);

        // Only look for a natural break when more text follows this chunk.
        if position + length < total {
            let window = &chars[position..position + length];
            let search_start = length.saturating_sub(NATURAL_BREAK_WINDOW);

            // Paragraph break, else sentence break, else word break. A lower
            // priority is consulted only when the higher one found nothing at
            // or after `search_start`.
            let break_at = rfind_pair(window, '\n', '\n')
                .filter(|&at| at >= search_start)
                .or_else(|| rfind_pair(window, '.', ' ').filter(|&at| at >= search_start))
                .or_else(|| window.iter().rposition(|&c| c == ' '));

            // Accepted breaks must lie strictly after `search_start`; the
            // break character stays with the current chunk.
            if let Some(at) = break_at {
                if at > search_start {
                    length = at + 1;
                }
            }
        }

        let chunk: String = chars[position..position + length].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        // Step back by the overlap, but always make forward progress even
        // when the overlap swallows the whole chunk.
        let advanced = (position + length).saturating_sub(overlap);
        position = if advanced > position {
            advanced
        } else {
            position + length
        };
    }

    chunks
}

/// Index of the last occurrence of the two-character sequence `first second`
/// in `window`.
fn rfind_pair(window: &[char], first: char, second: char) -> Option<usize> {
    (0..window.len().saturating_sub(1))
        .rev()
        .find(|&i| window[i] == first && window[i + 1] == second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        assert_eq!(split_text("", 100, 0), Vec::<String>::new());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let chunks = split_text("  a short document  ", 100, 0);
        assert_eq!(chunks, vec!["a short document".to_string()]);
    }

    #[test]
    fn test_hard_cuts_on_unbroken_text() {
        // 300 characters with no break of any kind: three full-width cuts.
        let text = "A.".repeat(150);
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert_eq!(chunk.chars().count(), 100);
        }
    }

    #[test]
    fn test_max_length_respected() {
        let text = "word ".repeat(200);
        for chunk in split_text(&text, 64, 0) {
            assert!(chunk.chars().count() <= 64);
        }
    }

    #[test]
    fn test_paragraph_break_preferred() {
        let mut text = "a".repeat(80);
        text.push_str("\n\n");
        text.push_str(&"b".repeat(80));
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks, vec!["a".repeat(80), "b".repeat(80)]);
    }

    #[test]
    fn test_paragraph_outranks_later_sentence() {
        // Both breaks are in the look-back window; the paragraph wins even
        // though the sentence break lies closer to the cut.
        let mut text = "a".repeat(40);
        text.push_str("\n\n");
        text.push_str(&"b".repeat(48));
        text.push_str(". ");
        text.push_str(&"c".repeat(60));
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks[0], "a".repeat(40));
        assert!(chunks[1].starts_with("bbbb"));
    }

    #[test]
    fn test_sentence_break_when_no_paragraph() {
        let mut text = "s".repeat(78);
        text.push_str(". ");
        text.push_str(&"t".repeat(80));
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks[0], format!("{}.", "s".repeat(78)));
        assert_eq!(chunks[1], "t".repeat(80));
    }

    #[test]
    fn test_word_break_when_no_sentence() {
        let mut text = "w".repeat(90);
        text.push(' ');
        text.push_str(&"v".repeat(60));
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks[0], "w".repeat(90));
        assert_eq!(chunks[1], "v".repeat(60));
    }

    #[test]
    fn test_break_before_window_is_ignored() {
        // The only word breaks sit in the first 10 characters, far before
        // `search_start` for a 150-wide window: the cut stays hard.
        let mut text = "word word ".to_string();
        text.push_str(&"z".repeat(290));
        let chunks = split_text(&text, 150, 0);
        assert_eq!(chunks[0].chars().count(), 150);
    }

    #[test]
    fn test_break_exactly_at_search_start_is_not_accepted() {
        // Single leading space at offset 0 with a 100-wide window: the
        // candidate equals `search_start` and the cut stays hard.
        let mut text = " ".to_string();
        text.push_str(&"x".repeat(200));
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks[0].chars().count(), 99);
    }

    #[test]
    fn test_no_characters_lost_without_overlap() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(12);
        let chunks = split_text(&text, 100, 0);
        let rejoined: String = chunks
            .iter()
            .flat_map(|c| c.chars())
            .filter(|c| !c.is_whitespace())
            .collect();
        let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_overlap_repeats_tail_of_previous_chunk() {
        let text: String = "0123456789".repeat(30);
        let chunks = split_text(&text, 100, 20);
        // Positions advance 0, 80, 160, 240, 280: the step-back also yields
        // a short trailing chunk inside the previous one.
        assert_eq!(chunks.len(), 5);
        let tail: String = chunks[0].chars().skip(80).collect();
        assert!(chunks[1].starts_with(&tail));
        assert_eq!(chunks[4], text[280..].to_string());
    }

    #[test]
    fn test_oversized_overlap_still_terminates() {
        let text = "x".repeat(500);
        let chunks = split_text(&text, 100, 150);
        // Forward progress forced to a full chunk width per step.
        assert_eq!(chunks.len(), 5);
    }

    #[test]
    fn test_overlap_equal_to_max_length_terminates() {
        let text = "y".repeat(250);
        let chunks = split_text(&text, 100, 100);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_multibyte_text_cuts_cleanly() {
        let text = "é".repeat(250);
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 100);
        assert_eq!(chunks[2].chars().count(), 50);
    }

    #[test]
    fn test_whitespace_only_chunks_are_skipped() {
        let chunks = split_text("   \n\n   ", 100, 0);
        assert!(chunks.is_empty());
    }
}
