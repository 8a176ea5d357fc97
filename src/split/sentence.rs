//! Sentence segmentation on terminal punctuation.

/// Split `text` into sentences ending on `.`, `!` or `?`.
///
/// Each completed sentence is trimmed before it is emitted; a trailing
/// unterminated fragment is emitted as a final sentence when non-empty.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);

        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}
