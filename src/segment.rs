use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// One bounded slice of narration text, destined for exactly one slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub index: usize,
    pub text: String,
}

/// Split narration text into ordered segments of at most `max_chars`
/// grapheme clusters each.
///
/// Splits on whitespace boundaries only and greedily fills each segment.
/// A single word longer than `max_chars` becomes its own oversized segment.
/// Input with no words yields an empty sequence.
pub fn segment(text: &str, max_chars: usize) -> Vec<Segment> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.graphemes(true).count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, text)| Segment { index, text })
        .collect()
}
