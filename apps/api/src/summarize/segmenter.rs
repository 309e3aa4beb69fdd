//! Segmenter: splits a document into ordered, bounded-size segments.
//!
//! Sizes are counted in chars. Cuts prefer, in order: paragraph break, sentence or line
//! break, any whitespace, and finally a hard cut at the bound. Segments are exact slices of
//! the input, so concatenating them reproduces the document byte for byte.

use thiserror::Error;

/// A semantic boundary is only taken if it keeps at least this share of the window.
const MIN_FILL_DIVISOR: usize = 4;

const SENTENCE_ENDS: &[&str] = &[". ", "! ", "? ", ".\n", "!\n", "?\n", "\n"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub text: String,
    /// Length of `text` in chars.
    pub size_hint: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("max_segment_size must be greater than zero")]
    ZeroSegmentSize,
}

/// Splits `document` into segments of at most `max_segment_size` chars.
///
/// Always returns at least one segment; an empty document yields one empty segment.
pub fn split(document: &str, max_segment_size: usize) -> Result<Vec<Segment>, SegmentError> {
    if max_segment_size == 0 {
        return Err(SegmentError::ZeroSegmentSize);
    }

    let mut segments = Vec::new();
    let mut rest = document;

    loop {
        // Byte offset of the first char past the bound, if the remainder exceeds it.
        let overflow_at = rest.char_indices().nth(max_segment_size).map(|(i, _)| i);
        let Some(window_end) = overflow_at else {
            push_segment(&mut segments, rest);
            break;
        };

        let window = &rest[..window_end];
        let cut = semantic_cut(window).unwrap_or(window_end);
        push_segment(&mut segments, &rest[..cut]);
        rest = &rest[cut..];
    }

    Ok(segments)
}

fn push_segment(segments: &mut Vec<Segment>, text: &str) {
    segments.push(Segment {
        index: segments.len(),
        text: text.to_string(),
        size_hint: text.chars().count(),
    });
}

/// Byte offset just past the best semantic boundary inside `window`, if one is far enough in.
fn semantic_cut(window: &str) -> Option<usize> {
    let min_cut = window.len() / MIN_FILL_DIVISOR;
    let acceptable = |cut: usize| cut > 0 && cut > min_cut;

    let paragraph = window.rfind("\n\n").map(|i| i + 2);
    if let Some(cut) = paragraph.filter(|&c| acceptable(c)) {
        return Some(cut);
    }

    let sentence = SENTENCE_ENDS
        .iter()
        .filter_map(|end| window.rfind(end).map(|i| i + end.len()))
        .max();
    if let Some(cut) = sentence.filter(|&c| acceptable(c)) {
        return Some(cut);
    }

    window
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .filter(|&c| acceptable(c))
}
