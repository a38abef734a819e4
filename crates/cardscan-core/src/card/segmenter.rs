//! Line segmentation of raw OCR text.

use serde::Serialize;

/// One trimmed, non-empty line of OCR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub text: String,
    /// Zero-based position among the retained lines.
    pub index: usize,
}

/// Split text into trimmed, non-empty lines.
///
/// Blank lines are dropped and do not take an index, so indices are
/// contiguous over the retained lines.
pub fn segment(text: &str) -> Vec<Line> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, text)| Line {
            text: text.to_string(),
            index,
        })
        .collect()
}
