/*!
 * Chapter range selection.
 *
 * Turns a human-entered range such as `"3-7"` into a validated, 1-based,
 * inclusive window over the input chapters.
 */

use std::fmt;
use std::ops::Range;

/// Inclusive, 1-based window over the input chapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterRange {
    /// First chapter (1-based)
    pub start: usize,
    /// Last chapter (1-based, inclusive)
    pub end: usize,
}

impl ChapterRange {
    /// Number of chapters in the window
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    /// Whether the window selects nothing (only when the input is empty)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-based index range for slicing the input list
    pub fn as_index_range(&self) -> Range<usize> {
        if self.is_empty() {
            return 0..0;
        }
        (self.start - 1)..self.end
    }

    /// Suggested output filename for this window
    pub fn output_filename(&self) -> String {
        format!("translated_{}_{}.json", self.start, self.end)
    }
}

impl fmt::Display for ChapterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Resolve a range specification against the number of available items.
///
/// Never fails: empty or unparseable input selects everything, each side
/// defaults independently, both bounds are clamped to `[1, item_count]` and
/// swapped when inverted. An empty input yields the empty window `{1, 0}`.
pub fn select(range_spec: &str, item_count: usize) -> ChapterRange {
    if item_count == 0 {
        return ChapterRange { start: 1, end: 0 };
    }

    let spec = range_spec.trim();
    if spec.is_empty() {
        return ChapterRange { start: 1, end: item_count };
    }

    let mut parts = spec.split('-');
    let start = parts.next().and_then(parse_leading_number).unwrap_or(1);
    let end = parts.next().and_then(parse_leading_number).unwrap_or(item_count);

    let mut start = start.clamp(1, item_count);
    let mut end = end.clamp(1, item_count);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    ChapterRange { start, end }
}

/// Lenient integer prefix parse: leading whitespace, optional `+`, then digits.
/// Zero counts as absent, like an unset form field.
fn parse_leading_number(part: &str) -> Option<usize> {
    let trimmed = part.trim_start();
    let digits_from = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = digits_from.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    // Anything too large for usize is clamped later anyway
    let value = digits.parse::<usize>().unwrap_or(usize::MAX);
    if value == 0 { None } else { Some(value) }
}
