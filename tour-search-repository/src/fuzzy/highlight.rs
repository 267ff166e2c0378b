//! Highlight span computation.

use std::ops::Range;

/// Length in bytes of `needle` matched case-insensitively at the start of `haystack`.
fn prefix_match_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    for n in needle.chars() {
        let (_, h) = hay.next()?;
        if !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
    }
    Some(hay.next().map_or(haystack.len(), |(i, _)| i))
}

/// Byte ranges of `text` covered by any of `terms`, compared
/// case-insensitively. Overlapping or touching ranges are merged.
pub fn highlight_ranges(text: &str, terms: &[&str]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();

    for term in terms.iter().filter(|t| !t.is_empty()) {
        for (start, _) in text.char_indices() {
            if let Some(len) = prefix_match_len(&text[start..], term) {
                ranges.push(start..start + len);
            }
        }
    }

    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
