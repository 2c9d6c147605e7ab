//! Text cleanup helpers for extracted field values.

use std::collections::HashSet;

/// Delimiters recognized when splitting author and subject lists.
const LIST_DELIMITERS: [char; 3] = [',', ';', '|'];

/// Collapses internal whitespace runs and trims the ends.
#[must_use]
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips a leading `label:` (case-insensitive) from a landmark's text,
/// e.g. `"Authors: A. Smith"` with label `"authors"` becomes `"A. Smith"`.
#[must_use]
pub fn strip_label(s: &str, label: &str) -> String {
    let trimmed = s.trim_start();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix(&label.to_ascii_lowercase()) {
        if rest.trim_start().starts_with(':') {
            let after_label = &trimmed[label.len()..];
            if let Some(idx) = after_label.find(':') {
                return after_label[idx + 1..].trim_start().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Splits on recognized delimiters, normalizing each piece and dropping
/// empties.
#[must_use]
pub fn split_delimited(s: &str) -> Vec<String> {
    s.split(LIST_DELIMITERS)
        .map(normalize_ws)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Removes duplicates while preserving first-seen order (authorship order
/// matters).
#[must_use]
pub fn dedup_preserve_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
