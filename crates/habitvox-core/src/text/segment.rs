//! Splitting a free-form spoken transcript into discrete goals.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::MAX_GOALS;

/// A list marker such as `1.` or `2)` followed by whitespace or end of text.
static NUMERIC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[.)](?:\s|$)").expect("valid marker regex"));

static LEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{1,2}[.)]\s*").expect("valid leading marker regex"));

/// Delimiters tried in priority order when no numeric markers are present.
static DELIMITERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\s+and\s+",
        r",",
        r"(?i)\s+also\s+",
        r"\.(?:\s+|$)",
        r"(?i)\s+next\s+",
        r"(?i)\s+finally\s+",
        r"(?i)\s+lastly\s+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid delimiter regex"))
    .collect()
});

/// Extract up to [`MAX_GOALS`] goals from a transcript.
///
/// Numbered lists ("1. run 2) read") are split on their markers. Otherwise
/// the first delimiter that produces more than one fragment wins. Non-empty
/// input never yields an empty result: if nothing survives cleanup the whole
/// trimmed transcript becomes the single goal.
pub fn extract_goals(transcript: &str) -> Vec<String> {
    let trimmed = transcript.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let fragments = if NUMERIC_MARKER.is_match(trimmed) {
        split_numbered(trimmed)
    } else {
        split_on_delimiters(trimmed)
    };

    let mut goals: Vec<String> = fragments
        .iter()
        .map(|f| clean_fragment(f))
        .filter(|f| !f.is_empty())
        .take(MAX_GOALS)
        .collect();

    if goals.is_empty() {
        goals.push(trimmed.to_string());
    }

    tracing::debug!(count = goals.len(), "Extracted goals from transcript");
    goals
}

fn split_numbered(text: &str) -> Vec<String> {
    let mut boundaries: Vec<usize> = NUMERIC_MARKER.find_iter(text).map(|m| m.start()).collect();
    if boundaries.first() != Some(&0) {
        boundaries.insert(0, 0);
    }
    boundaries.push(text.len());

    boundaries
        .windows(2)
        .map(|w| LEADING_MARKER.replace(&text[w[0]..w[1]], "").into_owned())
        .collect()
}

fn split_on_delimiters(text: &str) -> Vec<String> {
    for delimiter in DELIMITERS.iter() {
        let parts: Vec<String> = delimiter
            .split(text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
            .collect();
        if parts.len() > 1 {
            return parts;
        }
    }
    vec![text.to_string()]
}

fn clean_fragment(fragment: &str) -> String {
    fragment
        .trim()
        .trim_end_matches(['.', ',', ';'])
        .trim()
        .to_string()
}
