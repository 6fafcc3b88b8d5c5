//! Keyword classification of spoken yes/no/skip answers.
//!
//! Matching is case-insensitive and works on whole words, so "know" does not
//! count as "no" and "skipping" does not count as "skip".

use crate::domain::HabitResponse;

const AFFIRMATIVE: &[&str] = &["yes", "yeah", "yep"];
const NEGATIVE: &[&str] = &["no", "nope", "nah"];
const SKIP: &[&str] = &["skip"];

/// Whole-transcript phrases that mean "no reflection today".
const DECLINE_PHRASES: &[&str] = &[
    "skip",
    "no",
    "nope",
    "nah",
    "no thanks",
    "no thank you",
    "nothing",
];

/// Result of classifying one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Recognized(HabitResponse),
    /// No marker matched; the caller should re-prompt.
    Ambiguous,
}

impl Classification {
    pub const fn response(self) -> Option<HabitResponse> {
        match self {
            Self::Recognized(response) => Some(response),
            Self::Ambiguous => None,
        }
    }
}

/// Classify a transcript into yes / no / skip.
///
/// When markers of several kinds appear, skip wins over negative, and
/// negative wins over affirmative.
pub fn classify_response(transcript: &str) -> Classification {
    let words = words(transcript);
    let has_any = |markers: &[&str]| words.iter().any(|w| markers.contains(&w.as_str()));

    if has_any(SKIP) {
        Classification::Recognized(HabitResponse::Skipped)
    } else if has_any(NEGATIVE) {
        Classification::Recognized(HabitResponse::NotCompleted)
    } else if has_any(AFFIRMATIVE) {
        Classification::Recognized(HabitResponse::Completed)
    } else {
        Classification::Ambiguous
    }
}

/// Whether a reflection transcript is just a refusal to reflect.
pub fn is_decline(transcript: &str) -> bool {
    let normalised = words(transcript).join(" ");
    normalised.is_empty() || DECLINE_PHRASES.contains(&normalised.as_str())
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(text: &str) -> Option<HabitResponse> {
        classify_response(text).response()
    }

    #[test]
    fn affirmative_markers() {
        assert_eq!(class("yeah I did it"), Some(HabitResponse::Completed));
        assert_eq!(class("Yes!"), Some(HabitResponse::Completed));
        assert_eq!(class("yep"), Some(HabitResponse::Completed));
    }

    #[test]
    fn negative_markers() {
        assert_eq!(class("nah not today"), Some(HabitResponse::NotCompleted));
        assert_eq!(class("NOPE"), Some(HabitResponse::NotCompleted));
        assert_eq!(class("no, sorry"), Some(HabitResponse::NotCompleted));
    }

    #[test]
    fn skip_marker() {
        assert_eq!(class("let's skip that one"), Some(HabitResponse::Skipped));
    }

    #[test]
    fn unmatched_text_is_ambiguous() {
        assert_eq!(classify_response("maybe kind of"), Classification::Ambiguous);
        assert_eq!(classify_response(""), Classification::Ambiguous);
    }

    #[test]
    fn markers_inside_other_words_do_not_match() {
        assert_eq!(classify_response("I know"), Classification::Ambiguous);
        assert_eq!(classify_response("eyes closed"), Classification::Ambiguous);
    }

    #[test]
    fn skip_outranks_other_markers() {
        assert_eq!(class("no, skip it"), Some(HabitResponse::Skipped));
        assert_eq!(class("yeah no"), Some(HabitResponse::NotCompleted));
    }

    #[test]
    fn decline_detection() {
        assert!(is_decline("skip"));
        assert!(is_decline("No thanks."));
        assert!(is_decline("   "));
        assert!(!is_decline("skip the part about work, I felt great"));
        assert!(!is_decline("Today went well"));
    }
}
