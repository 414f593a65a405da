//! Fact extractors: case numbers, money amounts, calendar dates,
//! deadlines, action items and key phrases.
//!
//! Each extractor applies an ordered set of patterns to the concatenated
//! subject+body and returns a deduplicated, insertion-ordered set. Absence
//! of matches is a normal empty result, never an error.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::domain::Deadline;

/// Context window around a deadline keyword hit.
const WINDOW_BEFORE: usize = 50;
const WINDOW_AFTER: usize = 100;

static CASE_NUMBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Docket style: 2024-DC-004521
        Regex::new(r"\b\d{4}-[A-Za-z]{1,4}-\d{4,8}\b").unwrap(),
        // Numeric docket: 23-1-2024, 24-12-00045210
        Regex::new(r"\b\d{2}-\d{1,2}-\d{4,8}\b").unwrap(),
        // Free text: "Case No. X", "case #X", "Case Number X"
        Regex::new(r"(?i)case\s*(?:no\.?|number|num\.?|#)\s*:?\s*([A-Za-z0-9][A-Za-z0-9-]{2,})")
            .unwrap(),
    ]
});

static MONEY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\$\s?\d[\d,]*(?:\.\d{1,2})?").unwrap(),
        Regex::new(r"(?i)\b\d[\d,]*(?:\.\d{1,2})?\s*(?:dollars|usd)\b").unwrap(),
    ]
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap(),
        Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap(),
        Regex::new(
            r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,\s*\d{4})?\b",
        )
        .unwrap(),
    ]
});

// Relative date words count as dates only inside deadline windows, where
// "expires tomorrow" carries the same weight as an explicit date.
static RELATIVE_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:today|tomorrow|end of (?:day|week|month)|next (?:week|month)|close of business|eod|cob)\b",
    )
    .unwrap()
});

static ACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bplease\s+([^.!?\n]{3,100})").unwrap(),
        Regex::new(r"(?i)\b(?:you\s+)?(?:need|must|should|have)\s+to\s+([^.!?\n]{3,100})")
            .unwrap(),
        Regex::new(r"(?i)\bkindly\s+([^.!?\n]{3,100})").unwrap(),
        Regex::new(r"(?i)\b(?:can|could|would)\s+you\s+([^.!?\n]{3,100})").unwrap(),
    ]
});

/// Push `value` unless the set already holds it, preserving first-seen order.
fn push_unique(set: &mut Vec<String>, value: String) {
    if !value.is_empty() && !set.contains(&value) {
        set.push(value);
    }
}

fn collect_matches(text: &str, patterns: &[Regex], use_capture: bool) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in patterns {
        for caps in pattern.captures_iter(text) {
            let hit = if use_capture {
                caps.get(1).or_else(|| caps.get(0))
            } else {
                caps.get(0)
            };
            if let Some(m) = hit {
                push_unique(&mut found, m.as_str().trim().to_string());
            }
        }
    }
    found
}

/// Extract docket / case numbers in order of first occurrence per pattern.
pub fn case_numbers(text: &str) -> Vec<String> {
    collect_matches(text, &CASE_NUMBER_PATTERNS, true)
}

/// Extract monetary amounts ("$12,500.00", "9000 dollars").
pub fn money_amounts(text: &str) -> Vec<String> {
    collect_matches(text, &MONEY_PATTERNS, false)
}

/// Extract calendar dates mentioned anywhere in the text.
pub fn dates_mentioned(text: &str) -> Vec<String> {
    collect_matches(text, &DATE_PATTERNS, false)
}

/// Extract imperative/request phrases: first 5 matches per pattern, trimmed.
pub fn action_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    for pattern in ACTION_PATTERNS.iter() {
        for caps in pattern.captures_iter(text).take(5) {
            if let Some(m) = caps.get(1) {
                let trimmed = m.as_str().trim();
                if !trimmed.is_empty() {
                    items.push(trimmed.to_string());
                }
            }
        }
    }
    items
}

/// Which of the configured key phrases appear in the text (deduplicated by
/// construction: each phrase is checked once).
pub fn key_phrases(text_lower: &str, phrases: &[String]) -> Vec<String> {
    phrases
        .iter()
        .filter(|phrase| text_lower.contains(phrase.as_str()))
        .cloned()
        .collect()
}

/// For each deadline-vocabulary keyword present in the text, capture a
/// context window around its first occurrence and search it for the
/// nearest date pattern. `date` stays `None` when the window holds no
/// recognizable date.
pub fn deadlines(text: &str, text_lower: &str, vocabulary: &[String]) -> Vec<Deadline> {
    let mut found = Vec::new();
    for keyword in vocabulary {
        if !text_lower.contains(keyword.as_str()) {
            continue;
        }
        // Locate the hit in the original text to keep the window's casing.
        let literal = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .expect("escaped literal is a valid pattern");
        let Some(hit) = literal.find(text) else {
            continue;
        };

        let start = floor_char_boundary(text, hit.start().saturating_sub(WINDOW_BEFORE));
        let end = ceil_char_boundary(text, (hit.end() + WINDOW_AFTER).min(text.len()));
        let window = &text[start..end];
        let keyword_offset = hit.start() - start;

        found.push(Deadline {
            keyword: keyword.clone(),
            date: nearest_date(window, keyword_offset),
            context: window.trim().to_string(),
        });
    }
    found
}

/// The date match closest to the keyword hit inside a window.
fn nearest_date(window: &str, keyword_offset: usize) -> Option<String> {
    let mut best: Option<(usize, String)> = None;
    let candidates = DATE_PATTERNS
        .iter()
        .chain(std::iter::once(&*RELATIVE_DATE_PATTERN));
    for pattern in candidates {
        for m in pattern.find_iter(window) {
            let distance = m.start().abs_diff(keyword_offset);
            if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                best = Some((distance, m.as_str().to_string()));
            }
        }
    }
    best.map(|(_, date)| date)
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docket_case_numbers() {
        let found = case_numbers("Re: Case No. 2024-DC-004521 and matter 23-1-2024");
        assert!(found.contains(&"2024-DC-004521".to_string()));
        assert!(found.contains(&"23-1-2024".to_string()));
    }

    #[test]
    fn case_numbers_deduplicate() {
        let found = case_numbers("Case No. 2024-DC-004521 supersedes 2024-DC-004521");
        assert_eq!(
            found.iter().filter(|c| *c == "2024-DC-004521").count(),
            1
        );
    }

    #[test]
    fn money_amounts_both_notations() {
        let found = money_amounts("Pay $12,500.00 or 9,000 dollars by Friday");
        assert_eq!(found, vec!["$12,500.00", "9,000 dollars"]);
    }

    #[test]
    fn dates_deduplicate_preserving_order() {
        let found = dates_mentioned("Due 03/15/2025, again 03/15/2025, then 2025-04-01");
        assert_eq!(found, vec!["03/15/2025", "2025-04-01"]);
    }

    #[test]
    fn deadline_window_finds_nearest_date() {
        let text = "The filing deadline is 03/15/2025 for this matter.";
        let vocab = vec!["deadline".to_string()];
        let found = deadlines(text, &text.to_lowercase(), &vocab);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keyword, "deadline");
        assert_eq!(found[0].date.as_deref(), Some("03/15/2025"));
        assert!(found[0].context.contains("filing deadline"));
    }

    #[test]
    fn deadline_without_date_is_none() {
        let text = "We must respect the statute of limitations in this case.";
        let vocab = vec!["statute of limitations".to_string()];
        let found = deadlines(text, &text.to_lowercase(), &vocab);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, None);
    }

    #[test]
    fn deadline_window_accepts_relative_dates() {
        let text = "URGENT: the statute of limitations expires tomorrow";
        let vocab = vec!["statute of limitations".to_string(), "expires".to_string()];
        let found = deadlines(text, &text.to_lowercase(), &vocab);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].date.as_deref(), Some("tomorrow"));
    }

    #[test]
    fn action_items_capped_at_five_per_pattern() {
        let text = "please review one. please review two. please review three. \
                    please review four. please review five. please review six.";
        let items = action_items(text);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0], "review one");
    }

    #[test]
    fn key_phrases_from_list_only() {
        let phrases = vec!["settlement".to_string(), "subpoena".to_string()];
        let found = key_phrases("we discussed the settlement terms", &phrases);
        assert_eq!(found, vec!["settlement"]);
    }

    #[test]
    fn window_respects_utf8_boundaries() {
        let text = "départ ééé deadline éééé suite";
        let vocab = vec!["deadline".to_string()];
        // Must not panic slicing mid-codepoint.
        let found = deadlines(text, &text.to_lowercase(), &vocab);
        assert_eq!(found.len(), 1);
    }
}
