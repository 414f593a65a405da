//! Independent signal scorers: urgency, sentiment, deception and the
//! lawyer-communication detector.
//!
//! All scoring is presence-based keyword matching against the lower-cased
//! text. Presence (not occurrence count) keeps repeated boilerplate from
//! producing runaway scores.

use std::collections::BTreeMap;

use crate::config::{DeceptionTactic, LawyerIndicators, SentimentCategory, UrgencyTable};
use crate::domain::{DeceptionFlag, Urgency};

/// Sentiment category used when nothing scores.
pub const NEUTRAL_SENTIMENT: &str = "formal_neutral";

const SCORE_MIN: i32 = 0;
const SCORE_MAX: i32 = 10;

fn clamp_score(score: i32) -> i32 {
    score.clamp(SCORE_MIN, SCORE_MAX)
}

/// Score urgency: each tier contributes its weight once if ANY of its
/// keywords is present, plus a flat bonus when a deadline was extracted.
/// The score is clamped to [0, 10] and mapped to a label.
pub fn score_urgency(text_lower: &str, has_deadline: bool, table: &UrgencyTable) -> (Urgency, i32) {
    let mut score = 0;
    for tier in &table.tiers {
        if tier.keywords.iter().any(|k| text_lower.contains(k.as_str())) {
            score += tier.weight;
        }
    }
    if has_deadline {
        score += table.deadline_bonus;
    }
    let score = clamp_score(score);

    let label = match score {
        s if s >= 5 => Urgency::Critical,
        s if s >= 3 => Urgency::High,
        s if s >= 1 => Urgency::Elevated,
        _ => Urgency::Normal,
    };
    (label, score)
}

/// Classify sentiment: per category, count DISTINCT keywords present; the
/// highest count wins, ties broken by declaration order. Returns the
/// dominant category and the per-category hit counts (categories with
/// zero hits are omitted).
pub fn classify_sentiment(
    text_lower: &str,
    categories: &[SentimentCategory],
) -> (String, BTreeMap<String, u32>) {
    let mut scores = BTreeMap::new();
    let mut dominant = NEUTRAL_SENTIMENT.to_string();
    let mut best = 0u32;

    for category in categories {
        let hits = category
            .keywords
            .iter()
            .filter(|k| text_lower.contains(k.as_str()))
            .count() as u32;
        if hits > 0 {
            scores.insert(category.name.clone(), hits);
            // Strictly-greater keeps the first-declared category on ties.
            if hits > best {
                best = hits;
                dominant = category.name.clone();
            }
        }
    }

    (dominant, scores)
}

/// Flag manipulation tactics: one flag per tactic with at least one
/// indicator hit. The deception score is the sum of all hit counts,
/// clamped to [0, 10].
pub fn flag_deception(
    text_lower: &str,
    tactics: &[DeceptionTactic],
) -> (Vec<DeceptionFlag>, i32) {
    let mut flags = Vec::new();
    let mut total = 0i32;

    for tactic in tactics {
        let indicators: Vec<String> = tactic
            .indicators
            .iter()
            .filter(|phrase| text_lower.contains(phrase.as_str()))
            .cloned()
            .collect();
        if !indicators.is_empty() {
            let count = indicators.len() as u32;
            total += count as i32;
            flags.push(DeceptionFlag {
                tactic: tactic.tactic.clone(),
                indicators,
                count,
            });
        }
    }

    (flags, clamp_score(total))
}

/// A message reads as lawyer correspondence when the text carries a legal
/// title phrase or the sender's domain contains a legal indicator.
pub fn is_lawyer_comm(
    text_lower: &str,
    sender_domain: &str,
    indicators: &LawyerIndicators,
) -> bool {
    if indicators
        .title_phrases
        .iter()
        .any(|phrase| text_lower.contains(phrase.as_str()))
    {
        return true;
    }
    let domain = sender_domain.to_lowercase();
    !domain.is_empty()
        && indicators
            .domain_indicators
            .iter()
            .any(|needle| domain.contains(needle.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Taxonomy;

    fn taxonomy() -> Taxonomy {
        Taxonomy::builtin()
    }

    #[test]
    fn urgency_is_presence_based_not_frequency_based() {
        let t = taxonomy();
        let (_, once) = score_urgency("urgent", false, &t.urgency);
        let (_, many) = score_urgency("urgent urgent urgent urgent", false, &t.urgency);
        assert_eq!(once, many);
    }

    #[test]
    fn urgency_clamps_to_ten_under_adversarial_input() {
        let t = taxonomy();
        // Hit every tier plus the deadline bonus.
        let text = "urgent asap emergency deadline expires overdue tomorrow";
        let (label, score) = score_urgency(text, true, &t.urgency);
        assert!(score <= 10);
        assert_eq!(label, Urgency::Critical);
    }

    #[test]
    fn low_tier_keywords_subtract() {
        let t = taxonomy();
        let (label, score) = score_urgency("no rush on this", false, &t.urgency);
        assert_eq!(score, 0); // clamped at the floor
        assert_eq!(label, Urgency::Normal);
    }

    #[test]
    fn sentiment_defaults_to_formal_neutral() {
        let t = taxonomy();
        let (dominant, scores) =
            classify_sentiment("please see attached for your records.", &t.sentiment);
        assert_eq!(dominant, NEUTRAL_SENTIMENT);
        assert!(scores.is_empty());
    }

    #[test]
    fn sentiment_counts_distinct_keywords_only() {
        let t = taxonomy();
        let (dominant, scores) =
            classify_sentiment("unacceptable unacceptable unacceptable", &t.sentiment);
        assert_eq!(dominant, "angry");
        assert_eq!(scores["angry"], 1);
    }

    #[test]
    fn sentiment_tie_breaks_by_declaration_order() {
        let t = taxonomy();
        // One hostile keyword, one angry keyword: hostile is declared first.
        let (dominant, scores) = classify_sentiment("fraud and outrageous conduct", &t.sentiment);
        assert_eq!(scores["hostile"], 1);
        assert_eq!(scores["angry"], 1);
        assert_eq!(dominant, "hostile");
    }

    #[test]
    fn deception_score_sums_hits_and_clamps() {
        let t = taxonomy();
        let text = "act now, last chance, final offer, limited time, now or never, \
                    your fault, you caused this, because of you, you should have, \
                    never said that, you're imagining it, not a big deal";
        let (flags, score) = flag_deception(text, &t.deception);
        assert!(flags.len() >= 3);
        assert_eq!(score, 10);
    }

    #[test]
    fn deception_flag_carries_indicators() {
        let t = taxonomy();
        let (flags, score) = flag_deception("i never said that, you must be confused", &t.deception);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].tactic, "gaslighting");
        assert_eq!(flags[0].count, 2);
        assert_eq!(score, 2);
    }

    #[test]
    fn lawyer_detector_title_or_domain() {
        let t = taxonomy();
        assert!(is_lawyer_comm("jane roe, esq.", "", &t.lawyer));
        assert!(is_lawyer_comm("hello", "smith-lawfirm.com", &t.lawyer));
        assert!(!is_lawyer_comm("hello", "example.com", &t.lawyer));
    }
}
