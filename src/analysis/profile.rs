//! Psychological profile builder.
//!
//! Derives a secondary, qualitative profile from the body text plus the
//! sentiment and deception outputs. Deterministic rules only.

use crate::config::ProfileMarkers;
use crate::domain::{DeceptionFlag, ManipulationRisk, PsychologicalProfile};

/// Exclamation count above which the writer reads as agitated.
const EXCLAMATION_LIMIT: usize = 3;
/// ALL-CAPS word count above which the writer reads as agitated.
const CAPS_WORD_LIMIT: usize = 5;
/// Mean words-per-sentence above which the writer may be burying information.
const SENTENCE_LENGTH_LIMIT: f64 = 30.0;
/// Indicators summarized per credibility line.
const INDICATORS_PER_NOTE: usize = 3;

/// Build the profile from the raw body, the dominant sentiment and the
/// deception flags.
pub fn build_profile(
    body: &str,
    sentiment: &str,
    deception_flags: &[DeceptionFlag],
    markers: &ProfileMarkers,
) -> PsychologicalProfile {
    let body_lower = body.to_lowercase();
    let mut behavioral_notes = Vec::new();

    let communication_style = if markers.formal.iter().any(|m| body_lower.contains(m.as_str())) {
        "highly_formal"
    } else if markers.casual.iter().any(|m| body_lower.contains(m.as_str())) {
        "casual"
    } else {
        "professional"
    };

    let power_dynamics = if markers.dominant.iter().any(|m| body_lower.contains(m.as_str())) {
        "dominant"
    } else if markers
        .collaborative
        .iter()
        .any(|m| body_lower.contains(m.as_str()))
    {
        "collaborative"
    } else {
        "neutral"
    };

    let exclamations = body.matches('!').count();
    let caps_words = count_caps_words(body);
    let emotional_state = if exclamations > EXCLAMATION_LIMIT || caps_words > CAPS_WORD_LIMIT {
        behavioral_notes.push(format!(
            "Elevated emphasis: {exclamations} exclamation marks, {caps_words} all-caps words"
        ));
        "agitated"
    } else {
        match sentiment {
            "hostile" | "angry" => "adversarial",
            "upset" => "distressed",
            "cooperative" => "amenable",
            _ => "controlled",
        }
    };

    let credibility_indicators = deception_flags
        .iter()
        .map(|flag| {
            let sample = flag
                .indicators
                .iter()
                .take(INDICATORS_PER_NOTE)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", flag.tactic, sample)
        })
        .collect();

    let manipulation_risk = match deception_flags.len() {
        0 => ManipulationRisk::Low,
        1..=2 => ManipulationRisk::Medium,
        _ => ManipulationRisk::High,
    };

    if let Some(mean) = mean_sentence_length(body) {
        if mean > SENTENCE_LENGTH_LIMIT {
            behavioral_notes.push(format!(
                "Long sentences (avg {mean:.0} words) may be burying information"
            ));
        }
    }

    PsychologicalProfile {
        communication_style: communication_style.to_string(),
        power_dynamics: power_dynamics.to_string(),
        emotional_state: emotional_state.to_string(),
        credibility_indicators,
        manipulation_risk,
        behavioral_notes,
    }
}

/// Count words consisting entirely of uppercase letters (3+ chars, so "I"
/// and "OK" don't register).
fn count_caps_words(text: &str) -> usize {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()))
        .filter(|w| w.chars().count() >= 3 && w.chars().all(|c| c.is_uppercase()))
        .count()
}

/// Mean words per sentence, None when the text holds no words.
fn mean_sentence_length(text: &str) -> Option<f64> {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return None;
    }
    let words: usize = sentences
        .iter()
        .map(|s| s.split_whitespace().count())
        .sum();
    Some(words as f64 / sentences.len() as f64)
}
