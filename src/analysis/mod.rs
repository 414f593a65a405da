//! The pure analysis pipeline.
//!
//! `analyze` composes the fact extractors, signal scorers, profile
//! builder, risk aggregator and alert engine into one deterministic
//! function. No I/O, no clock, no shared state: identical
//! `(subject, body, sender domain)` input yields identical output, which
//! also makes messages safely analyzable in parallel.

pub mod alerts;
pub mod extract;
pub mod profile;
pub mod risk;
pub mod signals;

use crate::config::Taxonomy;
use crate::domain::{AnalysisInput, EmailAnalysis, SenderAddress};

/// Run stages 3-7 of the pipeline over one normalized message.
pub fn analyze(
    input: &AnalysisInput,
    sender: &SenderAddress,
    taxonomy: &Taxonomy,
) -> EmailAnalysis {
    let text = input.full_text();
    let text_lower = text.to_lowercase();

    // Stage 3: fact extractors (independent, order-insensitive).
    let case_numbers = extract::case_numbers(&text);
    let money_amounts = extract::money_amounts(&text);
    let dates_mentioned = extract::dates_mentioned(&text);
    let deadlines = extract::deadlines(&text, &text_lower, &taxonomy.deadline_keywords);
    let action_items = extract::action_items(&text);
    let key_phrases = extract::key_phrases(&text_lower, &taxonomy.key_phrases);

    // Stage 4: signal scorers.
    let (urgency, urgency_score) =
        signals::score_urgency(&text_lower, !deadlines.is_empty(), &taxonomy.urgency);
    let (sentiment, sentiment_scores) =
        signals::classify_sentiment(&text_lower, &taxonomy.sentiment);
    let (deception_flags, deception_score) =
        signals::flag_deception(&text_lower, &taxonomy.deception);
    let is_lawyer_comm = signals::is_lawyer_comm(&text_lower, &sender.domain, &taxonomy.lawyer);

    // Stage 5: psychological profile.
    let psychological_profile = profile::build_profile(
        &input.body,
        &sentiment,
        &deception_flags,
        &taxonomy.profile_markers,
    );

    // Stage 6: risk aggregation.
    let risk_level = risk::aggregate_risk(
        deception_score,
        urgency_score,
        &sentiment,
        !money_amounts.is_empty(),
    );

    // Stage 7: operator alerts.
    let admin_alerts = alerts::evaluate_alerts(
        &text_lower,
        &taxonomy.alert_rules,
        &deception_flags,
        deception_score,
    );

    EmailAnalysis {
        urgency,
        urgency_score,
        sentiment,
        sentiment_scores,
        deception_flags,
        deception_score,
        dates_mentioned,
        deadlines,
        case_numbers,
        money_amounts,
        is_lawyer_comm,
        action_items,
        key_phrases,
        psychological_profile,
        risk_level,
        admin_alerts,
    }
}
