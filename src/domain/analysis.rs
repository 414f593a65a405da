//! Analysis output: the structured facts and signal scores derived from
//! one message.
//!
//! `EmailAnalysis` is the output of a pure function: it is embedded into
//! the persisted record but never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Urgency label derived from the clamped urgency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Elevated,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Ordinal risk level combining deception, urgency, sentiment and the
/// presence of money amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// One detected manipulation tactic with the indicator phrases that hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeceptionFlag {
    pub tactic: String,
    pub indicators: Vec<String>,
    pub count: u32,
}

/// A deadline-vocabulary hit with the nearest date found in its context
/// window (None when the window held no recognizable date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub keyword: String,
    pub date: Option<String>,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManipulationRisk {
    Low,
    Medium,
    High,
}

/// Qualitative profile derived from the body text plus the sentiment and
/// deception outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsychologicalProfile {
    pub communication_style: String,
    pub power_dynamics: String,
    pub emotional_state: String,
    pub credibility_indicators: Vec<String>,
    pub manipulation_risk: ManipulationRisk,
    pub behavioral_notes: Vec<String>,
}

/// Priority of an operator alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Medium,
    High,
    Critical,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// One operator alert emitted by the alert engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAlert {
    /// Rule name ("deadline_risk", "manipulation_detected", ...)
    #[serde(rename = "type")]
    pub kind: String,

    pub priority: AlertPriority,
    pub message: String,

    /// The distinct keywords (or tactics) that matched
    pub triggers: Vec<String>,
}

/// Complete analysis of one message. Pure-function output: byte-identical
/// for byte-identical `(subject, body, sender domain)` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAnalysis {
    pub urgency: Urgency,
    /// Clamped to [0, 10]
    pub urgency_score: i32,

    /// Dominant category; `formal_neutral` when nothing scored
    pub sentiment: String,
    /// Distinct-keyword hit count per category (only categories with >= 1 hit)
    pub sentiment_scores: BTreeMap<String, u32>,

    pub deception_flags: Vec<DeceptionFlag>,
    /// Sum of per-tactic hit counts, clamped to [0, 10]
    pub deception_score: i32,

    /// Deduplicated, in order of first occurrence
    pub dates_mentioned: Vec<String>,
    pub deadlines: Vec<Deadline>,

    /// Deduplicated, in extraction order (the linker walks this order)
    pub case_numbers: Vec<String>,
    pub money_amounts: Vec<String>,

    pub is_lawyer_comm: bool,

    /// First 5 matches per pattern, trimmed
    pub action_items: Vec<String>,
    pub key_phrases: Vec<String>,

    pub psychological_profile: PsychologicalProfile,
    pub risk_level: RiskLevel,
    pub admin_alerts: Vec<AdminAlert>,
}
