//! Canonical message record produced by the normalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a message relative to the practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Inbound
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Self::Inbound),
            "outbound" => Ok(Self::Outbound),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// One canonical message, whether it arrived as a structured submission
/// or as a raw message blob.
///
/// Invariant: `subject` and `body` may each be empty but not both; the
/// engine rejects the message before analysis otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub subject: String,
    pub body: String,

    /// Free-form sender string as observed ("Jane Doe <jane@firm.com>")
    pub sender_raw: String,

    pub recipients: Vec<String>,
    pub cc: Vec<String>,

    #[serde(default)]
    pub direction: Direction,

    pub date: DateTime<Utc>,
}

impl AnalysisInput {
    /// Subject and body concatenated for text matching.
    pub fn full_text(&self) -> String {
        format!("{}\n{}", self.subject, self.body)
    }
}

/// Decomposed sender address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderAddress {
    /// Display name, empty when absent
    pub name: String,

    /// Lower-cased address; falls back to the raw string when no address
    /// could be found
    pub email: String,

    /// Part after '@', empty when no address was found
    pub domain: String,
}
