//! Keyword taxonomy configuration.
//!
//! Every table the pipeline matches against (urgency tiers, sentiment
//! categories, deception tactics, alert rules, lawyer indicators, deadline
//! vocabulary, key phrases, profile style markers) is declarative YAML
//! loaded at startup, never inline literals. A builtin default ships
//! embedded in the binary; an override file can be supplied for tuning or
//! localization without touching pipeline logic.
//!
//! The numeric weights and thresholds are behavioral contract: fixed
//! heuristic policy covered by the integration tests, not values inferred
//! from data.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Embedded default taxonomy.
const DEFAULT_TAXONOMY: &str = include_str!("../taxonomy/default.yaml");

/// The complete keyword taxonomy driving the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Schema version of the taxonomy file
    pub version: String,

    /// Urgency tier table (§ urgency scorer)
    pub urgency: UrgencyTable,

    /// Sentiment categories, in tie-break order (first declared wins)
    pub sentiment: Vec<SentimentCategory>,

    /// Manipulation tactics with their indicator phrases
    pub deception: Vec<DeceptionTactic>,

    /// Lawyer-communication indicators
    pub lawyer: LawyerIndicators,

    /// Deadline vocabulary (keyword hit opens a context window)
    pub deadline_keywords: Vec<String>,

    /// Legally notable phrases worth surfacing verbatim
    pub key_phrases: Vec<String>,

    /// Operator alert rule table
    pub alert_rules: Vec<AlertRule>,

    /// Marker phrases for the psychological profile builder
    pub profile_markers: ProfileMarkers,
}

/// Urgency scoring table: presence-based per-tier weights plus a flat
/// bonus when any deadline was extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgencyTable {
    /// Flat score added when at least one deadline was extracted
    pub deadline_bonus: i32,

    /// Tiers scored by keyword presence (not occurrence count)
    pub tiers: Vec<UrgencyTier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgencyTier {
    pub name: String,
    pub weight: i32,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeceptionTactic {
    pub tactic: String,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawyerIndicators {
    /// Legal-title phrases matched against the message text
    pub title_phrases: Vec<String>,

    /// Substrings matched against the sender's domain
    pub domain_indicators: Vec<String>,
}

/// One operator alert rule. Fires when the number of DISTINCT matched
/// keywords reaches `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub name: String,
    pub priority: crate::domain::AlertPriority,
    pub threshold: usize,
    pub message: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMarkers {
    pub formal: Vec<String>,
    pub casual: Vec<String>,
    pub dominant: Vec<String>,
    pub collaborative: Vec<String>,
}

impl Taxonomy {
    /// The builtin taxonomy embedded in the binary.
    pub fn builtin() -> Self {
        // The embedded default is validated by unit tests; a parse failure
        // here is a build defect, not a runtime condition.
        serde_yaml::from_str(DEFAULT_TAXONOMY).expect("embedded taxonomy is valid YAML")
    }

    /// Load a taxonomy override from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read taxonomy file: {}", path.display()))?;
        let taxonomy: Self =
            serde_yaml::from_str(&content).context("Failed to parse taxonomy YAML")?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Resolve the active taxonomy: explicit path, then the
    /// LEXMAIL_TAXONOMY environment variable, then the builtin default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Ok(env_path) = std::env::var("LEXMAIL_TAXONOMY") {
            return Self::from_file(Path::new(&env_path));
        }
        Ok(Self::builtin())
    }

    /// Validate the taxonomy definition.
    pub fn validate(&self) -> Result<()> {
        if self.urgency.tiers.is_empty() {
            anyhow::bail!("Taxonomy must define at least one urgency tier");
        }
        if self.sentiment.is_empty() {
            anyhow::bail!("Taxonomy must define at least one sentiment category");
        }
        for rule in &self.alert_rules {
            if rule.name.is_empty() {
                anyhow::bail!("Alert rule has an empty name");
            }
            if rule.threshold == 0 {
                anyhow::bail!("Alert rule '{}' has threshold 0 (would always fire)", rule.name);
            }
            if rule.threshold > rule.keywords.len() {
                anyhow::bail!(
                    "Alert rule '{}' requires {} hits but lists only {} keywords",
                    rule.name,
                    rule.threshold,
                    rule.keywords.len()
                );
            }
        }
        for tactic in &self.deception {
            if tactic.indicators.is_empty() {
                anyhow::bail!("Deception tactic '{}' has no indicators", tactic.tactic);
            }
        }
        Ok(())
    }
}

/// Default on-disk state directory (~/.lexmail or $LEXMAIL_HOME).
pub fn lexmail_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("LEXMAIL_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".lexmail"))
}

/// Default database path ($LEXMAIL_HOME/lexmail.db).
pub fn database_path() -> Result<PathBuf> {
    Ok(lexmail_home()?.join("lexmail.db"))
}
