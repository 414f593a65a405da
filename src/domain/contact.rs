//! Long-lived per-sender behavioral profile.
//!
//! Profiles are keyed by lower-cased sender email and folded forward on
//! every analyzed message: set unions for names/domains/matters, a FIFO
//! behavior timeline capped at the most recent 50 entries, and derived
//! aggregates recomputed over the CURRENT timeline only (history beyond
//! the cap does not vote).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analysis::Urgency;

/// Maximum behavior timeline length; oldest entries are evicted first.
pub const TIMELINE_CAP: usize = 50;

/// One per-message signal snapshot in a contact's behavior timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: DateTime<Utc>,
    pub sentiment: String,
    pub urgency: Urgency,
    pub deception_score: i32,
}

/// Derived risk tier for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRisk {
    Low,
    Medium,
    High,
}

impl ContactRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// What one analyzed message contributes to its sender's profile.
#[derive(Debug, Clone)]
pub struct Observation {
    pub name: String,
    pub domain: String,
    pub matter_id: Option<Uuid>,
    pub is_lawyer: bool,
    pub sentiment: String,
    pub urgency: Urgency,
    pub deception_score: i32,
    pub alerts_fired: u64,
    pub observed_at: DateTime<Utc>,
}

/// Long-lived behavioral profile of one sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactProfile {
    /// Lower-cased sender email (the upsert key)
    pub email: String,

    /// Observed display names, in order of first sighting
    pub names: Vec<String>,
    pub domains: Vec<String>,
    pub matter_ids: Vec<Uuid>,

    /// Sticky: once true, stays true
    pub is_lawyer: bool,

    /// Monotonic counters
    pub total_emails: u64,
    pub alert_count: u64,

    /// Majority vote over the current timeline
    pub dominant_sentiment: String,
    /// Mean deception score over the current timeline
    pub avg_deception_score: f64,
    pub risk_assessment: ContactRisk,

    /// FIFO, capped at [`TIMELINE_CAP`] most recent entries
    pub behavior_timeline: Vec<TimelineEntry>,

    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl ContactProfile {
    /// Create a fresh profile from a first observation.
    pub fn from_observation(email: String, obs: &Observation) -> Self {
        let mut profile = Self {
            email,
            names: Vec::new(),
            domains: Vec::new(),
            matter_ids: Vec::new(),
            is_lawyer: obs.is_lawyer,
            total_emails: 0,
            alert_count: 0,
            dominant_sentiment: obs.sentiment.clone(),
            avg_deception_score: 0.0,
            risk_assessment: ContactRisk::Low,
            behavior_timeline: Vec::new(),
            first_seen: obs.observed_at,
            last_seen: obs.observed_at,
        };
        profile.apply(obs);
        profile
    }

    /// Fold one observation into the profile and recompute the derived
    /// aggregates. The caller is responsible for serializing concurrent
    /// calls for the same sender key.
    pub fn apply(&mut self, obs: &Observation) {
        if !obs.name.is_empty() && !self.names.contains(&obs.name) {
            self.names.push(obs.name.clone());
        }
        if !obs.domain.is_empty() && !self.domains.contains(&obs.domain) {
            self.domains.push(obs.domain.clone());
        }
        if let Some(matter_id) = obs.matter_id {
            if !self.matter_ids.contains(&matter_id) {
                self.matter_ids.push(matter_id);
            }
        }
        self.is_lawyer = self.is_lawyer || obs.is_lawyer;

        self.behavior_timeline.push(TimelineEntry {
            date: obs.observed_at,
            sentiment: obs.sentiment.clone(),
            urgency: obs.urgency,
            deception_score: obs.deception_score,
        });
        if self.behavior_timeline.len() > TIMELINE_CAP {
            let excess = self.behavior_timeline.len() - TIMELINE_CAP;
            self.behavior_timeline.drain(..excess);
        }

        self.total_emails += 1;
        self.alert_count += obs.alerts_fired;
        self.last_seen = obs.observed_at;

        self.recompute();
    }

    /// A contact touching more than one matter.
    pub fn is_multi_matter(&self) -> bool {
        self.matter_ids.len() > 1
    }

    /// Recompute dominant sentiment, average deception and risk tier over
    /// the current (post-truncation) timeline.
    fn recompute(&mut self) {
        if self.behavior_timeline.is_empty() {
            return;
        }

        // Majority vote; ties broken by earliest occurrence in the timeline.
        let mut counts: Vec<(&str, u32)> = Vec::new();
        for entry in &self.behavior_timeline {
            match counts.iter_mut().find(|(s, _)| *s == entry.sentiment) {
                Some((_, n)) => *n += 1,
                None => counts.push((&entry.sentiment, 1)),
            }
        }
        let best = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if let Some((sentiment, _)) = counts.iter().find(|(_, n)| *n == best) {
            self.dominant_sentiment = sentiment.to_string();
        }

        let total: i64 = self
            .behavior_timeline
            .iter()
            .map(|e| e.deception_score as i64)
            .sum();
        self.avg_deception_score = total as f64 / self.behavior_timeline.len() as f64;

        self.risk_assessment = if self.avg_deception_score > 3.0 || self.alert_count > 2 {
            ContactRisk::High
        } else if self.avg_deception_score > 1.0 {
            ContactRisk::Medium
        } else {
            ContactRisk::Low
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(sentiment: &str, deception: i32) -> Observation {
        Observation {
            name: "Jane Doe".to_string(),
            domain: "example.com".to_string(),
            matter_id: None,
            is_lawyer: false,
            sentiment: sentiment.to_string(),
            urgency: Urgency::Normal,
            deception_score: deception,
            alerts_fired: 0,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn timeline_caps_at_fifty_fifo() {
        let first = obs("cooperative", 9);
        let mut profile = ContactProfile::from_observation("a@b.com".to_string(), &first);
        for _ in 0..TIMELINE_CAP {
            profile.apply(&obs("formal_neutral", 0));
        }
        assert_eq!(profile.behavior_timeline.len(), TIMELINE_CAP);
        // The original entry (the only one with deception 9) was evicted.
        assert!(profile
            .behavior_timeline
            .iter()
            .all(|e| e.deception_score == 0));
        assert_eq!(profile.total_emails, (TIMELINE_CAP + 1) as u64);
    }

    #[test]
    fn dominant_sentiment_votes_over_current_timeline_only() {
        let mut profile = ContactProfile::from_observation("a@b.com".to_string(), &obs("angry", 0));
        // 49 more angry entries fill the window...
        for _ in 0..49 {
            profile.apply(&obs("angry", 0));
        }
        // ...then 50 cooperative entries evict all of them.
        for _ in 0..50 {
            profile.apply(&obs("cooperative", 0));
        }
        assert_eq!(profile.dominant_sentiment, "cooperative");
    }

    #[test]
    fn dominant_sentiment_tie_breaks_to_earliest() {
        let mut profile = ContactProfile::from_observation("a@b.com".to_string(), &obs("upset", 0));
        profile.apply(&obs("angry", 0));
        assert_eq!(profile.dominant_sentiment, "upset");
    }

    #[test]
    fn lawyer_flag_is_sticky() {
        let mut lawyer = obs("formal_neutral", 0);
        lawyer.is_lawyer = true;
        let mut profile = ContactProfile::from_observation("a@b.com".to_string(), &lawyer);
        profile.apply(&obs("formal_neutral", 0));
        assert!(profile.is_lawyer);
    }

    #[test]
    fn risk_tiers_from_avg_deception_and_alerts() {
        let mut profile = ContactProfile::from_observation("a@b.com".to_string(), &obs("angry", 2));
        assert_eq!(profile.risk_assessment, ContactRisk::Medium);

        profile.apply(&obs("angry", 8));
        assert!(profile.avg_deception_score > 3.0);
        assert_eq!(profile.risk_assessment, ContactRisk::High);

        // Alert count alone can push a clean contact to high.
        let mut alerting = obs("formal_neutral", 0);
        alerting.alerts_fired = 3;
        let clean = ContactProfile::from_observation("c@d.com".to_string(), &alerting);
        assert_eq!(clean.risk_assessment, ContactRisk::High);
    }

    #[test]
    fn set_unions_do_not_duplicate() {
        let mut profile = ContactProfile::from_observation("a@b.com".to_string(), &obs("angry", 0));
        profile.apply(&obs("angry", 0));
        assert_eq!(profile.names.len(), 1);
        assert_eq!(profile.domains.len(), 1);
    }
}
