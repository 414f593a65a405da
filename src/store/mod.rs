//! Persistence seams.
//!
//! The engine talks to storage through the [`EmailStore`] and
//! [`crate::link::CaseRegistry`] traits so it can run against the real
//! SQLite store or the in-memory fake used by tests. The storage
//! dependency is passed into the engine explicitly; there is no
//! module-level handle.

pub mod memory;
pub mod sqlite;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    AdminAlertRecord, AnalyzedEmail, ContactProfile, Direction, RiskLevel,
};
use crate::error::EngineError;
use crate::link::{ClientRecord, MatterRecord};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Filters for the email list view.
#[derive(Debug, Clone, Default)]
pub struct EmailFilter {
    /// Keep emails at or above this risk level
    pub min_risk: Option<RiskLevel>,
    pub direction: Option<Direction>,
    pub matter_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub limit: Option<usize>,
}

/// Aggregate dashboard counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub total_emails: u64,
    pub sentiment_histogram: BTreeMap<String, u64>,
    pub pending_alerts: u64,
    /// Emails at high or critical risk
    pub high_risk_emails: u64,
}

/// One row in a matter's chronological timeline view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineItem {
    pub email_id: Uuid,
    pub date: DateTime<Utc>,
    pub subject: String,
    pub sender_raw: String,
    pub risk_level: RiskLevel,
    pub has_alerts: bool,
}

/// Storage operations the engine and the query surface depend on.
#[async_trait]
pub trait EmailStore: Send + Sync {
    /// Persist one analyzed email together with its alerts, atomically:
    /// either everything lands or nothing does.
    async fn insert_analyzed(
        &self,
        email: &AnalyzedEmail,
        alerts: &[AdminAlertRecord],
    ) -> Result<(), EngineError>;

    async fn get_email(&self, id: Uuid) -> Result<Option<AnalyzedEmail>, EngineError>;

    /// Newest first.
    async fn list_emails(&self, filter: &EmailFilter) -> Result<Vec<AnalyzedEmail>, EngineError>;

    /// Case-insensitive substring search across subject, body and sender.
    async fn search_emails(&self, query: &str) -> Result<Vec<AnalyzedEmail>, EngineError>;

    /// Manual re-link: overwrites matter/client and clears auto_linked.
    async fn relink_email(
        &self,
        id: Uuid,
        matter_id: Option<Uuid>,
        client_id: Option<Uuid>,
    ) -> Result<(), EngineError>;

    async fn alerts_for_email(
        &self,
        email_id: Uuid,
    ) -> Result<Vec<AdminAlertRecord>, EngineError>;

    async fn list_alerts(&self, pending_only: bool) -> Result<Vec<AdminAlertRecord>, EngineError>;

    /// Acknowledge a batch of alerts; returns how many rows changed.
    async fn acknowledge_alerts(&self, ids: &[Uuid], by: &str) -> Result<u64, EngineError>;

    /// Keyed by lower-cased sender email.
    async fn get_contact(&self, email: &str) -> Result<Option<ContactProfile>, EngineError>;

    async fn put_contact(&self, profile: &ContactProfile) -> Result<(), EngineError>;

    async fn list_contacts(&self) -> Result<Vec<ContactProfile>, EngineError>;

    async fn dashboard_counts(&self) -> Result<DashboardCounts, EngineError>;

    /// Chronological (oldest first) view of one matter's emails.
    async fn matter_timeline(&self, matter_id: Uuid) -> Result<Vec<TimelineItem>, EngineError>;

    // Registry seeding (the linker reads matters/clients through
    // CaseRegistry; these write them).
    async fn insert_matter(&self, matter: &MatterRecord) -> Result<(), EngineError>;

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), EngineError>;

    async fn list_matters(&self) -> Result<Vec<MatterRecord>, EngineError>;

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, EngineError>;
}
