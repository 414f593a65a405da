//! Persisted records: the analyzed email and its operator alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analysis::{AdminAlert, EmailAnalysis};
use super::message::AnalysisInput;
use crate::link::LinkOutcome;

/// One ingested message with its analysis and linking outcome.
///
/// Created once per message and immutable afterwards, except for manual
/// re-linking which overwrites `matter_id`/`client_id` and clears
/// `auto_linked`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedEmail {
    pub id: Uuid,

    #[serde(flatten)]
    pub input: AnalysisInput,

    pub analysis: EmailAnalysis,

    pub matter_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub auto_linked: bool,

    pub created_at: DateTime<Utc>,
}

impl AnalyzedEmail {
    pub fn new(input: AnalysisInput, analysis: EmailAnalysis, link: &LinkOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            input,
            analysis,
            matter_id: link.matter_id,
            client_id: link.client_id,
            auto_linked: link.auto_linked,
            created_at: Utc::now(),
        }
    }
}

/// One persisted operator alert, linked to its source email.
///
/// Created at analysis time, mutated only by acknowledgement, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAlertRecord {
    pub id: Uuid,
    pub email_id: Uuid,

    #[serde(flatten)]
    pub alert: AdminAlert,

    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl AdminAlertRecord {
    pub fn new(email_id: Uuid, alert: AdminAlert) -> Self {
        Self {
            id: Uuid::new_v4(),
            email_id,
            alert,
            acknowledged: false,
            acknowledged_at: None,
            acknowledged_by: None,
            created_at: Utc::now(),
        }
    }
}
