//! Matter/client auto-linking.
//!
//! Resolves a message to a case record via its extracted case numbers
//! (first exact match wins, no multi-candidate resolution), falling back
//! to an exact sender-email match against the client registry. The
//! registry is read-only to the pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::EngineError;

/// One case record in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatterRecord {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One client record in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Uuid,
    pub name: String,
    /// Lower-cased contact address
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only view of the case/client registry.
#[async_trait]
pub trait CaseRegistry: Send + Sync {
    async fn matter_by_case_number(&self, case_number: &str)
        -> Result<Option<MatterRecord>, EngineError>;

    async fn client_by_email(&self, email: &str) -> Result<Option<ClientRecord>, EngineError>;

    async fn get_matter(&self, id: Uuid) -> Result<Option<MatterRecord>, EngineError>;

    async fn get_client(&self, id: Uuid) -> Result<Option<ClientRecord>, EngineError>;
}

/// Outcome of the linking stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub matter_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub auto_linked: bool,
}

/// Resolve a message against the registry: walk the extracted case
/// numbers in extraction order and take the FIRST exact match; otherwise
/// fall back to an exact sender-email lookup (clientId only, not counted
/// as auto-linked).
pub async fn resolve_link<R: CaseRegistry + ?Sized>(
    registry: &R,
    case_numbers: &[String],
    sender_email: &str,
) -> Result<LinkOutcome, EngineError> {
    for case_number in case_numbers {
        if let Some(matter) = registry.matter_by_case_number(case_number).await? {
            debug!(case_number, matter_id = %matter.id, "auto-linked by case number");
            return Ok(LinkOutcome {
                matter_id: Some(matter.id),
                client_id: Some(matter.client_id),
                auto_linked: true,
            });
        }
    }

    let email = sender_email.to_lowercase();
    if let Some(client) = registry.client_by_email(&email).await? {
        debug!(client_id = %client.id, "linked to client by sender email");
        return Ok(LinkOutcome {
            matter_id: None,
            client_id: Some(client.id),
            auto_linked: false,
        });
    }

    Ok(LinkOutcome::default())
}
