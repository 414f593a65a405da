//! Pipeline orchestration.
//!
//! The engine owns the whole ingest flow: validate, normalize, analyze,
//! link, persist, then fold the result into the sender's contact profile.
//! Analysis itself is pure and synchronous; the engine is where storage
//! and concurrency live.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::analysis::analyze;
use crate::config::Taxonomy;
use crate::domain::contact::{ContactProfile, Observation};
use crate::domain::{AdminAlertRecord, AnalysisInput, AnalyzedEmail, Direction};
use crate::error::EngineError;
use crate::ingest::{parse_raw_message, parse_sender, validate_raw_upload, IngestRequest};
use crate::link::{resolve_link, CaseRegistry, LinkOutcome};
use crate::store::EmailStore;

/// What one ingest run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub email: AnalyzedEmail,
    pub linking: LinkReport,
    pub alerts_created: usize,
    /// Degradations tolerated during normalization
    pub warnings: Vec<String>,
}

/// Linking summary surfaced alongside the stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkReport {
    pub matter_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub auto_linked: bool,
    pub case_numbers_found: Vec<String>,
}

/// The intelligence engine, generic over its storage backend.
pub struct Engine<S: EmailStore + CaseRegistry> {
    store: Arc<S>,
    taxonomy: Arc<Taxonomy>,
    /// Per-sender locks serializing contact-profile folds. Concurrent
    /// ingests for different senders run freely; same-sender folds are
    /// read-modify-write and must not interleave.
    sender_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: EmailStore + CaseRegistry> Engine<S> {
    pub fn new(store: Arc<S>, taxonomy: Taxonomy) -> Self {
        Self {
            store,
            taxonomy: Arc::new(taxonomy),
            sender_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest one structured submission.
    #[instrument(skip(self, request), fields(sender = %request.sender))]
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReport, EngineError> {
        self.process(request.into_input(), Vec::new()).await
    }

    /// Ingest one raw message upload (gated by content type and size).
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest_raw(
        &self,
        content_type: &str,
        bytes: &[u8],
        direction: Direction,
    ) -> Result<IngestReport, EngineError> {
        validate_raw_upload(content_type, bytes.len())?;
        let blob = String::from_utf8_lossy(bytes);
        let (input, warnings) = parse_raw_message(&blob, direction).into_parts();
        for warning in &warnings {
            warn!(%warning, "degraded parse");
        }
        self.process(input, warnings).await
    }

    /// The shared tail of both ingest paths: analyze, link, persist,
    /// update the sender's contact profile.
    async fn process(
        &self,
        input: AnalysisInput,
        warnings: Vec<String>,
    ) -> Result<IngestReport, EngineError> {
        if input.subject.trim().is_empty() && input.body.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let sender = parse_sender(&input.sender_raw);
        let analysis = analyze(&input, &sender, &self.taxonomy);
        let link = resolve_link(&*self.store, &analysis.case_numbers, &sender.email).await?;

        let email = AnalyzedEmail::new(input, analysis, &link);
        let alerts: Vec<AdminAlertRecord> = email
            .analysis
            .admin_alerts
            .iter()
            .cloned()
            .map(|alert| AdminAlertRecord::new(email.id, alert))
            .collect();
        self.store.insert_analyzed(&email, &alerts).await?;

        self.fold_contact(&email, &link, alerts.len() as u64).await?;

        info!(
            email_id = %email.id,
            risk = email.analysis.risk_level.as_str(),
            alerts = alerts.len(),
            auto_linked = link.auto_linked,
            "email analyzed"
        );

        Ok(IngestReport {
            linking: LinkReport {
                matter_id: link.matter_id,
                client_id: link.client_id,
                auto_linked: link.auto_linked,
                case_numbers_found: email.analysis.case_numbers.clone(),
            },
            alerts_created: alerts.len(),
            warnings,
            email,
        })
    }

    /// Fold this email into the sender's profile under the per-sender
    /// lock, so concurrent ingests from the same address cannot lose
    /// each other's updates.
    async fn fold_contact(
        &self,
        email: &AnalyzedEmail,
        link: &LinkOutcome,
        alerts_fired: u64,
    ) -> Result<(), EngineError> {
        let sender = parse_sender(&email.input.sender_raw);
        let key = sender.email.to_lowercase();

        let lock = {
            let mut locks = self.sender_locks.lock().await;
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        let _guard = lock.lock().await;

        let obs = Observation {
            name: if sender.name == sender.email {
                String::new()
            } else {
                sender.name.clone()
            },
            domain: sender.domain.clone(),
            matter_id: link.matter_id,
            is_lawyer: email.analysis.is_lawyer_comm,
            sentiment: email.analysis.sentiment.clone(),
            urgency: email.analysis.urgency,
            deception_score: email.analysis.deception_score,
            alerts_fired,
            observed_at: email.input.date,
        };

        let profile = match self.store.get_contact(&key).await? {
            Some(mut existing) => {
                existing.apply(&obs);
                existing
            }
            None => ContactProfile::from_observation(key, &obs),
        };
        self.store.put_contact(&profile).await
    }

    /// Manually re-link an email. A matter id implies its client; a bare
    /// client id links the client only. Targets are validated first.
    #[instrument(skip(self))]
    pub async fn relink(
        &self,
        email_id: Uuid,
        matter_id: Option<Uuid>,
        client_id: Option<Uuid>,
    ) -> Result<AnalyzedEmail, EngineError> {
        let client_id = match matter_id {
            Some(id) => {
                let matter = self
                    .store
                    .get_matter(id)
                    .await?
                    .ok_or(EngineError::MatterNotFound(id))?;
                Some(matter.client_id)
            }
            None => match client_id {
                Some(id) => {
                    self.store
                        .get_client(id)
                        .await?
                        .ok_or(EngineError::ClientNotFound(id))?;
                    Some(id)
                }
                None => None,
            },
        };

        self.store.relink_email(email_id, matter_id, client_id).await?;
        self.store
            .get_email(email_id)
            .await?
            .ok_or(EngineError::EmailNotFound(email_id))
    }
}
