//! In-memory store used by tests and as the reference implementation of
//! the storage semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{AdminAlertRecord, AnalyzedEmail, ContactProfile, RiskLevel};
use crate::error::EngineError;
use crate::link::{CaseRegistry, ClientRecord, MatterRecord};

use super::{DashboardCounts, EmailFilter, EmailStore, TimelineItem};

#[derive(Default)]
struct Inner {
    emails: Vec<AnalyzedEmail>,
    alerts: Vec<AdminAlertRecord>,
    contacts: HashMap<String, ContactProfile>,
    matters: Vec<MatterRecord>,
    clients: Vec<ClientRecord>,
}

/// In-memory implementation of [`EmailStore`] and [`CaseRegistry`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a client (test convenience).
    pub fn add_client(&self, name: &str, email: &str) -> ClientRecord {
        let client = ClientRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_lowercase(),
            created_at: Utc::now(),
        };
        self.lock().clients.push(client.clone());
        client
    }

    /// Seed a matter (test convenience).
    pub fn add_matter(&self, case_number: &str, title: &str, client_id: Uuid) -> MatterRecord {
        let matter = MatterRecord {
            id: Uuid::new_v4(),
            case_number: case_number.to_string(),
            title: title.to_string(),
            client_id,
            created_at: Utc::now(),
        };
        self.lock().matters.push(matter.clone());
        matter
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EmailStore for MemoryStore {
    async fn insert_analyzed(
        &self,
        email: &AnalyzedEmail,
        alerts: &[AdminAlertRecord],
    ) -> Result<(), EngineError> {
        let mut inner = self.lock();
        inner.emails.push(email.clone());
        inner.alerts.extend_from_slice(alerts);
        Ok(())
    }

    async fn get_email(&self, id: Uuid) -> Result<Option<AnalyzedEmail>, EngineError> {
        Ok(self.lock().emails.iter().find(|e| e.id == id).cloned())
    }

    async fn list_emails(&self, filter: &EmailFilter) -> Result<Vec<AnalyzedEmail>, EngineError> {
        let inner = self.lock();
        let mut matched: Vec<AnalyzedEmail> = inner
            .emails
            .iter()
            .filter(|e| filter.min_risk.map_or(true, |min| e.analysis.risk_level >= min))
            .filter(|e| filter.direction.map_or(true, |d| e.input.direction == d))
            .filter(|e| filter.matter_id.map_or(true, |m| e.matter_id == Some(m)))
            .filter(|e| filter.client_id.map_or(true, |c| e.client_id == Some(c)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.input.date.cmp(&a.input.date));
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn search_emails(&self, query: &str) -> Result<Vec<AnalyzedEmail>, EngineError> {
        let needle = query.to_lowercase();
        let inner = self.lock();
        Ok(inner
            .emails
            .iter()
            .filter(|e| {
                e.input.subject.to_lowercase().contains(&needle)
                    || e.input.body.to_lowercase().contains(&needle)
                    || e.input.sender_raw.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn relink_email(
        &self,
        id: Uuid,
        matter_id: Option<Uuid>,
        client_id: Option<Uuid>,
    ) -> Result<(), EngineError> {
        let mut inner = self.lock();
        let email = inner
            .emails
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EngineError::EmailNotFound(id))?;
        email.matter_id = matter_id;
        email.client_id = client_id;
        email.auto_linked = false;
        Ok(())
    }

    async fn alerts_for_email(
        &self,
        email_id: Uuid,
    ) -> Result<Vec<AdminAlertRecord>, EngineError> {
        Ok(self
            .lock()
            .alerts
            .iter()
            .filter(|a| a.email_id == email_id)
            .cloned()
            .collect())
    }

    async fn list_alerts(&self, pending_only: bool) -> Result<Vec<AdminAlertRecord>, EngineError> {
        Ok(self
            .lock()
            .alerts
            .iter()
            .filter(|a| !pending_only || !a.acknowledged)
            .cloned()
            .collect())
    }

    async fn acknowledge_alerts(&self, ids: &[Uuid], by: &str) -> Result<u64, EngineError> {
        let mut inner = self.lock();
        let mut changed = 0;
        for alert in inner.alerts.iter_mut() {
            if ids.contains(&alert.id) && !alert.acknowledged {
                alert.acknowledged = true;
                alert.acknowledged_at = Some(Utc::now());
                alert.acknowledged_by = Some(by.to_string());
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn get_contact(&self, email: &str) -> Result<Option<ContactProfile>, EngineError> {
        Ok(self.lock().contacts.get(&email.to_lowercase()).cloned())
    }

    async fn put_contact(&self, profile: &ContactProfile) -> Result<(), EngineError> {
        self.lock()
            .contacts
            .insert(profile.email.clone(), profile.clone());
        Ok(())
    }

    async fn list_contacts(&self) -> Result<Vec<ContactProfile>, EngineError> {
        let mut contacts: Vec<ContactProfile> = self.lock().contacts.values().cloned().collect();
        contacts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(contacts)
    }

    async fn dashboard_counts(&self) -> Result<DashboardCounts, EngineError> {
        let inner = self.lock();
        let mut counts = DashboardCounts {
            total_emails: inner.emails.len() as u64,
            ..Default::default()
        };
        for email in &inner.emails {
            *counts
                .sentiment_histogram
                .entry(email.analysis.sentiment.clone())
                .or_insert(0) += 1;
            if email.analysis.risk_level >= RiskLevel::High {
                counts.high_risk_emails += 1;
            }
        }
        counts.pending_alerts = inner.alerts.iter().filter(|a| !a.acknowledged).count() as u64;
        Ok(counts)
    }

    async fn matter_timeline(&self, matter_id: Uuid) -> Result<Vec<TimelineItem>, EngineError> {
        let inner = self.lock();
        let mut items: Vec<TimelineItem> = inner
            .emails
            .iter()
            .filter(|e| e.matter_id == Some(matter_id))
            .map(|e| TimelineItem {
                email_id: e.id,
                date: e.input.date,
                subject: e.input.subject.clone(),
                sender_raw: e.input.sender_raw.clone(),
                risk_level: e.analysis.risk_level,
                has_alerts: inner.alerts.iter().any(|a| a.email_id == e.id),
            })
            .collect();
        items.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(items)
    }

    async fn insert_matter(&self, matter: &MatterRecord) -> Result<(), EngineError> {
        self.lock().matters.push(matter.clone());
        Ok(())
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), EngineError> {
        self.lock().clients.push(client.clone());
        Ok(())
    }

    async fn list_matters(&self) -> Result<Vec<MatterRecord>, EngineError> {
        Ok(self.lock().matters.clone())
    }

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, EngineError> {
        Ok(self.lock().clients.clone())
    }
}

#[async_trait]
impl CaseRegistry for MemoryStore {
    async fn matter_by_case_number(
        &self,
        case_number: &str,
    ) -> Result<Option<MatterRecord>, EngineError> {
        Ok(self
            .lock()
            .matters
            .iter()
            .find(|m| m.case_number == case_number)
            .cloned())
    }

    async fn client_by_email(&self, email: &str) -> Result<Option<ClientRecord>, EngineError> {
        let needle = email.to_lowercase();
        Ok(self
            .lock()
            .clients
            .iter()
            .find(|c| c.email == needle)
            .cloned())
    }

    async fn get_matter(&self, id: Uuid) -> Result<Option<MatterRecord>, EngineError> {
        Ok(self.lock().matters.iter().find(|m| m.id == id).cloned())
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<ClientRecord>, EngineError> {
        Ok(self.lock().clients.iter().find(|c| c.id == id).cloned())
    }
}
