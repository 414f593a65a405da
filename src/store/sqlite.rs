//! SQLite-backed store.
//!
//! Full records are stored as JSON documents next to the handful of
//! columns the query surface filters on. The email insert and its alert
//! inserts run in one transaction: a persistence failure after analysis
//! loses nothing partially.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

use crate::domain::{AdminAlertRecord, AnalyzedEmail, ContactProfile, RiskLevel};
use crate::error::EngineError;
use crate::ingest::parse_sender;
use crate::link::{CaseRegistry, ClientRecord, MatterRecord};

use super::{DashboardCounts, EmailFilter, EmailStore, TimelineItem};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS emails (
    id              TEXT PRIMARY KEY,
    sender_email    TEXT NOT NULL,
    direction       TEXT NOT NULL,
    date            TEXT NOT NULL,
    risk_rank       INTEGER NOT NULL,
    sentiment       TEXT NOT NULL,
    matter_id       TEXT,
    client_id       TEXT,
    subject         TEXT NOT NULL,
    body            TEXT NOT NULL,
    sender_raw      TEXT NOT NULL,
    record_json     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_emails_matter ON emails(matter_id);
CREATE INDEX IF NOT EXISTS idx_emails_sender ON emails(sender_email);

CREATE TABLE IF NOT EXISTS alerts (
    id              TEXT PRIMARY KEY,
    email_id        TEXT NOT NULL REFERENCES emails(id),
    acknowledged    INTEGER NOT NULL DEFAULT 0,
    record_json     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alerts_email ON alerts(email_id);

CREATE TABLE IF NOT EXISTS contacts (
    email           TEXT PRIMARY KEY,
    profile_json    TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS matters (
    id              TEXT PRIMARY KEY,
    case_number     TEXT NOT NULL UNIQUE,
    record_json     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clients (
    id              TEXT PRIMARY KEY,
    email           TEXT NOT NULL,
    record_json     TEXT NOT NULL
);
";

/// Risk level as a sortable rank for the `risk >= x` filter.
fn risk_rank(risk: RiskLevel) -> i64 {
    match risk {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
        RiskLevel::Critical => 3,
    }
}

/// SQLite implementation of [`EmailStore`] and [`CaseRegistry`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "opened email store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-process, non-persistent store (tests, dry runs).
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn email_rows(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<AnalyzedEmail>, EngineError> {
        let mut stmt = conn.prepare(sql)?;
        let json_rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        json_rows
            .iter()
            .map(|json| serde_json::from_str(json).map_err(EngineError::from))
            .collect()
    }

    fn alert_rows(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<AdminAlertRecord>, EngineError> {
        let mut stmt = conn.prepare(sql)?;
        let json_rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        json_rows
            .iter()
            .map(|json| serde_json::from_str(json).map_err(EngineError::from))
            .collect()
    }
}

#[async_trait]
impl EmailStore for SqliteStore {
    async fn insert_analyzed(
        &self,
        email: &AnalyzedEmail,
        alerts: &[AdminAlertRecord],
    ) -> Result<(), EngineError> {
        let sender_email = parse_sender(&email.input.sender_raw).email.to_lowercase();
        let record_json = serde_json::to_string(email)?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO emails (id, sender_email, direction, date, risk_rank, sentiment,
                                 matter_id, client_id, subject, body, sender_raw, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                email.id.to_string(),
                sender_email,
                email.input.direction.as_str(),
                email.input.date.to_rfc3339(),
                risk_rank(email.analysis.risk_level),
                email.analysis.sentiment,
                email.matter_id.map(|id| id.to_string()),
                email.client_id.map(|id| id.to_string()),
                email.input.subject,
                email.input.body,
                email.input.sender_raw,
                record_json,
            ],
        )?;
        for alert in alerts {
            tx.execute(
                "INSERT INTO alerts (id, email_id, acknowledged, record_json)
                 VALUES (?1, ?2, 0, ?3)",
                params![
                    alert.id.to_string(),
                    alert.email_id.to_string(),
                    serde_json::to_string(alert)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn get_email(&self, id: Uuid) -> Result<Option<AnalyzedEmail>, EngineError> {
        let conn = self.lock();
        let rows = Self::email_rows(
            &conn,
            "SELECT record_json FROM emails WHERE id = ?1",
            &[&id.to_string()],
        )?;
        Ok(rows.into_iter().next())
    }

    async fn list_emails(&self, filter: &EmailFilter) -> Result<Vec<AnalyzedEmail>, EngineError> {
        let mut sql = String::from("SELECT record_json FROM emails WHERE 1=1");
        let mut owned: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(min_risk) = filter.min_risk {
            sql.push_str(&format!(" AND risk_rank >= ?{}", owned.len() + 1));
            owned.push(Box::new(risk_rank(min_risk)));
        }
        if let Some(direction) = filter.direction {
            sql.push_str(&format!(" AND direction = ?{}", owned.len() + 1));
            owned.push(Box::new(direction.as_str().to_string()));
        }
        if let Some(matter_id) = filter.matter_id {
            sql.push_str(&format!(" AND matter_id = ?{}", owned.len() + 1));
            owned.push(Box::new(matter_id.to_string()));
        }
        if let Some(client_id) = filter.client_id {
            sql.push_str(&format!(" AND client_id = ?{}", owned.len() + 1));
            owned.push(Box::new(client_id.to_string()));
        }
        sql.push_str(" ORDER BY date DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let params: Vec<&dyn rusqlite::ToSql> = owned.iter().map(|p| p.as_ref()).collect();
        let conn = self.lock();
        Self::email_rows(&conn, &sql, &params)
    }

    async fn search_emails(&self, query: &str) -> Result<Vec<AnalyzedEmail>, EngineError> {
        let needle = format!("%{}%", query.to_lowercase());
        let conn = self.lock();
        Self::email_rows(
            &conn,
            "SELECT record_json FROM emails
             WHERE lower(subject) LIKE ?1 OR lower(body) LIKE ?1 OR lower(sender_raw) LIKE ?1
             ORDER BY date DESC",
            &[&needle],
        )
    }

    async fn relink_email(
        &self,
        id: Uuid,
        matter_id: Option<Uuid>,
        client_id: Option<Uuid>,
    ) -> Result<(), EngineError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let json: Option<String> = tx
            .query_row(
                "SELECT record_json FROM emails WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        let json = json.ok_or(EngineError::EmailNotFound(id))?;

        let mut email: AnalyzedEmail = serde_json::from_str(&json)?;
        email.matter_id = matter_id;
        email.client_id = client_id;
        email.auto_linked = false;

        tx.execute(
            "UPDATE emails SET matter_id = ?1, client_id = ?2, record_json = ?3 WHERE id = ?4",
            params![
                matter_id.map(|m| m.to_string()),
                client_id.map(|c| c.to_string()),
                serde_json::to_string(&email)?,
                id.to_string(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    async fn alerts_for_email(
        &self,
        email_id: Uuid,
    ) -> Result<Vec<AdminAlertRecord>, EngineError> {
        let conn = self.lock();
        Self::alert_rows(
            &conn,
            "SELECT record_json FROM alerts WHERE email_id = ?1",
            &[&email_id.to_string()],
        )
    }

    async fn list_alerts(&self, pending_only: bool) -> Result<Vec<AdminAlertRecord>, EngineError> {
        let conn = self.lock();
        if pending_only {
            Self::alert_rows(
                &conn,
                "SELECT record_json FROM alerts WHERE acknowledged = 0",
                &[],
            )
        } else {
            Self::alert_rows(&conn, "SELECT record_json FROM alerts", &[])
        }
    }

    async fn acknowledge_alerts(&self, ids: &[Uuid], by: &str) -> Result<u64, EngineError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut changed = 0u64;
        for id in ids {
            let json: Option<String> = tx
                .query_row(
                    "SELECT record_json FROM alerts WHERE id = ?1 AND acknowledged = 0",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            let Some(json) = json else { continue };

            let mut alert: AdminAlertRecord = serde_json::from_str(&json)?;
            alert.acknowledged = true;
            alert.acknowledged_at = Some(Utc::now());
            alert.acknowledged_by = Some(by.to_string());

            changed += tx.execute(
                "UPDATE alerts SET acknowledged = 1, record_json = ?1 WHERE id = ?2",
                params![serde_json::to_string(&alert)?, id.to_string()],
            )? as u64;
        }
        tx.commit()?;
        Ok(changed)
    }

    async fn get_contact(&self, email: &str) -> Result<Option<ContactProfile>, EngineError> {
        let conn = self.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT profile_json FROM contacts WHERE email = ?1",
                params![email.to_lowercase()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        json.map(|j| serde_json::from_str(&j).map_err(EngineError::from))
            .transpose()
    }

    async fn put_contact(&self, profile: &ContactProfile) -> Result<(), EngineError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO contacts (email, profile_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO UPDATE SET profile_json = ?2, updated_at = ?3",
            params![
                profile.email,
                serde_json::to_string(profile)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn list_contacts(&self) -> Result<Vec<ContactProfile>, EngineError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT profile_json FROM contacts ORDER BY email")?;
        let json_rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        json_rows
            .iter()
            .map(|json| serde_json::from_str(json).map_err(EngineError::from))
            .collect()
    }

    async fn dashboard_counts(&self) -> Result<DashboardCounts, EngineError> {
        let conn = self.lock();
        let mut counts = DashboardCounts::default();

        counts.total_emails =
            conn.query_row("SELECT COUNT(*) FROM emails", [], |row| row.get::<_, i64>(0))? as u64;
        counts.pending_alerts = conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE acknowledged = 0",
            [],
            |row| row.get::<_, i64>(0),
        )? as u64;
        counts.high_risk_emails = conn.query_row(
            "SELECT COUNT(*) FROM emails WHERE risk_rank >= ?1",
            params![risk_rank(RiskLevel::High)],
            |row| row.get::<_, i64>(0),
        )? as u64;

        let mut stmt =
            conn.prepare("SELECT sentiment, COUNT(*) FROM emails GROUP BY sentiment")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (sentiment, count) in rows {
            counts.sentiment_histogram.insert(sentiment, count as u64);
        }
        Ok(counts)
    }

    async fn matter_timeline(&self, matter_id: Uuid) -> Result<Vec<TimelineItem>, EngineError> {
        let conn = self.lock();
        let emails = Self::email_rows(
            &conn,
            "SELECT record_json FROM emails WHERE matter_id = ?1 ORDER BY date ASC",
            &[&matter_id.to_string()],
        )?;

        let mut items = Vec::with_capacity(emails.len());
        for email in emails {
            let alert_count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM alerts WHERE email_id = ?1",
                params![email.id.to_string()],
                |row| row.get(0),
            )?;
            items.push(TimelineItem {
                email_id: email.id,
                date: email.input.date,
                subject: email.input.subject,
                sender_raw: email.input.sender_raw,
                risk_level: email.analysis.risk_level,
                has_alerts: alert_count > 0,
            });
        }
        Ok(items)
    }

    async fn insert_matter(&self, matter: &MatterRecord) -> Result<(), EngineError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO matters (id, case_number, record_json) VALUES (?1, ?2, ?3)",
            params![
                matter.id.to_string(),
                matter.case_number,
                serde_json::to_string(matter)?,
            ],
        )?;
        Ok(())
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<(), EngineError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO clients (id, email, record_json) VALUES (?1, ?2, ?3)",
            params![
                client.id.to_string(),
                client.email.to_lowercase(),
                serde_json::to_string(client)?,
            ],
        )?;
        Ok(())
    }

    async fn list_matters(&self) -> Result<Vec<MatterRecord>, EngineError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT record_json FROM matters ORDER BY case_number")?;
        let json_rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        json_rows
            .iter()
            .map(|json| serde_json::from_str(json).map_err(EngineError::from))
            .collect()
    }

    async fn list_clients(&self) -> Result<Vec<ClientRecord>, EngineError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT record_json FROM clients ORDER BY email")?;
        let json_rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        json_rows
            .iter()
            .map(|json| serde_json::from_str(json).map_err(EngineError::from))
            .collect()
    }
}

#[async_trait]
impl CaseRegistry for SqliteStore {
    async fn matter_by_case_number(
        &self,
        case_number: &str,
    ) -> Result<Option<MatterRecord>, EngineError> {
        let conn = self.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM matters WHERE case_number = ?1",
                params![case_number],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        json.map(|j| serde_json::from_str(&j).map_err(EngineError::from))
            .transpose()
    }

    async fn client_by_email(&self, email: &str) -> Result<Option<ClientRecord>, EngineError> {
        let conn = self.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM clients WHERE email = ?1",
                params![email.to_lowercase()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        json.map(|j| serde_json::from_str(&j).map_err(EngineError::from))
            .transpose()
    }

    async fn get_matter(&self, id: Uuid) -> Result<Option<MatterRecord>, EngineError> {
        let conn = self.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM matters WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        json.map(|j| serde_json::from_str(&j).map_err(EngineError::from))
            .transpose()
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<ClientRecord>, EngineError> {
        let conn = self.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM clients WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        json.map(|j| serde_json::from_str(&j).map_err(EngineError::from))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::Taxonomy;
    use crate::domain::{AnalysisInput, Direction};
    use crate::link::LinkOutcome;

    fn sample_email(subject: &str, body: &str) -> AnalyzedEmail {
        let input = AnalysisInput {
            subject: subject.to_string(),
            body: body.to_string(),
            sender_raw: "Jane Doe <jane@acme.com>".to_string(),
            recipients: vec!["intake@ourfirm.com".to_string()],
            cc: Vec::new(),
            direction: Direction::Inbound,
            date: Utc::now(),
        };
        let sender = parse_sender(&input.sender_raw);
        let analysis = analyze(&input, &sender, &Taxonomy::builtin());
        AnalyzedEmail::new(input, analysis, &LinkOutcome::default())
    }

    #[tokio::test]
    async fn email_roundtrip_with_alerts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let email = sample_email("Deadline", "the statute of limitations expires tomorrow");
        let alerts: Vec<AdminAlertRecord> = email
            .analysis
            .admin_alerts
            .iter()
            .cloned()
            .map(|a| AdminAlertRecord::new(email.id, a))
            .collect();
        assert!(!alerts.is_empty());

        store.insert_analyzed(&email, &alerts).await.unwrap();

        let loaded = store.get_email(email.id).await.unwrap().unwrap();
        assert_eq!(loaded.analysis, email.analysis);
        assert_eq!(store.alerts_for_email(email.id).await.unwrap().len(), alerts.len());
    }

    #[tokio::test]
    async fn relink_rewrites_record_and_clears_auto_link() {
        let store = SqliteStore::open_in_memory().unwrap();
        let email = sample_email("hello", "Please see attached for your records.");
        store.insert_analyzed(&email, &[]).await.unwrap();

        let matter_id = Uuid::new_v4();
        let client_id = Uuid::new_v4();
        store
            .relink_email(email.id, Some(matter_id), Some(client_id))
            .await
            .unwrap();

        let loaded = store.get_email(email.id).await.unwrap().unwrap();
        assert_eq!(loaded.matter_id, Some(matter_id));
        assert_eq!(loaded.client_id, Some(client_id));
        assert!(!loaded.auto_linked);

        // Filterable columns were updated too.
        let by_matter = store
            .list_emails(&EmailFilter {
                matter_id: Some(matter_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_matter.len(), 1);
    }

    #[tokio::test]
    async fn relink_missing_email_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let missing = Uuid::new_v4();
        let err = store.relink_email(missing, None, None).await.unwrap_err();
        assert!(matches!(err, EngineError::EmailNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn acknowledge_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let email = sample_email("x", "unacceptable, i will report you to the bar association");
        let alerts: Vec<AdminAlertRecord> = email
            .analysis
            .admin_alerts
            .iter()
            .cloned()
            .map(|a| AdminAlertRecord::new(email.id, a))
            .collect();
        store.insert_analyzed(&email, &alerts).await.unwrap();

        let ids: Vec<Uuid> = alerts.iter().map(|a| a.id).collect();
        let first = store.acknowledge_alerts(&ids, "admin").await.unwrap();
        assert_eq!(first, ids.len() as u64);
        let second = store.acknowledge_alerts(&ids, "admin").await.unwrap();
        assert_eq!(second, 0);

        assert!(store.list_alerts(true).await.unwrap().is_empty());
        let all = store.list_alerts(false).await.unwrap();
        assert!(all.iter().all(|a| a.acknowledged && a.acknowledged_by.as_deref() == Some("admin")));
    }

    #[tokio::test]
    async fn contact_upsert_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        let email = sample_email("x", "hello there");
        let sender = parse_sender(&email.input.sender_raw);
        let obs = crate::domain::contact::Observation {
            name: sender.name.clone(),
            domain: sender.domain.clone(),
            matter_id: None,
            is_lawyer: false,
            sentiment: "formal_neutral".to_string(),
            urgency: crate::domain::Urgency::Normal,
            deception_score: 0,
            alerts_fired: 0,
            observed_at: Utc::now(),
        };
        let mut profile = ContactProfile::from_observation(sender.email.clone(), &obs);
        store.put_contact(&profile).await.unwrap();

        profile.apply(&obs);
        store.put_contact(&profile).await.unwrap();

        let loaded = store.get_contact(&sender.email).await.unwrap().unwrap();
        assert_eq!(loaded.total_emails, 2);
        assert_eq!(store.list_contacts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dashboard_and_timeline() {
        let store = SqliteStore::open_in_memory().unwrap();
        let client = ClientRecord {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            email: "ops@acme.com".to_string(),
            created_at: Utc::now(),
        };
        let matter = MatterRecord {
            id: Uuid::new_v4(),
            case_number: "2024-DC-004521".to_string(),
            title: "Acme v. Doe".to_string(),
            client_id: client.id,
            created_at: Utc::now(),
        };
        store.insert_client(&client).await.unwrap();
        store.insert_matter(&matter).await.unwrap();

        let mut risky = sample_email("URGENT", "the statute of limitations expires tomorrow");
        risky.matter_id = Some(matter.id);
        let alerts: Vec<AdminAlertRecord> = risky
            .analysis
            .admin_alerts
            .iter()
            .cloned()
            .map(|a| AdminAlertRecord::new(risky.id, a))
            .collect();
        store.insert_analyzed(&risky, &alerts).await.unwrap();

        let mut calm = sample_email("records", "Please see attached for your records.");
        calm.matter_id = Some(matter.id);
        store.insert_analyzed(&calm, &[]).await.unwrap();

        let counts = store.dashboard_counts().await.unwrap();
        assert_eq!(counts.total_emails, 2);
        assert!(counts.pending_alerts >= 1);
        assert_eq!(counts.sentiment_histogram["formal_neutral"], 2);

        let timeline = store.matter_timeline(matter.id).await.unwrap();
        assert_eq!(timeline.len(), 2);
        assert!(timeline.iter().any(|item| item.has_alerts));
        assert!(timeline.iter().any(|item| !item.has_alerts));
    }

    #[tokio::test]
    async fn search_matches_subject_body_and_sender() {
        let store = SqliteStore::open_in_memory().unwrap();
        let email = sample_email("Quarterly summary", "Nothing notable here.");
        store.insert_analyzed(&email, &[]).await.unwrap();

        assert_eq!(store.search_emails("quarterly").await.unwrap().len(), 1);
        assert_eq!(store.search_emails("notable").await.unwrap().len(), 1);
        assert_eq!(store.search_emails("jane@acme").await.unwrap().len(), 1);
        assert!(store.search_emails("zebra").await.unwrap().is_empty());
    }
}
