//! Command-line interface for lexmail.
//!
//! Provides commands for ingesting messages, browsing analyzed emails,
//! managing alerts, inspecting contact profiles, and seeding the
//! matter/client registry.

use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::{self, Taxonomy};
use crate::domain::{Direction, RiskLevel};
use crate::engine::Engine;
use crate::ingest::IngestRequest;
use crate::link::{ClientRecord, MatterRecord};
use crate::store::{EmailFilter, EmailStore, SqliteStore};

/// lexmail - Deterministic email intelligence engine
#[derive(Parser, Debug)]
#[command(name = "lexmail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Taxonomy override file (defaults to LEXMAIL_TAXONOMY, then builtin)
    #[arg(long, global = true)]
    pub taxonomy: Option<PathBuf>,

    /// Database file (defaults to $LEXMAIL_HOME/lexmail.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze and store one message
    Ingest {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat input as a raw message blob instead of structured JSON
        #[arg(long)]
        raw: bool,

        /// Message direction (overrides the direction in a JSON submission)
        #[arg(long)]
        direction: Option<String>,
    },

    /// List analyzed emails
    Emails {
        /// Keep emails at or above this risk level
        #[arg(long)]
        min_risk: Option<String>,

        /// Filter by direction (inbound/outbound)
        #[arg(long)]
        direction: Option<String>,

        /// Filter by matter ID
        #[arg(long)]
        matter: Option<String>,

        /// Filter by client ID
        #[arg(long)]
        client: Option<String>,

        /// Maximum number of emails to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show the full analysis of one email
    Show {
        /// Email ID
        email_id: String,
    },

    /// Manually re-link an email to a matter or client
    Relink {
        /// Email ID
        email_id: String,

        /// Matter ID (implies its client)
        #[arg(long)]
        matter: Option<String>,

        /// Client ID (used only when no matter is given)
        #[arg(long)]
        client: Option<String>,
    },

    /// List operator alerts
    Alerts {
        /// Show only unacknowledged alerts
        #[arg(long)]
        pending: bool,
    },

    /// Acknowledge alerts
    Ack {
        /// Alert IDs to acknowledge
        alert_ids: Vec<String>,

        /// Acknowledge all pending alerts
        #[arg(long)]
        all: bool,

        /// Who is acknowledging
        #[arg(long, default_value = "admin")]
        by: String,
    },

    /// List contact profiles
    Contacts,

    /// Show one contact profile
    Contact {
        /// Contact email address
        email: String,
    },

    /// Show aggregate dashboard counts
    Dashboard,

    /// Show the chronological timeline of one matter
    Timeline {
        /// Matter ID
        matter_id: String,
    },

    /// Search emails by subject, body or sender
    Search {
        /// Search query
        query: String,
    },

    /// Manage the matter registry
    Matter {
        #[command(subcommand)]
        command: MatterCommands,
    },

    /// Manage the client registry
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum MatterCommands {
    /// Register a matter
    Add {
        /// Court case number ("2024-DC-004521")
        case_number: String,

        /// Matter title
        title: String,

        /// Owning client ID
        #[arg(long)]
        client: String,
    },

    /// List registered matters
    List,
}

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// Register a client
    Add {
        /// Client name
        name: String,

        /// Client contact email
        email: String,
    },

    /// List registered clients
    List,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let taxonomy = Taxonomy::load(self.taxonomy.as_deref())?;
        let db_path = match self.db {
            Some(path) => path,
            None => config::database_path()?,
        };
        let store = Arc::new(SqliteStore::open(&db_path)?);
        let engine = Engine::new(store, taxonomy);

        match self.command {
            Commands::Ingest { file, raw, direction } => {
                ingest_message(&engine, file, raw, direction).await
            }
            Commands::Emails {
                min_risk,
                direction,
                matter,
                client,
                limit,
            } => list_emails(&engine, min_risk, direction, matter, client, limit).await,
            Commands::Show { email_id } => show_email(&engine, &email_id).await,
            Commands::Relink {
                email_id,
                matter,
                client,
            } => relink_email(&engine, &email_id, matter, client).await,
            Commands::Alerts { pending } => list_alerts(&engine, pending).await,
            Commands::Ack { alert_ids, all, by } => {
                acknowledge(&engine, alert_ids, all, &by).await
            }
            Commands::Contacts => list_contacts(&engine).await,
            Commands::Contact { email } => show_contact(&engine, &email).await,
            Commands::Dashboard => show_dashboard(&engine).await,
            Commands::Timeline { matter_id } => show_timeline(&engine, &matter_id).await,
            Commands::Search { query } => search_emails(&engine, &query).await,
            Commands::Matter { command } => match command {
                MatterCommands::Add {
                    case_number,
                    title,
                    client,
                } => add_matter(&engine, &case_number, &title, &client).await,
                MatterCommands::List => list_matters(&engine).await,
            },
            Commands::Client { command } => match command {
                ClientCommands::Add { name, email } => add_client(&engine, &name, &email).await,
                ClientCommands::List => list_clients(&engine).await,
            },
        }
    }
}

/// Read input from a file or stdin.
fn read_input(file: Option<PathBuf>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()));
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid {what}: {value}"))
}

/// Analyze one message and print the resulting report as JSON.
async fn ingest_message(
    engine: &Engine<SqliteStore>,
    file: Option<PathBuf>,
    raw: bool,
    direction: Option<String>,
) -> Result<()> {
    let direction = direction
        .map(|d| Direction::from_str(&d).map_err(anyhow::Error::msg))
        .transpose()?;
    let input = read_input(file)?;
    if input.trim().is_empty() {
        anyhow::bail!("Input is empty");
    }

    let report = if raw {
        engine
            .ingest_raw(
                "message/rfc822",
                input.as_bytes(),
                direction.unwrap_or_default(),
            )
            .await?
    } else {
        let mut request: IngestRequest =
            serde_json::from_str(&input).context("Failed to parse ingestion JSON")?;
        if let Some(direction) = direction {
            request.direction = direction;
        }
        engine.ingest(request).await?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    for warning in &report.warnings {
        eprintln!("[warning: {warning}]");
    }
    Ok(())
}

async fn list_emails(
    engine: &Engine<SqliteStore>,
    min_risk: Option<String>,
    direction: Option<String>,
    matter: Option<String>,
    client: Option<String>,
    limit: usize,
) -> Result<()> {
    let filter = EmailFilter {
        min_risk: min_risk
            .map(|r| RiskLevel::from_str(&r).map_err(anyhow::Error::msg))
            .transpose()?,
        direction: direction
            .map(|d| Direction::from_str(&d).map_err(anyhow::Error::msg))
            .transpose()?,
        matter_id: matter.map(|m| parse_uuid(&m, "matter ID")).transpose()?,
        client_id: client.map(|c| parse_uuid(&c, "client ID")).transpose()?,
        limit: Some(limit),
    };

    let emails = engine.store().list_emails(&filter).await?;
    if emails.is_empty() {
        println!("No emails found");
        return Ok(());
    }

    println!(
        "{:<38} {:<22} {:<10} {:<10} SUBJECT",
        "EMAIL ID", "DATE", "RISK", "URGENCY"
    );
    println!("{}", "-".repeat(110));
    for email in emails {
        println!(
            "{:<38} {:<22} {:<10} {:<10} {}",
            email.id,
            email.input.date.format("%Y-%m-%d %H:%M"),
            email.analysis.risk_level.as_str(),
            email.analysis.urgency.as_str(),
            email.input.subject
        );
    }
    Ok(())
}

async fn show_email(engine: &Engine<SqliteStore>, email_id: &str) -> Result<()> {
    let id = parse_uuid(email_id, "email ID")?;
    let email = engine
        .store()
        .get_email(id)
        .await?
        .with_context(|| format!("No email with ID {id}"))?;
    let alerts = engine.store().alerts_for_email(id).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "email": email,
            "alerts": alerts,
        }))?
    );
    Ok(())
}

async fn relink_email(
    engine: &Engine<SqliteStore>,
    email_id: &str,
    matter: Option<String>,
    client: Option<String>,
) -> Result<()> {
    let id = parse_uuid(email_id, "email ID")?;
    let matter_id = matter.map(|m| parse_uuid(&m, "matter ID")).transpose()?;
    let client_id = client.map(|c| parse_uuid(&c, "client ID")).transpose()?;

    let email = engine.relink(id, matter_id, client_id).await?;
    println!(
        "Relinked {} -> matter: {}, client: {}",
        email.id,
        email
            .matter_id
            .map_or_else(|| "none".to_string(), |m| m.to_string()),
        email
            .client_id
            .map_or_else(|| "none".to_string(), |c| c.to_string()),
    );
    Ok(())
}

async fn list_alerts(engine: &Engine<SqliteStore>, pending: bool) -> Result<()> {
    let alerts = engine.store().list_alerts(pending).await?;
    if alerts.is_empty() {
        println!("No alerts found");
        return Ok(());
    }

    println!(
        "{:<38} {:<20} {:<10} {:<6} MESSAGE",
        "ALERT ID", "TYPE", "PRIORITY", "ACK"
    );
    println!("{}", "-".repeat(110));
    for alert in alerts {
        println!(
            "{:<38} {:<20} {:<10} {:<6} {}",
            alert.id,
            alert.alert.kind,
            alert.alert.priority.as_str(),
            if alert.acknowledged { "yes" } else { "no" },
            alert.alert.message
        );
    }
    Ok(())
}

async fn acknowledge(
    engine: &Engine<SqliteStore>,
    alert_ids: Vec<String>,
    all: bool,
    by: &str,
) -> Result<()> {
    let ids: Vec<Uuid> = if all {
        engine
            .store()
            .list_alerts(true)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect()
    } else {
        if alert_ids.is_empty() {
            anyhow::bail!("No alert IDs given. Pass IDs or use --all");
        }
        alert_ids
            .iter()
            .map(|id| parse_uuid(id, "alert ID"))
            .collect::<Result<Vec<Uuid>>>()?
    };

    let changed = engine.store().acknowledge_alerts(&ids, by).await?;
    println!("Acknowledged {changed} alert(s)");
    Ok(())
}

async fn list_contacts(engine: &Engine<SqliteStore>) -> Result<()> {
    let contacts = engine.store().list_contacts().await?;
    if contacts.is_empty() {
        println!("No contacts found");
        return Ok(());
    }

    println!(
        "{:<32} {:<8} {:<8} {:<16} {:<8} SENTIMENT",
        "EMAIL", "EMAILS", "ALERTS", "RISK", "LAWYER"
    );
    println!("{}", "-".repeat(95));
    for contact in contacts {
        println!(
            "{:<32} {:<8} {:<8} {:<16} {:<8} {}",
            contact.email,
            contact.total_emails,
            contact.alert_count,
            contact.risk_assessment.as_str(),
            if contact.is_lawyer { "yes" } else { "no" },
            contact.dominant_sentiment
        );
    }
    Ok(())
}

async fn show_contact(engine: &Engine<SqliteStore>, email: &str) -> Result<()> {
    let contact = engine
        .store()
        .get_contact(email)
        .await?
        .with_context(|| format!("No contact with email {email}"))?;
    println!("{}", serde_json::to_string_pretty(&contact)?);
    Ok(())
}

async fn show_dashboard(engine: &Engine<SqliteStore>) -> Result<()> {
    let counts = engine.store().dashboard_counts().await?;
    println!("Total emails:     {}", counts.total_emails);
    println!("High-risk emails: {}", counts.high_risk_emails);
    println!("Pending alerts:   {}", counts.pending_alerts);
    println!("Sentiment histogram:");
    for (sentiment, count) in &counts.sentiment_histogram {
        println!("  {sentiment}: {count}");
    }
    Ok(())
}

async fn show_timeline(engine: &Engine<SqliteStore>, matter_id: &str) -> Result<()> {
    let id = parse_uuid(matter_id, "matter ID")?;
    let items = engine.store().matter_timeline(id).await?;
    if items.is_empty() {
        println!("No emails linked to matter {id}");
        return Ok(());
    }

    println!(
        "{:<22} {:<10} {:<7} {:<38} SUBJECT",
        "DATE", "RISK", "ALERTS", "EMAIL ID"
    );
    println!("{}", "-".repeat(110));
    for item in items {
        println!(
            "{:<22} {:<10} {:<7} {:<38} {}",
            item.date.format("%Y-%m-%d %H:%M"),
            item.risk_level.as_str(),
            if item.has_alerts { "yes" } else { "no" },
            item.email_id,
            item.subject
        );
    }
    Ok(())
}

async fn search_emails(engine: &Engine<SqliteStore>, query: &str) -> Result<()> {
    let emails = engine.store().search_emails(query).await?;
    if emails.is_empty() {
        println!("No emails matched '{query}'");
        return Ok(());
    }

    println!("{:<38} {:<30} SUBJECT", "EMAIL ID", "SENDER");
    println!("{}", "-".repeat(100));
    for email in emails {
        println!(
            "{:<38} {:<30} {}",
            email.id, email.input.sender_raw, email.input.subject
        );
    }
    Ok(())
}

async fn add_matter(
    engine: &Engine<SqliteStore>,
    case_number: &str,
    title: &str,
    client: &str,
) -> Result<()> {
    let client_id = parse_uuid(client, "client ID")?;
    let matter = MatterRecord {
        id: Uuid::new_v4(),
        case_number: case_number.to_string(),
        title: title.to_string(),
        client_id,
        created_at: chrono::Utc::now(),
    };
    engine.store().insert_matter(&matter).await?;
    println!("Registered matter {} ({})", matter.id, matter.case_number);
    Ok(())
}

async fn list_matters(engine: &Engine<SqliteStore>) -> Result<()> {
    let matters = engine.store().list_matters().await?;
    if matters.is_empty() {
        println!("No matters found");
        return Ok(());
    }

    println!("{:<38} {:<18} TITLE", "MATTER ID", "CASE NUMBER");
    println!("{}", "-".repeat(90));
    for matter in matters {
        println!("{:<38} {:<18} {}", matter.id, matter.case_number, matter.title);
    }
    Ok(())
}

async fn add_client(engine: &Engine<SqliteStore>, name: &str, email: &str) -> Result<()> {
    let client = ClientRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_lowercase(),
        created_at: chrono::Utc::now(),
    };
    engine.store().insert_client(&client).await?;
    println!("Registered client {} ({})", client.id, client.email);
    Ok(())
}

async fn list_clients(engine: &Engine<SqliteStore>) -> Result<()> {
    let clients = engine.store().list_clients().await?;
    if clients.is_empty() {
        println!("No clients found");
        return Ok(());
    }

    println!("{:<38} {:<32} NAME", "CLIENT ID", "EMAIL");
    println!("{}", "-".repeat(100));
    for client in clients {
        println!("{:<38} {:<32} {}", client.id, client.email, client.name);
    }
    Ok(())
}
