//! lexmail - Deterministic email intelligence engine
//!
//! Analyzes inbound/outbound legal correspondence through a fixed
//! nine-stage pipeline: normalize, parse the sender address, extract
//! structured facts (deadlines, case numbers, money amounts), score
//! independent signals (urgency, sentiment, deception), derive a
//! psychological profile, aggregate risk, evaluate operator alert rules,
//! auto-link to a matter, and fold the result into a bounded per-sender
//! behavior history.
//!
//! # Architecture
//!
//! - Stages 1-7 are pure functions over an in-memory record: identical
//!   `(subject, body, sender domain)` input always yields an identical
//!   `EmailAnalysis`.
//! - All keyword tables are declarative YAML loaded at startup (see
//!   [`Taxonomy`]), never inline literals.
//! - Storage and the case registry sit behind traits so the engine is
//!   testable against an in-memory fake.
//! - Per-sender contact updates are serialized with a per-key mutex to
//!   rule out lost timeline entries under concurrent ingestion.
//!
//! # Modules
//!
//! - `ingest`: message normalization and sender address parsing
//! - `analysis`: the pure scoring/extraction pipeline
//! - `link`: matter/client auto-linking against the case registry
//! - `domain`: data structures (input, analysis, contact profile)
//! - `store`: SQLite persistence and the in-memory test store
//! - `engine`: the end-to-end ingestion entry point
//! - `cli`: command-line interface

pub mod analysis;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod link;
pub mod store;

// Re-export main types at crate root for convenience
pub use config::Taxonomy;
pub use domain::{
    AdminAlert, AdminAlertRecord, AnalysisInput, AnalyzedEmail, ContactProfile, Direction,
    EmailAnalysis, RiskLevel, Urgency,
};
pub use engine::{Engine, IngestReport};
pub use error::EngineError;
pub use ingest::{IngestRequest, RawParse};
pub use link::{CaseRegistry, ClientRecord, LinkOutcome, MatterRecord};
pub use store::{EmailStore, MemoryStore, SqliteStore};
