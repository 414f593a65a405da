//! Data structures for the intelligence pipeline.

pub mod analysis;
pub mod contact;
pub mod message;
pub mod record;

pub use analysis::{
    AdminAlert, AlertPriority, Deadline, DeceptionFlag, EmailAnalysis, ManipulationRisk,
    PsychologicalProfile, RiskLevel, Urgency,
};
pub use contact::{ContactProfile, ContactRisk, TimelineEntry, TIMELINE_CAP};
pub use message::{AnalysisInput, Direction, SenderAddress};
pub use record::{AdminAlertRecord, AnalyzedEmail};
