//! Message ingestion: structured submissions and raw message uploads.
//!
//! Structured submissions arrive as JSON; raw uploads are size- and
//! content-type-gated before they reach the pipeline.

pub mod address;
pub mod normalizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisInput, Direction};
use crate::error::EngineError;

pub use address::parse_sender;
pub use normalizer::{parse_raw_message, strip_markup, RawParse};

/// Upload size limit for raw messages.
pub const MAX_RAW_MESSAGE_BYTES: usize = 25 * 1024 * 1024;

/// Content types accepted for raw message uploads.
const ACCEPTED_CONTENT_TYPES: &[&str] = &["message/rfc822", "text/plain"];

/// One structured ingestion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub body: String,

    pub sender: String,

    #[serde(default)]
    pub direction: Direction,

    /// Either an array or a comma-separated string
    #[serde(default)]
    pub recipients: Recipients,

    #[serde(default)]
    pub cc: Vec<String>,

    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// `recipients` accepts both JSON shapes: a list, or one comma-separated
/// string that gets split and trimmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    List(Vec<String>),
    Joined(String),
}

impl Default for Recipients {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Recipients {
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::List(list) => list,
            Self::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl IngestRequest {
    /// Normalize the structured submission into the canonical input.
    pub fn into_input(self) -> AnalysisInput {
        AnalysisInput {
            subject: self.subject,
            body: self.body,
            sender_raw: self.sender,
            recipients: self.recipients.into_list(),
            cc: self.cc,
            direction: self.direction,
            date: self.date.unwrap_or_else(Utc::now),
        }
    }
}

/// Gate a raw message upload before it reaches the pipeline: the content
/// type must be a raw-message or plain-text mimetype and the payload must
/// fit the size limit.
pub fn validate_raw_upload(content_type: &str, size: usize) -> Result<(), EngineError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase();
    if !ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
        return Err(EngineError::UnsupportedContentType(content_type.to_string()));
    }
    if size > MAX_RAW_MESSAGE_BYTES {
        return Err(EngineError::MessageTooLarge {
            actual: size,
            limit: MAX_RAW_MESSAGE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_string_is_split_and_trimmed() {
        let recipients = Recipients::Joined("a@b.com , c@d.com,,".to_string());
        assert_eq!(recipients.into_list(), vec!["a@b.com", "c@d.com"]);
    }

    #[test]
    fn request_deserializes_both_recipient_shapes() {
        let from_list: IngestRequest =
            serde_json::from_str(r#"{"sender":"a@b.com","recipients":["x@y.com"]}"#).unwrap();
        assert_eq!(from_list.recipients.into_list(), vec!["x@y.com"]);

        let from_string: IngestRequest =
            serde_json::from_str(r#"{"sender":"a@b.com","recipients":"x@y.com, z@w.com"}"#)
                .unwrap();
        assert_eq!(from_string.recipients.into_list(), vec!["x@y.com", "z@w.com"]);
    }

    #[test]
    fn upload_gate_rejects_wrong_type_and_oversize() {
        assert!(validate_raw_upload("message/rfc822", 1024).is_ok());
        assert!(validate_raw_upload("text/plain; charset=utf-8", 1024).is_ok());
        assert!(matches!(
            validate_raw_upload("application/pdf", 1024),
            Err(EngineError::UnsupportedContentType(_))
        ));
        assert!(matches!(
            validate_raw_upload("text/plain", MAX_RAW_MESSAGE_BYTES + 1),
            Err(EngineError::MessageTooLarge { .. })
        ));
    }
}
