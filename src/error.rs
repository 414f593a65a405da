//! Error taxonomy for the intelligence engine.
//!
//! Parse degradation (unparseable dates, malformed raw messages) is
//! deliberately NOT represented here: untrusted inbound mail degrades to
//! best-effort defaults with recorded warnings instead of failing. See
//! [`crate::ingest::RawParse`].

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to callers of the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Validation failure: nothing is persisted.
    #[error("subject and body are both empty")]
    EmptyMessage,

    /// Raw upload rejected before reaching the pipeline.
    #[error("raw message is {actual} bytes, limit is {limit}")]
    MessageTooLarge { actual: usize, limit: usize },

    /// Raw upload rejected before reaching the pipeline.
    #[error("unsupported upload content type: {0}")]
    UnsupportedContentType(String),

    #[error("email not found: {0}")]
    EmailNotFound(Uuid),

    /// Manual re-link target does not exist; no partial state change.
    #[error("matter not found: {0}")]
    MatterNotFound(Uuid),

    /// Manual re-link target does not exist; no partial state change.
    #[error("client not found: {0}")]
    ClientNotFound(Uuid),

    /// Storage write/read failure after analysis succeeded.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether the error is the caller's fault (vs. a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyMessage
                | Self::MessageTooLarge { .. }
                | Self::UnsupportedContentType(_)
                | Self::EmailNotFound(_)
                | Self::MatterNotFound(_)
                | Self::ClientNotFound(_)
        )
    }
}
