//! Error taxonomy for a pipeline session.
//!
//! Every variant is terminal for the session it occurs in; nothing is retried
//! automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Message surfaced when the event stream dies before a terminal event.
pub const CONNECTION_LOST: &str = "Connection lost";

/// Fallback message when an upload fails without a `detail` body.
pub const UPLOAD_FAILED: &str = "Upload failed";

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The artifact is not a CV document. Never reaches the network.
    #[error("Only CV files are accepted (PDF, DOC, DOCX): {0}")]
    Validation(String),

    /// Artifact submission failed; no session was created.
    #[error("{0}")]
    Upload(String),

    /// The stream transport died before a terminal event.
    #[error("{}", CONNECTION_LOST)]
    StreamConnection,

    /// The server reported a failure for the run.
    #[error("{0}")]
    Pipeline(String),

    /// Events arrived in an order the workflow cannot accept.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Polling the session status endpoint failed.
    #[error("Status request failed: {0}")]
    Status(String),

    #[error("Failed to read artifact at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{operation} is not supported by the {source_kind} source")]
    Unsupported {
        operation: &'static str,
        source_kind: &'static str,
    },

    #[error("No active pipeline session")]
    NoActiveSession,
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_messages() {
        assert_eq!(WorkflowError::StreamConnection.to_string(), CONNECTION_LOST);
        assert_eq!(WorkflowError::Pipeline("timeout".to_string()).to_string(), "timeout");
        assert_eq!(
            WorkflowError::Protocol("duplicate pipeline_start".to_string()).to_string(),
            "Protocol error: duplicate pipeline_start"
        );
    }
}
