//! Queue message schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Rejection reasons for inbound queue payloads.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid message: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Message popped from the packaging queue.
///
/// Produced by an external scheduler when a transcoding job finishes.
/// Immutable once dequeued; `url` points at the full job description.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    /// Encode job id
    #[validate(length(min = 1, message = "jobId must not be empty"))]
    pub job_id: String,
    /// URL to the encode job description
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
}

impl QueueMessage {
    /// Parse and validate a raw queue payload.
    ///
    /// The manual retry endpoint and the broker path share this validation.
    pub fn parse(payload: &str) -> Result<Self, MessageError> {
        let message: QueueMessage = serde_json::from_str(payload)?;
        message.validate()?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_message() {
        let message =
            QueueMessage::parse(r#"{"jobId":"abc","url":"http://encoder.local/jobs/abc"}"#)
                .unwrap();
        assert_eq!(message.job_id, "abc");
        assert_eq!(message.url, "http://encoder.local/jobs/abc");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            QueueMessage::parse("not json"),
            Err(MessageError::Json(_))
        ));
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(matches!(
            QueueMessage::parse(r#"{"jobId":"abc"}"#),
            Err(MessageError::Json(_))
        ));
    }

    #[test]
    fn rejects_empty_job_id() {
        let err =
            QueueMessage::parse(r#"{"jobId":"","url":"http://encoder.local/j"}"#).unwrap_err();
        assert!(matches!(err, MessageError::Validation(_)));
        assert!(err.to_string().starts_with("invalid message:"));
    }

    #[test]
    fn rejects_non_url() {
        assert!(matches!(
            QueueMessage::parse(r#"{"jobId":"abc","url":"not a url"}"#),
            Err(MessageError::Validation(_))
        ));
    }
}
