//! Error taxonomy for one poll cycle.
//!
//! Every failure raised while fetching, validating, extracting or
//! delivering carries an [`ErrorKind`]. The loop only looks at the kind:
//! configuration errors are fatal at startup, everything else is logged
//! and retried after the fixed period.

use thiserror::Error;

/// Longest response body kept inside a [`PollError::HttpStatus`].
pub const MAX_BODY_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed secret. Never retried.
    Configuration,
    /// Connection refused, DNS failure, timeout.
    Transport,
    /// Non-200 status or an undecodable 200 body.
    Protocol,
    /// Response shape does not match the expected record.
    Schema,
    /// Well-formed record with a status we do not know.
    Domain,
    /// The messaging side rejected or dropped the message.
    Delivery,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("missing required environment variable {0}")]
    MissingConfig(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidConfig { var: &'static str, reason: String },

    #[error("status endpoint unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("status endpoint answered {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("status endpoint returned a body that is not JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0} is not a mapping")]
    NotAMapping(&'static str),

    #[error("key {0} is missing from the API response")]
    MissingKey(&'static str),

    #[error("value of {0} is not a list")]
    NotASequence(&'static str),

    #[error("field {field} has an unexpected shape: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("homeworks list is empty")]
    EmptyHomeworks,

    #[error("unexpected homework status: {0:?}")]
    UnexpectedStatus(String),

    #[error("message delivery failed: {0}")]
    Delivery(String),
}

impl PollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingConfig(_) | Self::InvalidConfig { .. } => ErrorKind::Configuration,
            Self::Transport(_) => ErrorKind::Transport,
            Self::HttpStatus { .. } | Self::Decode(_) => ErrorKind::Protocol,
            Self::NotAMapping(_)
            | Self::MissingKey(_)
            | Self::NotASequence(_)
            | Self::InvalidField { .. }
            | Self::EmptyHomeworks => ErrorKind::Schema,
            Self::UnexpectedStatus(_) => ErrorKind::Domain,
            Self::Delivery(_) => ErrorKind::Delivery,
        }
    }

    /// Only configuration problems stop the process.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Build a protocol error from a non-200 reply, truncating the body.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self::HttpStatus {
            status,
            body: body.chars().take(MAX_BODY_CHARS).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(PollError::MissingConfig("TELEGRAM_TOKEN").is_fatal());
        let invalid = PollError::InvalidConfig { var: "TELEGRAM_CHAT_ID", reason: "x".into() };
        assert!(invalid.is_fatal());
        assert!(!PollError::http_status(500, "").is_fatal());
        assert!(!PollError::EmptyHomeworks.is_fatal());
        assert!(!PollError::UnexpectedStatus("done".into()).is_fatal());
        assert!(!PollError::Delivery("chat not found".into()).is_fatal());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(PollError::http_status(404, "nope").kind(), ErrorKind::Protocol);
        assert_eq!(PollError::MissingKey("homeworks").kind(), ErrorKind::Schema);
        assert_eq!(PollError::NotAMapping("response").kind(), ErrorKind::Schema);
        assert_eq!(PollError::NotASequence("homeworks").kind(), ErrorKind::Schema);
        assert_eq!(PollError::UnexpectedStatus("".into()).kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_http_status_truncates_body() {
        let body = "x".repeat(MAX_BODY_CHARS * 2);
        match PollError::http_status(503, &body) {
            PollError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body.len(), MAX_BODY_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
