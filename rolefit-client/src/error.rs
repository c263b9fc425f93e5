//! Error model shared by the transport and every resource module.
//!
//! Two families matter to callers:
//! - [`ApiError::Transport`]: no response was received (DNS, refused, timeout)
//! - [`ApiError::Status`]: the backend answered with a non-2xx status
//!
//! Everything else is local (decoding, session storage, file access).

use reqwest::StatusCode;
use thiserror::Error;

/// Longest backend body excerpt kept in an error message.
pub const BODY_PREVIEW_LIMIT: usize = 256;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was received.
    #[error("connection to backend failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A 2xx body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be assembled (query or body serialization).
    #[error("could not build request: {0}")]
    Build(#[source] reqwest::Error),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("session storage failed: {0}")]
    Session(#[from] SessionError),

    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Status code of a backend failure, `None` for everything else.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-provided message, when the failure came from the backend.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// Build a status error from a raw error body.
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        ApiError::Status {
            status,
            message: extract_message(status, body),
        }
    }
}

/// Failures of the persisted token store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not locate a configuration directory")]
    NoConfigDir,

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("session file could not be written: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Pull a human-readable message out of a backend error body.
///
/// FastAPI answers `{"detail": "..."}` for raised HTTP errors and
/// `{"detail": [{"msg": "...", ...}]}` for validation failures; a few
/// handlers answer `{"message": "..."}` instead.
fn extract_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status.canonical_reason().unwrap_or("unknown error").to_string();
    }
    preview(text)
}

fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LIMIT {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, br#"{"detail":"Device not found"}"#);
        assert_eq!(err.backend_message(), Some("Device not found"));
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_validation_detail_list() {
        let body = br#"{"detail":[{"loc":["body","mac_address"],"msg":"field required"},{"msg":"bad value"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.backend_message(), Some("field required; bad value"));
    }

    #[test]
    fn test_message_field() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, br#"{"message":"boom"}"#);
        assert_eq!(err.backend_message(), Some("boom"));
        assert!(err.is_server_error());
    }

    #[test]
    fn test_empty_body_uses_reason() {
        let err = ApiError::from_status(StatusCode::CONFLICT, b"");
        assert_eq!(err.backend_message(), Some("Conflict"));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_plain_body_is_truncated() {
        let body = "é".repeat(300);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, body.as_bytes());
        let message = err.backend_message().unwrap();
        assert!(message.ends_with('…'));
        assert!(message.len() <= BODY_PREVIEW_LIMIT + '…'.len_utf8());
    }

    #[test]
    fn test_local_errors_have_no_status() {
        let err = ApiError::InvalidUrl { url: "::".into(), reason: "bad".into() };
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
        assert!(!err.is_connectivity());
    }
}
