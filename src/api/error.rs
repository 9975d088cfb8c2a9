//! Error taxonomy for Microsoft Graph calls
//!
//! Failures are classified where they happen (token endpoint, Graph response,
//! transport) so callers never have to inspect error text. `ErrorCategory`
//! turns a failure into operator guidance through a fixed lookup table.

use serde_json::Value;
use thiserror::Error;

/// Result alias used across the Graph layer
pub type GraphResult<T> = Result<T, GraphError>;

/// Remote error code Graph uses when two writes race on the same object
pub const CONCURRENCY_VIOLATION: &str = "ConcurrencyViolation";

/// Remote error code Graph uses when the application lacks a permission
pub const REQUEST_DENIED: &str = "Authorization_RequestDenied";

/// Why the identity provider refused to issue a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// Client secret is wrong or has expired
    InvalidSecret,
    /// Application (client) ID is not registered in the directory
    UnknownApplication,
    /// Directory (tenant) ID does not exist
    TenantNotFound,
    /// Any other refusal
    Rejected,
}

impl AuthFailureKind {
    /// Classify an `AADSTS` error code returned by the token endpoint
    pub fn from_aadsts_code(code: u64) -> Self {
        match code {
            7000215 | 7000222 => AuthFailureKind::InvalidSecret,
            700016 => AuthFailureKind::UnknownApplication,
            90002 | 900023 => AuthFailureKind::TenantNotFound,
            _ => AuthFailureKind::Rejected,
        }
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    /// The identity provider rejected the tenant credentials
    #[error("Authentication failed ({kind:?}): {description}")]
    Authentication {
        kind: AuthFailureKind,
        description: String,
    },

    /// No remote resource matched the lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// Graph answered with a non-success status
    #[error("Graph API error: {status} - {body}")]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
        body: Value,
    },

    /// Graph answered with success but the body lacked an expected field
    #[error("Unexpected Graph response: {0}")]
    UnexpectedResponse(String),

    /// Network failure or timeout before a response arrived
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GraphError {
    /// Build an `Api` error from a status and whatever body came back.
    /// Graph wraps failures as `{"error": {"code": ..., "message": ...}}`.
    pub fn from_response(status: u16, body: Value) -> Self {
        let error = body.get("error");
        let code = error
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string());
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(|s| s.to_string());

        GraphError::Api {
            status,
            code,
            message,
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for the conflict class of failures: HTTP 409 or a concurrency
    /// violation reported by the directory service.
    pub fn is_conflict(&self) -> bool {
        match self {
            GraphError::Api { status, code, .. } => {
                *status == 409 || code.as_deref() == Some(CONCURRENCY_VIOLATION)
            }
            _ => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GraphError::Authentication { kind, .. } => match kind {
                AuthFailureKind::InvalidSecret => ErrorCategory::InvalidSecret,
                AuthFailureKind::UnknownApplication => ErrorCategory::UnknownApplication,
                AuthFailureKind::TenantNotFound => ErrorCategory::TenantNotFound,
                AuthFailureKind::Rejected => ErrorCategory::AuthenticationRejected,
            },
            GraphError::NotFound(_) => ErrorCategory::NotFound,
            GraphError::Api { status, code, .. } => {
                if code.as_deref() == Some(REQUEST_DENIED) {
                    return ErrorCategory::InsufficientPrivileges;
                }
                if self.is_conflict() {
                    return ErrorCategory::Conflict;
                }
                match status {
                    401 => ErrorCategory::AuthenticationRejected,
                    403 => ErrorCategory::InsufficientPrivileges,
                    404 => ErrorCategory::NotFound,
                    429 => ErrorCategory::Throttled,
                    _ => ErrorCategory::Remote,
                }
            }
            GraphError::UnexpectedResponse(_) => ErrorCategory::Remote,
            GraphError::Transport(e) if e.is_timeout() => ErrorCategory::Timeout,
            GraphError::Transport(_) => ErrorCategory::Network,
            GraphError::Json(_) | GraphError::Config(_) => ErrorCategory::Local,
        }
    }
}

/// Operator-facing failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidSecret,
    UnknownApplication,
    TenantNotFound,
    AuthenticationRejected,
    InsufficientPrivileges,
    NotFound,
    Conflict,
    Throttled,
    Timeout,
    Network,
    Remote,
    Local,
}

impl ErrorCategory {
    /// What the operator should do about it
    pub fn guidance(self) -> &'static str {
        match self {
            ErrorCategory::InvalidSecret => {
                "The client secret is invalid or has expired. Update the tenant credentials."
            }
            ErrorCategory::UnknownApplication => {
                "The application (client) ID does not exist or is not registered in this tenant."
            }
            ErrorCategory::TenantNotFound => {
                "The directory (tenant) ID is invalid or the tenant does not exist."
            }
            ErrorCategory::AuthenticationRejected => {
                "Authentication failed. Check the tenant credentials."
            }
            ErrorCategory::InsufficientPrivileges => {
                "Insufficient privileges. Grant the required application permissions and admin consent."
            }
            ErrorCategory::NotFound => "The requested resource was not found.",
            ErrorCategory::Conflict => {
                "The directory reported a concurrent change. Retry the operation shortly."
            }
            ErrorCategory::Throttled => "Microsoft Graph is throttling requests. Retry later.",
            ErrorCategory::Timeout => {
                "The request timed out. Check the network connection or retry later."
            }
            ErrorCategory::Network => {
                "Could not reach Microsoft Graph. Check the network connection."
            }
            ErrorCategory::Remote => "Microsoft Graph rejected the request.",
            ErrorCategory::Local => "The request could not be prepared or the response could not be read.",
        }
    }

    /// Status a presentation layer should answer with
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCategory::InvalidSecret
            | ErrorCategory::UnknownApplication
            | ErrorCategory::AuthenticationRejected => 401,
            ErrorCategory::InsufficientPrivileges => 403,
            ErrorCategory::TenantNotFound | ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Throttled => 429,
            ErrorCategory::Network => 503,
            ErrorCategory::Timeout => 504,
            ErrorCategory::Remote | ErrorCategory::Local => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aadsts_classification() {
        assert_eq!(AuthFailureKind::from_aadsts_code(7000215), AuthFailureKind::InvalidSecret);
        assert_eq!(AuthFailureKind::from_aadsts_code(7000222), AuthFailureKind::InvalidSecret);
        assert_eq!(AuthFailureKind::from_aadsts_code(700016), AuthFailureKind::UnknownApplication);
        assert_eq!(AuthFailureKind::from_aadsts_code(90002), AuthFailureKind::TenantNotFound);
        assert_eq!(AuthFailureKind::from_aadsts_code(50034), AuthFailureKind::Rejected);
    }

    #[test]
    fn test_from_response_extracts_code() {
        let err = GraphError::from_response(
            400,
            json!({"error": {"code": "Request_BadRequest", "message": "bad"}}),
        );
        match err {
            GraphError::Api { status, code, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("Request_BadRequest"));
                assert_eq!(message.as_deref(), Some("bad"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conflict_detection() {
        assert!(GraphError::from_response(409, json!({})).is_conflict());
        assert!(
            GraphError::from_response(400, json!({"error": {"code": CONCURRENCY_VIOLATION}}))
                .is_conflict()
        );
        assert!(!GraphError::from_response(400, json!({})).is_conflict());
        assert!(!GraphError::NotFound("app".into()).is_conflict());
    }

    #[test]
    fn test_category_table() {
        let denied = GraphError::from_response(403, json!({"error": {"code": REQUEST_DENIED}}));
        assert_eq!(denied.category(), ErrorCategory::InsufficientPrivileges);
        assert_eq!(denied.category().http_status(), 403);

        let auth = GraphError::Authentication {
            kind: AuthFailureKind::TenantNotFound,
            description: "AADSTS90002".into(),
        };
        assert_eq!(auth.category(), ErrorCategory::TenantNotFound);
        assert_eq!(auth.category().http_status(), 404);

        assert_eq!(
            GraphError::from_response(429, Value::Null).category(),
            ErrorCategory::Throttled
        );
        assert_eq!(
            GraphError::from_response(500, Value::Null).category().http_status(),
            500
        );
    }
}
