// ── Core error types ──
//
// Operator-facing errors from fieldnet-core. Callers never match on raw
// ubus result codes; the `From<fieldnet_api::Error>` impl folds protocol
// failures into these variants while keeping the code and HTTP status
// around for diagnostics.

use fieldnet_api::ErrorKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired or missing -- login required")]
    SessionExpired { status: Option<u16> },

    #[error("Device did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64, during_login: bool },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Device rejected request: {message}")]
    Rejected {
        message: String,
        /// ubus or JSON-RPC result code, when the device sent one.
        code: Option<i64>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Device accepted the change but did not apply it: {message}")]
    NotApplied { message: String },

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<CoreError>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Classification shared with `fieldnet-api`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed { .. } => ErrorKind::Login,
            Self::Timeout {
                during_login: true, ..
            } => ErrorKind::LoginTimeout,
            Self::Timeout { .. } => ErrorKind::RequestTimeout,
            Self::SessionExpired { .. } => ErrorKind::Unauthorized,
            Self::ConnectionFailed { .. } | Self::Rejected { .. } | Self::NotApplied { .. } => {
                ErrorKind::Request
            }
            Self::ValidationFailed { .. } | Self::Config { .. } => ErrorKind::InvalidArgument,
            Self::RetriesExhausted { last, .. } => last.kind(),
        }
    }

    /// Returns `true` when running the same operation again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::NotApplied { .. }
        )
    }

    /// The device's result code, if the failure carried one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rejected { code, .. } => *code,
            Self::RetriesExhausted { last, .. } => last.code(),
            _ => None,
        }
    }

    /// HTTP status, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::SessionExpired { status } => *status,
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

// ── Conversion from protocol-layer errors ────────────────────────────

impl From<fieldnet_api::Error> for CoreError {
    fn from(err: fieldnet_api::Error) -> Self {
        use fieldnet_api::Error as Api;

        match err {
            Api::Login { message } => CoreError::AuthenticationFailed { message },
            Api::LoginTimeout { timeout_secs } => CoreError::Timeout {
                timeout_secs,
                during_login: true,
            },
            Api::Unauthorized { status } => CoreError::SessionExpired { status },
            Api::Status { status } => CoreError::Rejected {
                message: format!("HTTP {status}"),
                code: None,
                status: Some(status),
            },
            Api::Rpc { code } => CoreError::Rejected {
                message: format!("ubus error code {code}"),
                code: Some(code),
                status: None,
            },
            Api::Connection { url, source } => CoreError::ConnectionFailed {
                url,
                reason: source.to_string(),
            },
            Api::RequestTimeout { timeout_secs } => CoreError::Timeout {
                timeout_secs,
                during_login: false,
            },
            Api::Deserialization { message, .. } => CoreError::Rejected {
                message: format!("unreadable response: {message}"),
                code: None,
                status: None,
            },
            err @ (Api::InvalidVlan { .. } | Api::InvalidTeam { .. } | Api::InvalidStation { .. }) => {
                CoreError::ValidationFailed {
                    message: err.to_string(),
                }
            }
            err @ (Api::InvalidUrl(_) | Api::Client(_)) => CoreError::Config {
                message: err.to_string(),
            },
        }
    }
}
