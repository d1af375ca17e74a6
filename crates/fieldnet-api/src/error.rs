use thiserror::Error;

/// Collapsed classification of an [`Error`].
///
/// Callers branch on the kind rather than on individual variants: the
/// variants carry diagnostic detail, the kind carries the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The device rejected the login.
    Login,
    /// The login call did not answer in time.
    LoginTimeout,
    /// No session, or the device no longer honours the session token.
    Unauthorized,
    /// HTTP >= 400, nonzero ubus result code, connection failure or an
    /// unreadable response body.
    Request,
    /// A non-login call did not answer in time.
    RequestTimeout,
    /// The operation was refused locally before any call was issued.
    InvalidArgument,
}

/// Top-level error type for the `fieldnet-api` crate.
///
/// Covers every failure mode of the ubus surface: authentication,
/// transport, protocol result codes and local argument validation.
/// `fieldnet-core` maps these into operator-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (bad credentials, nonzero result, missing token).
    #[error("Login failed: {message}")]
    Login { message: String },

    /// Login did not complete within the per-call timeout.
    #[error("Login timed out after {timeout_secs}s")]
    LoginTimeout { timeout_secs: u64 },

    /// No session held, or the device reported the session as invalid.
    /// `status` is set only when the device answered with an HTTP 401.
    #[error("Unauthorized ubus request -- login required")]
    Unauthorized { status: Option<u16> },

    // ── Request ─────────────────────────────────────────────────────
    /// Device answered with an HTTP error status other than 401.
    #[error("Request failed with HTTP status {status}")]
    Status { status: u16 },

    /// Device answered with a nonzero ubus result code.
    #[error("ubus call returned error code {code}")]
    Rpc { code: i64 },

    /// Connection could not be established or was reset.
    #[error("Connection to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A non-login call did not complete within the per-call timeout.
    #[error("Request timed out after {timeout_secs}s")]
    RequestTimeout { timeout_secs: u64 },

    /// Response body was not a ubus envelope.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Arguments ───────────────────────────────────────────────────
    /// VLAN id outside the six fixed station VLANs.
    #[error("Invalid VLAN id {vlan}: expected one of 10, 20, 30, 40, 50, 60")]
    InvalidVlan { vlan: u16 },

    /// Team number that cannot be mapped onto a `10.x.y.4` address.
    #[error("Invalid team id {team_id}: cannot derive a station address")]
    InvalidTeam { team_id: u32 },

    /// Station index outside `0..6`.
    #[error("Invalid station index {index}")]
    InvalidStation { index: usize },

    // ── Setup ───────────────────────────────────────────────────────
    /// Device host could not be turned into an endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl Error {
    /// Classify this error into the closed [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Login { .. } => ErrorKind::Login,
            Self::LoginTimeout { .. } => ErrorKind::LoginTimeout,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Status { .. }
            | Self::Rpc { .. }
            | Self::Connection { .. }
            | Self::Deserialization { .. }
            | Self::Client(_) => ErrorKind::Request,
            Self::RequestTimeout { .. } => ErrorKind::RequestTimeout,
            Self::InvalidVlan { .. }
            | Self::InvalidTeam { .. }
            | Self::InvalidStation { .. }
            | Self::InvalidUrl(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Returns `true` if this error indicates the session is gone
    /// and a fresh login might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::LoginTimeout { .. } | Self::RequestTimeout { .. } | Self::Connection { .. }
        )
    }

    /// The ubus result code, if the device produced one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code } => Some(*code),
            _ => None,
        }
    }

    /// The HTTP status, if the device answered with an error status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Unauthorized { status } => *status,
            _ => None,
        }
    }
}
