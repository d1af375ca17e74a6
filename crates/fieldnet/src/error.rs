//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fieldnet_config::ConfigError;
use fieldnet_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const DEVICE: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(fieldnet::connection_failed),
        help(
            "Check that the device is powered and reachable from this host.\n\
             Override the address with --host."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Device did not answer within {seconds}s")]
    #[diagnostic(
        code(fieldnet::timeout),
        help("Increase the timeout with --timeout or check the device's load.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fieldnet::auth_failed),
        help(
            "Verify the device password.\n\
             Run: fieldnet config set-password <switch|access-point>"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for [{section}]")]
    #[diagnostic(
        code(fieldnet::no_credentials),
        help(
            "Store one with: fieldnet config set-password\n\
             Or set password_env in the [{section}] section of the config file."
        )
    )]
    NoCredentials { section: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device error: {message}")]
    #[diagnostic(
        code(fieldnet::device_error),
        help("Staged changes may be partly applied; run the command again.")
    )]
    Device { message: String, code: Option<i64> },

    #[error("{message}")]
    #[diagnostic(
        code(fieldnet::not_applied),
        help("The radios did not pick up the new SSIDs. Retry or check the access point.")
    )]
    NotApplied { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fieldnet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(fieldnet::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(fieldnet::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Device { .. } | Self::NotApplied { .. } => exit_code::DEVICE,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::SessionExpired { .. } => CliError::AuthFailed {
                message: "the device dropped the session".into(),
            },

            CoreError::Timeout { timeout_secs, .. } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Rejected { message, code, .. } => CliError::Device { message, code },

            CoreError::NotApplied { message } => CliError::NotApplied { message },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "host".into(),
                reason: message,
            },

            CoreError::RetriesExhausted { last, .. } => CliError::from(*last),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { section } => CliError::NoCredentials { section },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Serialization(err) => CliError::Validation {
                field: "config".into(),
                reason: err.to_string(),
            },
            ConfigError::Io(err) => CliError::Io(err),
        }
    }
}
