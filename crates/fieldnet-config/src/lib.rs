//! Configuration for the fieldnet tools.
//!
//! TOML file, `FIELDNET_*` environment overrides, credential resolution
//! (env + keyring + plaintext) and translation to the runtime
//! `fieldnet_core` device configs. The CLI layers its flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fieldnet_core::{AccessPointConfig, Credentials, DeviceConfig, RetryPolicy, SwitchConfig};

/// Keyring service name; entries are `<section>/password`.
pub const KEYRING_SERVICE: &str = "fieldnet";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for [{section}]")]
    NoCredentials { section: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub switch: SwitchSection,

    #[serde(default)]
    pub access_point: AccessPointSection,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_username() -> String {
    "root".into()
}

/// `[switch]`
#[derive(Debug, Deserialize, Serialize)]
pub struct SwitchSection {
    /// Switch address (e.g. "10.0.100.2").
    pub host: Option<String>,

    #[serde(default = "default_username")]
    pub username: String,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override `defaults.timeout`.
    pub timeout: Option<u64>,

    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Total attempts per configuration run.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_switch_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for SwitchSection {
    fn default() -> Self {
        Self {
            host: None,
            username: default_username(),
            password: None,
            password_env: None,
            timeout: None,
            settle_secs: default_settle_secs(),
            backoff_secs: default_backoff_secs(),
            attempts: default_attempts(),
            retry_delay_secs: default_switch_retry_delay(),
        }
    }
}

fn default_settle_secs() -> u64 {
    2
}
fn default_backoff_secs() -> u64 {
    5
}
fn default_attempts() -> u32 {
    1
}
fn default_switch_retry_delay() -> u64 {
    5
}

/// `[access_point]`
#[derive(Debug, Deserialize, Serialize)]
pub struct AccessPointSection {
    /// Access point address (e.g. "10.0.100.3").
    pub host: Option<String>,

    #[serde(default = "default_username")]
    pub username: String,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override `defaults.timeout`.
    pub timeout: Option<u64>,

    /// UCI section of the station radio.
    #[serde(default = "default_radio")]
    pub radio: String,

    #[serde(default = "default_channel")]
    pub channel: u32,

    /// Team wifi is only managed when this is on.
    #[serde(default)]
    pub network_security_enabled: bool,

    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_ap_retry_delay")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_verify_delay")]
    pub verify_delay_secs: u64,
}

impl Default for AccessPointSection {
    fn default() -> Self {
        Self {
            host: None,
            username: default_username(),
            password: None,
            password_env: None,
            timeout: None,
            radio: default_radio(),
            channel: default_channel(),
            network_security_enabled: false,
            attempts: default_attempts(),
            retry_delay_secs: default_ap_retry_delay(),
            verify_delay_secs: default_verify_delay(),
        }
    }
}

fn default_radio() -> String {
    "radio2".into()
}
fn default_channel() -> u32 {
    36
}
fn default_ap_retry_delay() -> u64 {
    30
}
fn default_verify_delay() -> u64 {
    3
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "fieldnet", "fieldnet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fieldnet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
///
/// Environment keys are `FIELDNET_<SECTION>__<KEY>`, e.g.
/// `FIELDNET_SWITCH__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FIELDNET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a device password: `password_env` → system keyring →
/// plaintext in config.
pub fn resolve_password(
    section: &str,
    password_env: Option<&str>,
    plaintext: Option<&str>,
) -> Result<SecretString, ConfigError> {
    // 1. Section's password_env → env var lookup
    if let Some(env_name) = password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{section}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(pw) = plaintext {
        return Ok(SecretString::from(pw.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        section: section.into(),
    })
}

fn require_host(section: &str, host: Option<&str>) -> Result<String, ConfigError> {
    match host {
        Some(host) if !host.trim().is_empty() => Ok(host.trim().to_owned()),
        _ => Err(ConfigError::Validation {
            field: format!("{section}.host"),
            reason: "no device address configured".into(),
        }),
    }
}

fn device_config(
    section: &str,
    host: Option<&str>,
    username: &str,
    password: SecretString,
    timeout: Duration,
) -> Result<DeviceConfig, ConfigError> {
    let host = require_host(section, host)?;
    Ok(DeviceConfig {
        host,
        credentials: Credentials {
            username: username.to_owned(),
            password,
        },
        timeout,
    })
}

fn timeout_for(defaults: &Defaults, section: Option<u64>) -> Result<Duration, ConfigError> {
    match section.unwrap_or(defaults.timeout) {
        0 => Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Build the runtime switch config from `[switch]`.
pub fn switch_config(cfg: &Config) -> Result<SwitchConfig, ConfigError> {
    let s = &cfg.switch;
    let timeout = timeout_for(&cfg.defaults, s.timeout)?;
    let password = resolve_password("switch", s.password_env.as_deref(), s.password.as_deref())?;
    let device = device_config("switch", s.host.as_deref(), &s.username, password, timeout)?;

    Ok(SwitchConfig {
        device,
        settle: Duration::from_secs(s.settle_secs),
        backoff: Duration::from_secs(s.backoff_secs),
    })
}

/// Retry policy for `[switch]` runs.
pub fn switch_retry(cfg: &Config) -> RetryPolicy {
    RetryPolicy::new(
        cfg.switch.attempts,
        Duration::from_secs(cfg.switch.retry_delay_secs),
    )
}

/// Build the runtime access point config from `[access_point]`.
pub fn access_point_config(cfg: &Config) -> Result<AccessPointConfig, ConfigError> {
    let a = &cfg.access_point;
    let timeout = timeout_for(&cfg.defaults, a.timeout)?;
    let password = resolve_password(
        "access_point",
        a.password_env.as_deref(),
        a.password.as_deref(),
    )?;
    let device = device_config("access_point", a.host.as_deref(), &a.username, password, timeout)?;

    Ok(AccessPointConfig {
        device,
        radio: a.radio.clone(),
        channel: a.channel,
        network_security_enabled: a.network_security_enabled,
        retry: RetryPolicy::new(a.attempts, Duration::from_secs(a.retry_delay_secs)),
        verify_delay: Duration::from_secs(a.verify_delay_secs),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write(dir: &tempfile::TempDir, toml: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.switch.settle_secs, 2);
        assert_eq!(cfg.switch.backoff_secs, 5);
        assert_eq!(cfg.access_point.channel, 36);
        assert!(!cfg.access_point.network_security_enabled);
        assert!(cfg.switch.host.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
[defaults]
timeout = 4

[switch]
host = "10.0.100.2"
password = "sw1tch"
settle_secs = 1

[access_point]
host = "10.0.100.3"
password = "ap"
timeout = 8
channel = 149
network_security_enabled = true
attempts = 3
"#,
        );
        let cfg = load_config_from(&path).unwrap();

        let switch = switch_config(&cfg).unwrap();
        assert_eq!(switch.device.host, "10.0.100.2");
        assert_eq!(switch.device.timeout, Duration::from_secs(4));
        assert_eq!(switch.settle, Duration::from_secs(1));
        assert_eq!(switch.backoff, Duration::from_secs(5));
        assert_eq!(switch.device.credentials.username, "root");
        assert_eq!(switch.device.credentials.password.expose_secret(), "sw1tch");

        let ap = access_point_config(&cfg).unwrap();
        assert_eq!(ap.device.timeout, Duration::from_secs(8));
        assert_eq!(ap.channel, 149);
        assert!(ap.network_security_enabled);
        assert_eq!(ap.retry, RetryPolicy::new(3, Duration::from_secs(30)));
        assert_eq!(ap.verify_delay, Duration::from_secs(3));
    }

    #[test]
    fn missing_host_is_a_validation_error() {
        let cfg = Config {
            switch: SwitchSection {
                password: Some("pw".into()),
                ..SwitchSection::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            switch_config(&cfg),
            Err(ConfigError::Validation { field, .. }) if field == "switch.host"
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = Config::default();
        cfg.defaults.timeout = 0;
        cfg.switch.host = Some("10.0.100.2".into());
        cfg.switch.password = Some("pw".into());
        assert!(matches!(
            switch_config(&cfg),
            Err(ConfigError::Validation { field, .. }) if field == "timeout"
        ));
    }

    #[test]
    fn password_env_wins_over_plaintext() {
        // Cargo exports CARGO_PKG_NAME to test binaries.
        let pw = resolve_password("switch", Some("CARGO_PKG_NAME"), Some("plain")).unwrap();
        assert_eq!(pw.expose_secret(), "fieldnet-config");
    }

    #[test]
    fn unset_password_env_falls_through() {
        let pw = resolve_password(
            "fieldnet-test-unset",
            Some("FIELDNET_TEST_DEFINITELY_UNSET"),
            Some("plain"),
        )
        .unwrap();
        assert_eq!(pw.expose_secret(), "plain");
        assert!(matches!(
            resolve_password("fieldnet-test-unset", None, None),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.switch.host = Some("10.0.100.2".into());
        cfg.access_point.channel = 149;
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.switch.host.as_deref(), Some("10.0.100.2"));
        assert_eq!(loaded.access_point.channel, 149);
        assert_eq!(loaded.defaults.output, "table");
    }
}
