//! CLI configuration -- thin wrapper around `fieldnet_config`.
//!
//! Adds the `GlobalOpts` overrides (--config, --host, --timeout) on top of
//! the file + environment layers.

use std::path::PathBuf;

use fieldnet_core::{AccessPointConfig, RetryPolicy, SwitchConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use fieldnet_config::Config;

/// Config file in effect: `--config` / `FIELDNET_CONFIG`, else the
/// platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(fieldnet_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(fieldnet_config::load_config_from(&config_path(global))?)
}

/// Switch config with flag overrides applied, plus its retry policy.
pub fn switch(global: &GlobalOpts) -> Result<(SwitchConfig, RetryPolicy), CliError> {
    let mut cfg = load(global)?;
    if let Some(ref host) = global.host {
        cfg.switch.host = Some(host.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.switch.timeout = Some(timeout);
    }
    let retry = fieldnet_config::switch_retry(&cfg);
    Ok((fieldnet_config::switch_config(&cfg)?, retry))
}

/// Access point config with flag overrides applied.
pub fn access_point(global: &GlobalOpts) -> Result<AccessPointConfig, CliError> {
    let mut cfg = load(global)?;
    if let Some(ref host) = global.host {
        cfg.access_point.host = Some(host.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.access_point.timeout = Some(timeout);
    }
    Ok(fieldnet_config::access_point_config(&cfg)?)
}
