//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

/// Copy of `cfg` safe to print.
fn redacted(mut cfg: Config) -> Config {
    if cfg.switch.password.is_some() {
        cfg.switch.password = Some(MASK.into());
    }
    if cfg.access_point.password.is_some() {
        cfg.access_point.password = Some(MASK.into());
    }
    cfg
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(config::load(global)?);
            let out = output::render_single(&global.output, &cfg, |cfg| {
                toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unrenderable: {e}"))
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { device } => {
            let section = device.section();
            let secret = rpassword::prompt_password(format!("{section} password: "))?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            let entry = keyring::Entry::new(
                fieldnet_config::KEYRING_SERVICE,
                &format!("{section}/password"),
            )
            .map_err(|e| CliError::Validation {
                field: "keyring".into(),
                reason: format!("failed to access keyring: {e}"),
            })?;
            entry.set_password(&secret).map_err(|e| CliError::Validation {
                field: "keyring".into(),
                reason: format!("failed to store secret in keyring: {e}"),
            })?;

            eprintln!("✓ Password stored in system keyring for [{section}]");
            Ok(())
        }
    }
}
