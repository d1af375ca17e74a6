//! Command dispatch: bridges CLI args -> core devices -> output formatting.

pub mod access_point;
pub mod config_cmd;
pub mod switch;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Switch(args) => switch::handle(args, global).await,
        Command::AccessPoint(args) => access_point::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Ok(()),
    }
}
