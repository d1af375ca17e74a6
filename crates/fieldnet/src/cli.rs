//! Clap derive structures for the `fieldnet` CLI.
//!
//! Defines the command tree, global flags, and the station slot syntax.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fieldnet -- drive the field switch and access point from the command line
#[derive(Debug, Parser)]
#[command(
    name = "fieldnet",
    version,
    about = "Configure the field network for a match",
    long_about = "Configure the station VLANs on the field switch and the team wifi on the\n\
        field access point. Stations are given in order R1 R2 R3 B1 B2 B3; use '-'\n\
        for an empty station.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "FIELDNET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Device address (overrides the config section of the target device)
    #[arg(long, short = 'H', env = "FIELDNET_HOST", global = true)]
    pub host: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, env = "FIELDNET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FIELDNET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure station VLANs on the field switch
    #[command(alias = "sw")]
    Switch(SwitchArgs),

    /// Monitor and configure team wifi on the access point
    #[command(name = "ap", alias = "access-point")]
    AccessPoint(AccessPointArgs),

    /// Inspect the configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Station slots ────────────────────────────────────────────────────

/// A team number or `-` for an empty station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamSlot(pub Option<u32>);

/// `ID:KEY`, or `-` for an empty station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiTeamSlot(pub Option<(u32, String)>);

fn parse_team_id(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("'{s}' is not a team number")),
        Ok(id) => Ok(id),
    }
}

pub fn parse_team_slot(s: &str) -> Result<TeamSlot, String> {
    if s == "-" {
        return Ok(TeamSlot(None));
    }
    parse_team_id(s).map(|id| TeamSlot(Some(id)))
}

pub fn parse_wifi_slot(s: &str) -> Result<WifiTeamSlot, String> {
    if s == "-" {
        return Ok(WifiTeamSlot(None));
    }
    let (id, key) = s
        .split_once(':')
        .ok_or_else(|| format!("'{s}' is not TEAM:KEY"))?;
    if key.len() < 8 {
        return Err(format!("key for team {id} must be at least 8 characters"));
    }
    Ok(WifiTeamSlot(Some((parse_team_id(id)?, key.to_owned()))))
}

// ── Switch ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SwitchArgs {
    #[command(subcommand)]
    pub command: SwitchCommand,
}

#[derive(Debug, Subcommand)]
pub enum SwitchCommand {
    /// Assign teams to the six station VLANs
    Configure {
        /// Team per station, R1 R2 R3 B1 B2 B3 ('-' for empty)
        #[arg(num_args = 6, required = true, value_parser = parse_team_slot)]
        slots: Vec<TeamSlot>,
    },

    /// Reset every station VLAN to unassigned
    Reset,
}

// ── Access point ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AccessPointArgs {
    #[command(subcommand)]
    pub command: AccessPointCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccessPointCommand {
    /// Show link state of every station
    Status,

    /// Broadcast team SSIDs with their WPA keys
    Configure {
        /// TEAM:KEY per station, R1 R2 R3 B1 B2 B3 ('-' for empty)
        #[arg(num_args = 6, required = true, value_parser = parse_wifi_slot)]
        slots: Vec<WifiTeamSlot>,
    },

    /// Move the station radio to another channel
    Channel {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=196))]
        channel: u32,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (passwords masked)
    Show,

    /// Store a device password in the system keyring
    SetPassword {
        #[arg(value_enum)]
        device: DeviceKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceKind {
    Switch,
    AccessPoint,
}

impl DeviceKind {
    /// Config section name, also the keyring entry prefix.
    pub fn section(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::AccessPoint => "access_point",
        }
    }
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
