//! Field network orchestration on top of `fieldnet-api`.
//!
//! This crate owns the sequencing logic for the two field devices:
//!
//! - **[`Switch`]** — Station VLAN orchestrator. A configuration run resets
//!   all six station VLANs, commits, waits for the switch to settle, assigns
//!   the roster's teams and commits again. Runs are serialized by a mutex
//!   that also grants exclusive use of the device session.
//!
//! - **[`AccessPoint`]** — Station wifi monitor and configurator. Polls
//!   iwinfo/hostapd for per-station link state and pushes team SSIDs when
//!   the roster changes.
//!
//! - **[`RetryPolicy`]** — Opt-in retry hook. Nothing in this crate retries
//!   unless the caller hands in a policy with more than one attempt.
//!
//! Status for both devices is published on `tokio::sync::watch` channels so
//! callers can forward it to whatever notifies operators.

pub mod access_point;
pub mod config;
pub mod error;
pub mod model;
pub mod retry;
mod status;
pub mod switch;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access_point::{AccessPoint, AccessPointStatus, StationStatus};
pub use config::{AccessPointConfig, DeviceConfig, SwitchConfig};
pub use error::CoreError;
pub use model::{Roster, Station, Team, empty_roster};
pub use retry::RetryPolicy;
pub use switch::{EthernetPlan, EthernetReport, Switch, SwitchStatus};

pub use fieldnet_api::{Credentials, ErrorKind, VlanId, team_address};
