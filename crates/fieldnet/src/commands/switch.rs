//! Switch command handlers.

use fieldnet_core::{EthernetReport, Station, Switch, empty_roster, team_address};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, SwitchArgs, SwitchCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct VlanState {
    station: Station,
    vlan: u16,
    team: Option<u32>,
    gateway: Option<String>,
}

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "Station")]
    station: String,
    #[tabled(rename = "VLAN")]
    vlan: u16,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
}

impl From<&VlanState> for VlanRow {
    fn from(s: &VlanState) -> Self {
        Self {
            station: s.station.to_string(),
            vlan: s.vlan,
            team: util::or_dash(s.team),
            gateway: util::or_dash(s.gateway.as_deref()),
        }
    }
}

fn vlan_states(report: &EthernetReport) -> Vec<VlanState> {
    Station::ALL
        .iter()
        .map(|&station| {
            let team = report
                .assigned
                .iter()
                .find(|(vlan, _)| *vlan == station.vlan())
                .map(|(_, team)| *team);
            VlanState {
                station,
                vlan: station.vlan().get(),
                team,
                gateway: team
                    .and_then(|t| team_address(t).ok())
                    .map(|addr| addr.to_string()),
            }
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: SwitchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let roster = match args.command {
        SwitchCommand::Configure { slots } => util::ethernet_roster(&slots),
        SwitchCommand::Reset => empty_roster(),
    };

    let (config, retry) = config::switch(global)?;
    let switch = Switch::new(&config)?;
    let report = switch
        .configure_team_ethernet_with_retry(&roster, &retry)
        .await?;

    let states = vlan_states(&report);
    let out = output::render_list(&global.output, &states, |s| VlanRow::from(s))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
