//! Access point command handlers.

use fieldnet_core::{AccessPoint, Station, StationStatus};
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use crate::cli::{AccessPointArgs, AccessPointCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StationState {
    station: Station,
    #[serde(flatten)]
    status: StationStatus,
}

#[derive(Tabled)]
struct StationRow {
    #[tabled(rename = "Station")]
    station: String,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Linked")]
    linked: String,
    #[tabled(rename = "RX Mbps")]
    rx: String,
    #[tabled(rename = "TX Mbps")]
    tx: String,
    #[tabled(rename = "SNR dB")]
    snr: i32,
    #[tabled(rename = "Airtime Mbps")]
    bandwidth: String,
    #[tabled(rename = "Quality")]
    quality: i32,
}

impl From<&StationState> for StationRow {
    fn from(s: &StationState) -> Self {
        let st = &s.status;
        Self {
            station: s.station.to_string(),
            team: util::or_dash((st.team_id != 0).then_some(st.team_id)),
            linked: if st.linked { "yes" } else { "no" }.into(),
            rx: format!("{:.1}", st.rx_rate_mbps),
            tx: format!("{:.1}", st.tx_rate_mbps),
            snr: st.signal_noise_ratio,
            bandwidth: format!("{:.2}", st.bandwidth_used_mbps),
            quality: st.connection_quality,
        }
    }
}

fn station_states(statuses: [StationStatus; 6]) -> Vec<StationState> {
    Station::ALL
        .into_iter()
        .zip(statuses)
        .map(|(station, status)| StationState { station, status })
        .collect()
}

fn render_stations(statuses: [StationStatus; 6], global: &GlobalOpts) -> Result<(), CliError> {
    let states = station_states(statuses);
    let out = output::render_list(&global.output, &states, |s| StationRow::from(s))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AccessPointArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = config::access_point(global)?;
    if !config.network_security_enabled {
        warn!("network security is disabled; the access point is not managed");
    }
    let ap = AccessPoint::new(&config)?;

    match args.command {
        AccessPointCommand::Status => {
            let statuses = ap.update_monitoring().await?;
            render_stations(statuses, global)
        }

        AccessPointCommand::Configure { slots } => {
            let roster = util::wifi_roster(&slots);
            ap.configure_team_wifi(&roster).await?;
            render_stations(ap.station_statuses(), global)
        }

        AccessPointCommand::Channel { channel } => {
            ap.set_channel(channel).await?;
            let out = output::render_single(
                &global.output,
                &serde_json::json!({ "radio": config.radio, "channel": ap.channel() }),
                |_| format!("{} on channel {}", config.radio, ap.channel()),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
