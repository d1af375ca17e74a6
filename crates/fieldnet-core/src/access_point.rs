// ── Station wifi ──
//
// The access point runs one radio interface per driver station. Each
// interface broadcasts the team number as its SSID (or `no-team-<n>` when
// the station is empty), so the SSIDs seen by monitoring double as the
// record of which roster the radios are configured for.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use fieldnet_api::wireless::{AP_INTERFACES, NO_TEAM_SSID_PREFIX, wifi_ssid_calls};
use fieldnet_api::{
    HostapdClient, HttpTransport, Transport, TransportConfig, UbusClient, WifiInfo, WifiSlot,
};
use serde::Serialize;
use strum::Display;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::config::AccessPointConfig;
use crate::error::CoreError;
use crate::model::{Roster, wifi_slots};
use crate::retry::RetryPolicy;
use crate::status::StatusGuard;

/// Published state of the access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum AccessPointStatus {
    Unknown,
    Active,
    Configuring,
    /// The last SSID push failed or was never applied.
    ConfigError,
    /// The last monitoring pass failed.
    MonitorError,
}

/// Link state of one station interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationStatus {
    /// Team number broadcast as SSID, `0` for an empty station.
    pub team_id: u32,
    pub linked: bool,
    pub rx_rate_mbps: f64,
    pub tx_rate_mbps: f64,
    /// dB
    pub signal_noise_ratio: i32,
    pub bandwidth_used_mbps: f64,
    pub connection_quality: i32,
}

impl StationStatus {
    fn from_device(info: &WifiInfo, client: Option<&HostapdClient>) -> Self {
        let mut status = Self {
            team_id: team_from_ssid(info.ssid.as_deref()),
            connection_quality: info.quality.unwrap_or(0),
            ..Self::default()
        };
        if let Some(client) = client {
            status.linked = true;
            status.rx_rate_mbps = mbps(client.rate.rx);
            status.tx_rate_mbps = mbps(client.rate.tx);
            status.signal_noise_ratio = match (info.signal, info.noise) {
                (Some(signal), Some(noise)) => signal - noise,
                _ => 0,
            };
            status.bandwidth_used_mbps =
                mbps(client.airtime.rx.saturating_add(client.airtime.tx));
        }
        status
    }
}

fn team_from_ssid(ssid: Option<&str>) -> u32 {
    match ssid {
        None => 0,
        Some(ssid) if ssid.starts_with(NO_TEAM_SSID_PREFIX) => 0,
        Some(ssid) => ssid.parse().unwrap_or_else(|_| {
            warn!(ssid, "station broadcasting an unexpected ssid");
            0
        }),
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn mbps(bits: u64) -> f64 {
    bits as f64 / 1_000_000.0
}

/// The field access point.
pub struct AccessPoint<T = HttpTransport> {
    client: Mutex<UbusClient<T>>,
    radio: String,
    channel: AtomicU32,
    network_security_enabled: bool,
    retry: RetryPolicy,
    verify_delay: Duration,
    status: watch::Sender<AccessPointStatus>,
    stations: watch::Sender<[StationStatus; 6]>,
    monitored: AtomicBool,
}

impl AccessPoint<HttpTransport> {
    pub fn new(config: &AccessPointConfig) -> Result<Self, CoreError> {
        let transport = HttpTransport::new(&TransportConfig {
            timeout: config.device.timeout,
            ..TransportConfig::default()
        })?;
        let client = UbusClient::with_transport(
            transport,
            &config.device.host,
            config.device.credentials.clone(),
        )?
        .with_timeout(config.device.timeout);
        Ok(Self::with_client(client, config))
    }
}

impl<T: Transport> AccessPoint<T> {
    /// Build over an existing client. `config.device` is not consulted.
    pub fn with_client(client: UbusClient<T>, config: &AccessPointConfig) -> Self {
        let (status, _) = watch::channel(AccessPointStatus::Unknown);
        let (stations, _) = watch::channel(Default::default());
        Self {
            client: Mutex::new(client),
            radio: config.radio.clone(),
            channel: AtomicU32::new(config.channel),
            network_security_enabled: config.network_security_enabled,
            retry: config.retry,
            verify_delay: config.verify_delay,
            status,
            stations,
            monitored: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> AccessPointStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AccessPointStatus> {
        self.status.subscribe()
    }

    /// Station statuses from the last successful monitoring pass.
    pub fn station_statuses(&self) -> [StationStatus; 6] {
        self.stations.borrow().clone()
    }

    pub fn subscribe_stations(&self) -> watch::Receiver<[StationStatus; 6]> {
        self.stations.subscribe()
    }

    /// Channel last set or reported by the radios.
    pub fn channel(&self) -> u32 {
        self.channel.load(Ordering::Relaxed)
    }

    /// Poll every station interface and publish the result.
    ///
    /// With network security disabled the access point is not contacted
    /// and the previous statuses are returned.
    pub async fn update_monitoring(&self) -> Result<[StationStatus; 6], CoreError> {
        if !self.network_security_enabled {
            return Ok(self.station_statuses());
        }

        let mut client = self.client.lock().await;
        match self.monitor(&mut client).await {
            Ok(stations) => {
                self.status.send_if_modified(|status| {
                    let stale = matches!(
                        status,
                        AccessPointStatus::Unknown | AccessPointStatus::MonitorError
                    );
                    if stale {
                        *status = AccessPointStatus::Active;
                    }
                    stale
                });
                Ok(stations)
            }
            Err(err) => {
                warn!(error = %err, "access point monitoring failed");
                self.status.send_replace(AccessPointStatus::MonitorError);
                Err(err)
            }
        }
    }

    /// Whether the last monitoring pass saw exactly `roster`'s teams.
    /// Always false before the radios have been read once.
    pub fn is_configured_for(&self, roster: &Roster) -> bool {
        self.monitored.load(Ordering::Acquire)
            && matches_roster(&self.stations.borrow(), roster)
    }

    /// Point each station SSID at `roster`'s team.
    ///
    /// Does nothing when network security is disabled or the radios
    /// already broadcast the roster. Otherwise each attempt re-reads the
    /// radios, pushes SSIDs and keys if they differ, waits and verifies.
    /// Attempts are bounded by the configured [`RetryPolicy`].
    pub async fn configure_team_wifi(&self, roster: &Roster) -> Result<(), CoreError> {
        if !self.network_security_enabled {
            debug!("network security disabled, leaving access point alone");
            return Ok(());
        }
        if self.is_configured_for(roster) {
            debug!("access point already configured for roster");
            return Ok(());
        }

        let slots = wifi_slots(roster);
        wifi_ssid_calls(&slots)?;

        let run = StatusGuard::enter(&self.status, AccessPointStatus::Configuring);
        info!("configuring team wifi");

        let result = self
            .retry
            .run(|attempt| self.attempt_configuration(roster, &slots, attempt))
            .await;
        match result {
            Ok(()) => {
                info!("team wifi configured");
                run.finish(AccessPointStatus::Active);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "team wifi configuration failed");
                run.finish(AccessPointStatus::ConfigError);
                Err(err)
            }
        }
    }

    /// Move the station radio to `channel`.
    pub async fn set_channel(&self, channel: u32) -> Result<(), CoreError> {
        if !self.network_security_enabled {
            debug!(channel, "network security disabled, not changing channel");
            return Ok(());
        }

        let mut client = self.client.lock().await;
        client.login().await?;
        client.set_wifi_channel(&self.radio, channel).await?;
        self.channel.store(channel, Ordering::Relaxed);
        info!(radio = %self.radio, channel, "access point channel set");
        Ok(())
    }

    async fn attempt_configuration(
        &self,
        roster: &Roster,
        slots: &[WifiSlot; 6],
        attempt: u32,
    ) -> Result<(), CoreError> {
        let mut client = self.client.lock().await;

        let stations = self.monitor(&mut client).await?;
        if matches_roster(&stations, roster) {
            return Ok(());
        }

        debug!(attempt, "pushing team ssids");
        client.set_wifi_ssids(slots).await?;
        tokio::time::sleep(self.verify_delay).await;

        let stations = self.monitor(&mut client).await?;
        if matches_roster(&stations, roster) {
            Ok(())
        } else {
            let seen: Vec<u32> = stations.iter().map(|s| s.team_id).collect();
            Err(CoreError::NotApplied {
                message: format!("stations broadcast teams {seen:?}"),
            })
        }
    }

    async fn monitor(&self, client: &mut UbusClient<T>) -> Result<[StationStatus; 6], CoreError> {
        client.login().await?;

        let mut stations: [StationStatus; 6] = Default::default();
        for (station, interface) in stations.iter_mut().zip(AP_INTERFACES) {
            let info = client.get_wifi_info(interface).await?;
            let clients = client.get_wifi_clients(interface).await?;
            if let Some(channel) = info.channel {
                self.channel.store(channel, Ordering::Relaxed);
            }
            *station = StationStatus::from_device(&info, clients.values().next());
            debug!(interface, team = station.team_id, linked = station.linked, "station status");
        }

        self.stations.send_replace(stations.clone());
        self.monitored.store(true, Ordering::Release);
        Ok(stations)
    }
}

fn matches_roster(stations: &[StationStatus; 6], roster: &Roster) -> bool {
    stations
        .iter()
        .zip(roster)
        .all(|(station, team)| station.team_id == team.as_ref().map_or(0, |team| team.id))
}

#[cfg(test)]
mod tests {
    use fieldnet_api::models::RxTx;

    use super::*;
    use crate::model::{Team, empty_roster};

    fn info(ssid: &str) -> WifiInfo {
        WifiInfo {
            ssid: Some(ssid.into()),
            channel: Some(36),
            signal: Some(-45),
            noise: Some(-95),
            quality: Some(60),
            quality_max: Some(70),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn ssid_carries_team_number() {
        assert_eq!(team_from_ssid(Some("254")), 254);
        assert_eq!(team_from_ssid(Some("no-team-3")), 0);
        assert_eq!(team_from_ssid(Some("FMS-Staff")), 0);
        assert_eq!(team_from_ssid(None), 0);
    }

    #[test]
    fn idle_station_is_not_linked() {
        let status = StationStatus::from_device(&info("254"), None);
        assert_eq!(status.team_id, 254);
        assert_eq!(status.connection_quality, 60);
        assert!(!status.linked);
        assert_eq!(status.signal_noise_ratio, 0);
    }

    #[test]
    fn linked_station_reports_rates() {
        let client = HostapdClient {
            authorized: true,
            rate: RxTx {
                rx: 86_700_000,
                tx: 144_400_000,
            },
            airtime: RxTx {
                rx: 1_500_000,
                tx: 500_000,
            },
            signal: Some(-45),
        };
        let status = StationStatus::from_device(&info("1114"), Some(&client));
        assert!(status.linked);
        assert!((status.rx_rate_mbps - 86.7).abs() < 1e-9);
        assert!((status.tx_rate_mbps - 144.4).abs() < 1e-9);
        assert!((status.bandwidth_used_mbps - 2.0).abs() < 1e-9);
        assert_eq!(status.signal_noise_ratio, 50);
    }

    #[test]
    fn roster_match_treats_empty_station_as_zero() {
        let mut stations: [StationStatus; 6] = Default::default();
        let mut roster = empty_roster();
        assert!(matches_roster(&stations, &roster));

        roster[2] = Some(Team::new(254));
        assert!(!matches_roster(&stations, &roster));
        stations[2].team_id = 254;
        assert!(matches_roster(&stations, &roster));
    }
}
