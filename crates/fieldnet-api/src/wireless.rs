// Wireless endpoints
//
// Queries against iwinfo/hostapd for the six station access points, the
// channel change sequence, and the SSID/key push used when teams change.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::call::{UbusCall, UciConfig};
use crate::client::UbusClient;
use crate::error::Error;
use crate::models::{AssocList, AssocStation, HostapdClient, HostapdClients, WifiInfo};
use crate::transport::Transport;

/// Station access point interfaces, in station order (R1, R2, R3, B1, B2, B3).
pub const AP_INTERFACES: [&str; 6] = [
    "phy2-ap0", "phy2-ap1", "phy2-ap2", "phy2-ap3", "phy2-ap4", "phy2-ap5",
];

/// `wifi-iface` UCI sections backing [`AP_INTERFACES`].
pub const AP_SECTIONS: [&str; 6] = ["ap0", "ap1", "ap2", "ap3", "ap4", "ap5"];

/// SSID prefix broadcast by a station with no team.
pub const NO_TEAM_SSID_PREFIX: &str = "no-team";

const TEAM_ENCRYPTION: &str = "psk2+ccmp";

/// Desired wifi state for one station.
#[derive(Debug, Clone, Default)]
pub struct WifiSlot {
    pub team_id: Option<u32>,
    pub key: Option<SecretString>,
}

impl WifiSlot {
    pub fn team(team_id: u32, key: impl Into<String>) -> Self {
        Self {
            team_id: Some(team_id),
            key: Some(SecretString::from(key.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// The three calls that move `radio` to `channel`: set, commit, reconfigure.
pub fn wifi_channel_calls(radio: &str, channel: u32) -> [UbusCall; 3] {
    [
        UbusCall::uci_set(UciConfig::Wireless, radio, [("channel", channel.to_string())]),
        UbusCall::UciCommit {
            config: UciConfig::Wireless,
        },
        UbusCall::WirelessReconf,
    ]
}

/// Staged `uci set` per station for the given slots.
///
/// A team slot broadcasts the team number with its WPA key; an empty slot
/// broadcasts `no-team-<station>` and is disabled. A team without a key is
/// refused before any call is built.
pub fn wifi_ssid_calls(slots: &[WifiSlot; 6]) -> Result<Vec<UbusCall>, Error> {
    slots
        .iter()
        .zip(AP_SECTIONS)
        .enumerate()
        .map(|(index, (slot, section))| match slot.team_id {
            Some(team_id) => {
                let key = slot
                    .key
                    .as_ref()
                    .ok_or(Error::InvalidTeam { team_id })?;
                Ok(UbusCall::uci_set(
                    UciConfig::Wireless,
                    section,
                    [
                        ("ssid", team_id.to_string()),
                        ("encryption", TEAM_ENCRYPTION.to_owned()),
                        ("key", key.expose_secret().to_owned()),
                        ("disabled", "0".to_owned()),
                    ],
                ))
            }
            None => Ok(UbusCall::uci_set(
                UciConfig::Wireless,
                section,
                [
                    ("ssid", format!("{NO_TEAM_SSID_PREFIX}-{}", index + 1)),
                    ("disabled", "1".to_owned()),
                ],
            )),
        })
        .collect()
}

impl<T: Transport> UbusClient<T> {
    /// `iwinfo info` for one interface.
    pub async fn get_wifi_info(&self, device: &str) -> Result<WifiInfo, Error> {
        self.execute_as(&UbusCall::WifiInfo {
            device: device.to_owned(),
        })
        .await
    }

    /// `iwinfo assoclist` for one interface.
    pub async fn get_wifi_assoclist(&self, device: &str) -> Result<Vec<AssocStation>, Error> {
        let list: AssocList = self
            .execute_as(&UbusCall::WifiAssocList {
                device: device.to_owned(),
            })
            .await?;
        Ok(list.results)
    }

    /// hostapd's client table for one interface, keyed by MAC.
    pub async fn get_wifi_clients(
        &self,
        interface: &str,
    ) -> Result<BTreeMap<String, HostapdClient>, Error> {
        let clients: HostapdClients = self
            .execute_as(&UbusCall::WifiClients {
                interface: interface.to_owned(),
            })
            .await?;
        Ok(clients.clients)
    }

    /// Move `radio` to `channel`. The three steps run in order; a failure
    /// aborts the remaining ones.
    pub async fn set_wifi_channel(&self, radio: &str, channel: u32) -> Result<(), Error> {
        debug!(radio, channel, "setting wifi channel");
        self.execute_all(&wifi_channel_calls(radio, channel)).await
    }

    /// Push SSIDs and keys for all six stations and apply them through the
    /// LuCI endpoints.
    pub async fn set_wifi_ssids(&self, slots: &[WifiSlot; 6]) -> Result<(), Error> {
        let calls = wifi_ssid_calls(slots)?;
        debug!(calls = calls.len(), "staging wifi ssids");
        self.execute_all(&calls).await?;
        self.apply_unchecked().await?;
        self.reload_wifi().await
    }
}
