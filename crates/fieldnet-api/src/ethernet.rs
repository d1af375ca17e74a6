// Station VLAN configuration
//
// Each of the six driver stations owns one VLAN on the field switch.
// Assigning a team gives the VLAN interface the team's gateway address
// (`10.<id / 100>.<id % 100>.4/24`) and turns DHCP on; unassigning drops
// the address and turns DHCP off. Changes are staged UCI edits until
// `commit_ethernet_config` commits and reloads.

use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::debug;

use crate::call::{UbusCall, UciConfig};
use crate::client::UbusClient;
use crate::error::Error;
use crate::transport::Transport;

/// The six station VLANs, in station order (R1, R2, R3, B1, B2, B3).
pub const VLAN_IDS: [u16; 6] = [10, 20, 30, 40, 50, 60];

/// Last octet of every team gateway address.
pub const TEAM_GATEWAY_OCTET: u8 = 4;

pub const TEAM_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Services restarted after the network reload, in order.
pub const DEPENDENT_SERVICES: [&str; 2] = ["dnsmasq", "odhcpd"];

/// One of the six station VLAN ids. Cannot hold any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    pub const ALL: [Self; 6] = [
        Self(10),
        Self(20),
        Self(30),
        Self(40),
        Self(50),
        Self(60),
    ];

    pub fn new(id: u16) -> Result<Self, Error> {
        if VLAN_IDS.contains(&id) {
            Ok(Self(id))
        } else {
            Err(Error::InvalidVlan { vlan: id })
        }
    }

    /// VLAN for a zero-based station index.
    pub fn for_station(index: usize) -> Result<Self, Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidStation { index })
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// UCI section name shared by the `network` interface and the `dhcp`
    /// pool for this VLAN.
    pub fn section(self) -> String {
        format!("vlan{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = Error;

    fn try_from(id: u16) -> Result<Self, Error> {
        Self::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> Self {
        vlan.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Gateway address for a team's station VLAN.
///
/// Team 254 maps to `10.2.54.4`, team 1114 to `10.11.14.4`. Team numbers
/// whose hundreds part does not fit an octet (and team 0) are rejected.
pub fn team_address(team_id: u32) -> Result<Ipv4Addr, Error> {
    if team_id == 0 {
        return Err(Error::InvalidTeam { team_id });
    }
    let high = u8::try_from(team_id / 100).map_err(|_| Error::InvalidTeam { team_id })?;
    let low = u8::try_from(team_id % 100).map_err(|_| Error::InvalidTeam { team_id })?;
    Ok(Ipv4Addr::new(10, high, low, TEAM_GATEWAY_OCTET))
}

/// Ordered calls that bring one VLAN to the desired state.
///
/// - unassign (`team_id == None`): `proto=none`, delete `ipaddr`/`netmask`,
///   dhcp `ignore=1`
/// - assign: static `ipaddr`/`netmask`, dhcp `ignore=0`
///
/// Validation happens before anything is built, so an invalid VLAN or
/// team yields an error and no calls.
pub fn ethernet_config_calls(team_id: Option<u32>, vlan: u16) -> Result<Vec<UbusCall>, Error> {
    let vlan = VlanId::new(vlan)?;
    let section = vlan.section();

    let calls = match team_id {
        None => vec![
            UbusCall::uci_set(UciConfig::Network, &section, [("proto", "none".to_owned())]),
            UbusCall::uci_delete(UciConfig::Network, &section, &["ipaddr", "netmask"]),
            UbusCall::uci_set(UciConfig::Dhcp, &section, [("ignore", "1".to_owned())]),
        ],
        Some(team_id) => {
            let address = team_address(team_id)?;
            vec![
                UbusCall::uci_set(
                    UciConfig::Network,
                    &section,
                    [
                        ("proto", "static".to_owned()),
                        ("ipaddr", address.to_string()),
                        ("netmask", TEAM_NETMASK.to_string()),
                    ],
                ),
                UbusCall::uci_set(UciConfig::Dhcp, &section, [("ignore", "0".to_owned())]),
            ]
        }
    };
    Ok(calls)
}

/// Ordered calls that persist and apply staged ethernet changes.
pub fn ethernet_commit_calls() -> Vec<UbusCall> {
    let mut calls = vec![
        UbusCall::UciCommit {
            config: UciConfig::Network,
        },
        UbusCall::UciCommit {
            config: UciConfig::Dhcp,
        },
        UbusCall::NetworkReload,
    ];
    calls.extend(DEPENDENT_SERVICES.iter().map(|service| UbusCall::ServiceRestart {
        service: (*service).to_owned(),
    }));
    calls
}

impl<T: Transport> UbusClient<T> {
    /// Stage the configuration for one station VLAN: assign `team_id`, or
    /// reset the VLAN when `None`.
    pub async fn generate_ethernet_config(
        &self,
        team_id: Option<u32>,
        vlan: u16,
    ) -> Result<(), Error> {
        let calls = ethernet_config_calls(team_id, vlan)?;
        debug!(vlan, ?team_id, calls = calls.len(), "staging vlan config");
        self.execute_all(&calls).await
    }

    /// Commit `network` and `dhcp`, reload the network and restart the
    /// DHCP services.
    pub async fn commit_ethernet_config(&self) -> Result<(), Error> {
        debug!("committing ethernet config");
        self.execute_all(&ethernet_commit_calls()).await
    }
}
