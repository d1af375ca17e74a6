// ── Field model ──
//
// Teams and the six driver stations they play from. A roster is the
// per-match assignment of teams to stations; `None` means the station is
// empty for this match.

use fieldnet_api::wireless::AP_INTERFACES;
use fieldnet_api::{VlanId, WifiSlot};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A team as handed in by the scheduler.
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: u32,
    /// Station wifi passphrase. Required only when network security is on.
    #[serde(default)]
    pub wpa_key: Option<SecretString>,
}

impl Team {
    pub fn new(id: u32) -> Self {
        Self { id, wpa_key: None }
    }

    pub fn with_key(id: u32, key: impl Into<String>) -> Self {
        Self {
            id,
            wpa_key: Some(SecretString::from(key.into())),
        }
    }
}

/// Teams by station, in station order (R1, R2, R3, B1, B2, B3).
pub type Roster = [Option<Team>; 6];

/// A roster with every station empty.
pub fn empty_roster() -> Roster {
    Default::default()
}

/// Wifi slots for a roster, in station order.
pub(crate) fn wifi_slots(roster: &Roster) -> [WifiSlot; 6] {
    roster.clone().map(|team| match team {
        Some(team) => WifiSlot {
            team_id: Some(team.id),
            key: team.wpa_key,
        },
        None => WifiSlot::empty(),
    })
}

/// One of the six driver stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum Station {
    R1,
    R2,
    R3,
    B1,
    B2,
    B3,
}

impl Station {
    pub const ALL: [Self; 6] = [Self::R1, Self::R2, Self::R3, Self::B1, Self::B2, Self::B3];

    /// Zero-based position in a [`Roster`].
    pub fn index(self) -> usize {
        match self {
            Self::R1 => 0,
            Self::R2 => 1,
            Self::R3 => 2,
            Self::B1 => 3,
            Self::B2 => 4,
            Self::B3 => 5,
        }
    }

    pub fn vlan(self) -> VlanId {
        VlanId::ALL[self.index()]
    }

    /// Access point interface serving this station.
    pub fn interface(self) -> &'static str {
        AP_INTERFACES[self.index()]
    }
}
