//! Shared helpers for command handlers.

use fieldnet_core::{Roster, Team, empty_roster};

use crate::cli::{TeamSlot, WifiTeamSlot};

/// Roster from `switch configure` slots. Clap guarantees six of them.
pub fn ethernet_roster(slots: &[TeamSlot]) -> Roster {
    let mut roster = empty_roster();
    for (station, slot) in roster.iter_mut().zip(slots) {
        *station = slot.0.map(Team::new);
    }
    roster
}

/// Roster with WPA keys from `ap configure` slots.
pub fn wifi_roster(slots: &[WifiTeamSlot]) -> Roster {
    let mut roster = empty_roster();
    for (station, slot) in roster.iter_mut().zip(slots) {
        *station = slot
            .0
            .as_ref()
            .map(|(id, key)| Team::with_key(*id, key.clone()));
    }
    roster
}

/// `-` for absent values in table cells.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}
