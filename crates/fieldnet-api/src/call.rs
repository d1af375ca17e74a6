// Typed ubus calls
//
// Every remote operation the client issues is one variant of `UbusCall`.
// A variant knows its object, method and argument map; arguments that need
// validation (VLAN ids, team addresses) are checked by the builders that
// construct the variant, never at dispatch time.

use std::borrow::Cow;
use std::fmt;

use serde_json::{Map, Value, json};

/// UCI configuration packages touched by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciConfig {
    Network,
    Dhcp,
    Wireless,
}

impl UciConfig {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Dhcp => "dhcp",
            Self::Wireless => "wireless",
        }
    }
}

impl fmt::Display for UciConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ubus call, fully described.
#[derive(Debug, Clone, PartialEq)]
pub enum UbusCall {
    /// `system board`
    SystemBoard,
    /// `network.interface.<name> status`
    InterfaceStatus { interface: String },
    /// `network restart`
    NetworkRestart,
    /// `network reload`
    NetworkReload,
    /// `network.wireless reconf`
    WirelessReconf,
    /// `iwinfo info`
    WifiInfo { device: String },
    /// `iwinfo assoclist`
    WifiAssocList { device: String },
    /// `hostapd.<iface> get_clients`
    WifiClients { interface: String },
    /// `uci set`
    UciSet {
        config: UciConfig,
        section: String,
        values: Map<String, Value>,
    },
    /// `uci delete`
    UciDelete {
        config: UciConfig,
        section: String,
        options: Vec<String>,
    },
    /// `uci commit`
    UciCommit { config: UciConfig },
    /// `rc init` with `action: restart`
    ServiceRestart { service: String },
}

impl UbusCall {
    pub fn object(&self) -> Cow<'static, str> {
        match self {
            Self::SystemBoard => Cow::Borrowed("system"),
            Self::InterfaceStatus { interface } => {
                Cow::Owned(format!("network.interface.{interface}"))
            }
            Self::NetworkRestart | Self::NetworkReload => Cow::Borrowed("network"),
            Self::WirelessReconf => Cow::Borrowed("network.wireless"),
            Self::WifiInfo { .. } | Self::WifiAssocList { .. } => Cow::Borrowed("iwinfo"),
            Self::WifiClients { interface } => Cow::Owned(format!("hostapd.{interface}")),
            Self::UciSet { .. } | Self::UciDelete { .. } | Self::UciCommit { .. } => {
                Cow::Borrowed("uci")
            }
            Self::ServiceRestart { .. } => Cow::Borrowed("rc"),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Self::SystemBoard => "board",
            Self::InterfaceStatus { .. } => "status",
            Self::NetworkRestart => "restart",
            Self::NetworkReload => "reload",
            Self::WirelessReconf => "reconf",
            Self::WifiInfo { .. } => "info",
            Self::WifiAssocList { .. } => "assoclist",
            Self::WifiClients { .. } => "get_clients",
            Self::UciSet { .. } => "set",
            Self::UciDelete { .. } => "delete",
            Self::UciCommit { .. } => "commit",
            Self::ServiceRestart { .. } => "init",
        }
    }

    pub fn args(&self) -> Value {
        match self {
            Self::SystemBoard
            | Self::InterfaceStatus { .. }
            | Self::NetworkRestart
            | Self::NetworkReload
            | Self::WirelessReconf
            | Self::WifiClients { .. } => json!({}),
            Self::WifiInfo { device } | Self::WifiAssocList { device } => {
                json!({ "device": device })
            }
            Self::UciSet {
                config,
                section,
                values,
            } => json!({
                "config": config.as_str(),
                "section": section,
                "values": values,
            }),
            Self::UciDelete {
                config,
                section,
                options,
            } => json!({
                "config": config.as_str(),
                "section": section,
                "options": options,
            }),
            Self::UciCommit { config } => json!({ "config": config.as_str() }),
            Self::ServiceRestart { service } => json!({
                "name": service,
                "action": "restart",
            }),
        }
    }

    /// `uci set` from `(option, value)` pairs; values are stringified the
    /// way UCI stores them.
    pub fn uci_set<'a>(
        config: UciConfig,
        section: impl Into<String>,
        values: impl IntoIterator<Item = (&'a str, String)>,
    ) -> Self {
        Self::UciSet {
            config,
            section: section.into(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_owned(), Value::String(v)))
                .collect(),
        }
    }

    pub fn uci_delete(
        config: UciConfig,
        section: impl Into<String>,
        options: &[&str],
    ) -> Self {
        Self::UciDelete {
            config,
            section: section.into(),
            options: options.iter().map(|o| (*o).to_owned()).collect(),
        }
    }
}

impl fmt::Display for UbusCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.object(), self.method())
    }
}
