// fieldnet-api: Async Rust client for the ubus JSON-RPC interface of field network devices

pub mod call;
pub mod client;
pub mod error;
pub mod ethernet;
pub mod legacy;
pub mod models;
pub mod session;
pub mod transport;
pub mod wireless;

pub use call::{UbusCall, UciConfig};
pub use client::{DEFAULT_TIMEOUT, UbusClient};
pub use error::{Error, ErrorKind};
pub use ethernet::{VLAN_IDS, VlanId, team_address};
pub use models::{AssocStation, HostapdClient, WifiInfo};
pub use session::{Credentials, SessionToken};
pub use transport::{HttpTransport, RawResponse, Transport, TransportConfig, TransportError};
pub use wireless::{AP_INTERFACES, WifiSlot};
