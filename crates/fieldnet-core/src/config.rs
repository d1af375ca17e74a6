// ── Runtime device configuration ──
//
// These types describe *how* to reach and drive the field devices.
// They carry credential data and timing, but never touch disk.
// The CLI (via fieldnet-config) constructs them and hands them in.

use std::time::Duration;

use fieldnet_api::{Credentials, DEFAULT_TIMEOUT};

use crate::retry::RetryPolicy;

/// Pause after the reset commit before assigning teams.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);

/// Pause after the assignment commit before returning to the caller.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// Pause between pushing SSIDs and checking that the radios picked them up.
pub const DEFAULT_VERIFY_DELAY: Duration = Duration::from_secs(3);

/// Connection details for one ubus device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Host or base URL (e.g. `10.0.100.2`).
    pub host: String,
    pub credentials: Credentials,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Configuration for the field switch.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    pub device: DeviceConfig,
    pub settle: Duration,
    pub backoff: Duration,
}

impl SwitchConfig {
    pub fn new(device: DeviceConfig) -> Self {
        Self {
            device,
            settle: DEFAULT_SETTLE,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Configuration for the field access point.
#[derive(Debug, Clone)]
pub struct AccessPointConfig {
    pub device: DeviceConfig,
    /// UCI section of the radio serving the station interfaces.
    pub radio: String,
    pub channel: u32,
    /// When disabled the access point is left alone entirely.
    pub network_security_enabled: bool,
    pub retry: RetryPolicy,
    pub verify_delay: Duration,
}

impl AccessPointConfig {
    pub fn new(device: DeviceConfig) -> Self {
        Self {
            device,
            radio: "radio2".into(),
            channel: 36,
            network_security_enabled: false,
            retry: RetryPolicy::none(),
            verify_delay: DEFAULT_VERIFY_DELAY,
        }
    }
}
