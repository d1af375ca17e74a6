#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use fieldnet_api::wireless::AP_INTERFACES;
use fieldnet_core::{
    AccessPoint, AccessPointConfig, AccessPointStatus, CoreError, Credentials, DeviceConfig,
    RetryPolicy, Roster, Team, empty_roster,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{FakeDevice, Reply, TOKEN};

/// Radios that broadcast `no-team-<n>` until `forms_needed` legacy forms
/// have been posted, then `ssids`. Only station R1 has a client.
fn radios(ssids: [&'static str; 6], forms_needed: usize) -> FakeDevice {
    FakeDevice::with_handler(move |object, method, args, forms| match (object, method) {
        ("iwinfo", "info") => {
            let device = args["device"].as_str()?;
            let index = AP_INTERFACES.iter().position(|i| *i == device)?;
            let ssid = if forms >= forms_needed {
                ssids[index].to_owned()
            } else {
                format!("no-team-{}", index + 1)
            };
            Some(json!({
                "ssid": ssid,
                "channel": 36,
                "signal": -50,
                "noise": -95,
                "quality": 55,
                "quality_max": 70
            }))
        }
        ("hostapd.phy2-ap0", "get_clients") => Some(json!({
            "freq": 5180,
            "clients": {
                "aa:bb:cc:dd:ee:ff": {
                    "authorized": true,
                    "rate": { "rx": 86_700_000, "tx": 144_400_000 },
                    "airtime": { "rx": 1_000_000, "tx": 500_000 },
                    "signal": -50
                }
            }
        })),
        (_, "get_clients") => Some(json!({ "freq": 5180, "clients": {} })),
        _ => None,
    })
}

fn config(security: bool) -> AccessPointConfig {
    let mut config = AccessPointConfig::new(DeviceConfig::new(
        "10.0.100.3",
        Credentials::new("root", "fieldnet"),
    ));
    config.network_security_enabled = security;
    config.channel = 149;
    config
}

fn access_point(device: &FakeDevice, config: &AccessPointConfig) -> AccessPoint<FakeDevice> {
    AccessPoint::with_client(common::client(device), config)
}

fn roster() -> Roster {
    let mut roster = empty_roster();
    roster[0] = Some(Team::with_key(254, "hunter22"));
    roster[3] = Some(Team::with_key(1114, "correcthorse"));
    roster
}

const CONFIGURED: [&str; 6] = ["254", "no-team-2", "no-team-3", "1114", "no-team-5", "no-team-6"];

// ── Monitoring ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn monitoring_reads_every_station() {
    let device = radios(CONFIGURED, 0);
    let ap = access_point(&device, &config(true));

    let stations = ap.update_monitoring().await.unwrap();

    let teams: Vec<_> = stations.iter().map(|s| s.team_id).collect();
    assert_eq!(teams, vec![254, 0, 0, 1114, 0, 0]);

    let r1 = &stations[0];
    assert!(r1.linked);
    assert!((r1.rx_rate_mbps - 86.7).abs() < 1e-9);
    assert!((r1.tx_rate_mbps - 144.4).abs() < 1e-9);
    assert!((r1.bandwidth_used_mbps - 1.5).abs() < 1e-9);
    assert_eq!(r1.signal_noise_ratio, 45);
    assert_eq!(r1.connection_quality, 55);

    let b1 = &stations[3];
    assert!(!b1.linked);
    assert_eq!(b1.signal_noise_ratio, 0);
    assert_eq!(b1.connection_quality, 55);

    // login, then info + clients per interface
    assert_eq!(device.calls().len(), 13);
    assert_eq!(device.count("session login"), 1);
    assert_eq!(ap.channel(), 36);
    assert_eq!(ap.status(), AccessPointStatus::Active);
    assert_eq!(ap.station_statuses(), stations);
    assert!(ap.is_configured_for(&roster()));
}

#[tokio::test(start_paused = true)]
async fn monitoring_failure_is_published() {
    let device = radios(CONFIGURED, 0);
    device.fail("iwinfo", "info", Reply::Code(4));
    let ap = access_point(&device, &config(true));

    let err = ap.update_monitoring().await.unwrap_err();
    assert_eq!(err.code(), Some(4));
    assert_eq!(ap.status(), AccessPointStatus::MonitorError);
}

#[tokio::test(start_paused = true)]
async fn disabled_security_leaves_device_alone() {
    let device = radios(CONFIGURED, 0);
    let ap = access_point(&device, &config(false));

    let stations = ap.update_monitoring().await.unwrap();
    assert!(stations.iter().all(|s| s.team_id == 0 && !s.linked));
    ap.configure_team_wifi(&roster()).await.unwrap();
    ap.set_channel(40).await.unwrap();

    assert!(device.calls().is_empty());
    assert!(device.forms().is_empty());
    assert_eq!(ap.channel(), 149);
    assert_eq!(ap.status(), AccessPointStatus::Unknown);
}

// ── Configuration ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn configure_pushes_ssids_and_verifies() {
    let device = radios(CONFIGURED, 1);
    let ap = access_point(&device, &config(true));

    ap.configure_team_wifi(&roster()).await.unwrap();

    let sets: Vec<_> = device
        .calls()
        .into_iter()
        .filter(|c| c.name() == "uci set" && c.args["config"] == "wireless")
        .collect();
    assert_eq!(sets.len(), 6);
    assert_eq!(sets[0].args["section"], "ap0");
    assert_eq!(
        sets[0].args["values"],
        json!({ "ssid": "254", "encryption": "psk2+ccmp", "key": "hunter22", "disabled": "0" })
    );
    assert_eq!(
        sets[1].args["values"],
        json!({ "ssid": "no-team-2", "disabled": "1" })
    );
    assert_eq!(sets[3].args["values"]["ssid"], "1114");

    let forms = device.forms();
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].path, "/cgi-bin/luci/admin/uci/apply_unchecked");
    assert_eq!(forms[0].fields, vec![("sid".to_owned(), TOKEN.to_owned())]);
    assert_eq!(forms[1].path, "/cgi-bin/cgi-exec");
    assert_eq!(forms[1].fields[1].1, "/sbin/wifi reload");

    assert_eq!(ap.status(), AccessPointStatus::Active);
    assert!(ap.is_configured_for(&roster()));
}

#[tokio::test(start_paused = true)]
async fn empty_roster_clears_radios_never_read() {
    const PREVIOUS: [&str; 6] = ["254", "1114", "7", "25", "9999", "42"];
    let device = FakeDevice::with_handler(|object, method, args, forms| match (object, method) {
        ("iwinfo", "info") => {
            let device = args["device"].as_str()?;
            let index = AP_INTERFACES.iter().position(|i| *i == device)?;
            let ssid = if forms >= 2 {
                format!("no-team-{}", index + 1)
            } else {
                PREVIOUS[index].to_owned()
            };
            Some(json!({ "ssid": ssid, "channel": 36 }))
        }
        (_, "get_clients") => Some(json!({ "freq": 5180, "clients": {} })),
        _ => None,
    });
    let ap = access_point(&device, &config(true));
    assert!(!ap.is_configured_for(&empty_roster()));

    ap.configure_team_wifi(&empty_roster()).await.unwrap();

    assert_eq!(device.count("uci set"), 6);
    assert_eq!(device.forms().len(), 2);
    assert_eq!(ap.status(), AccessPointStatus::Active);
    assert!(ap.is_configured_for(&empty_roster()));
}

#[tokio::test(start_paused = true)]
async fn configure_skips_push_when_radios_match() {
    let device = radios(CONFIGURED, 0);
    let ap = access_point(&device, &config(true));

    ap.configure_team_wifi(&roster()).await.unwrap();
    assert_eq!(device.count("uci set"), 0);
    assert!(device.forms().is_empty());

    // The published statuses now match, so nothing is sent at all.
    let before = device.calls().len();
    ap.configure_team_wifi(&roster()).await.unwrap();
    assert_eq!(device.calls().len(), before);
}

#[tokio::test(start_paused = true)]
async fn unapplied_configuration_exhausts_retries() {
    let device = radios(CONFIGURED, usize::MAX);
    let mut config = config(true);
    config.retry = RetryPolicy::new(2, Duration::from_secs(30));
    let ap = access_point(&device, &config);

    let err = ap.configure_team_wifi(&roster()).await.unwrap_err();
    match err {
        CoreError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, CoreError::NotApplied { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(device.forms().len(), 4);
    assert_eq!(ap.status(), AccessPointStatus::ConfigError);
}

#[tokio::test(start_paused = true)]
async fn team_without_key_is_refused() {
    let device = radios(CONFIGURED, 0);
    let ap = access_point(&device, &config(true));
    let mut roster = empty_roster();
    roster[2] = Some(Team::new(254));

    let err = ap.configure_team_wifi(&roster).await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert!(device.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn channel_change_is_committed_and_reloaded() {
    let device = radios(CONFIGURED, 0);
    let ap = access_point(&device, &config(true));

    ap.set_channel(149).await.unwrap();

    let names: Vec<_> = device.calls().iter().map(common::RecordedCall::name).collect();
    assert_eq!(
        names,
        vec!["session login", "uci set", "uci commit", "network.wireless reconf"]
    );
    assert_eq!(
        device.calls()[1].args,
        json!({ "config": "wireless", "section": "radio2", "values": { "channel": "149" } })
    );
    assert_eq!(ap.channel(), 149);
}
