// ── Station VLAN orchestrator ──
//
// One configuration run brings the field switch in line with a roster:
//
//   login → reset all six VLANs → commit → settle
//         → assign present teams → commit → back off
//
// The second commit and the back-off only happen when at least one team
// was assigned. Runs are serialized by the client mutex: a run holds it
// from login until it returns, so no other run can touch the session in
// between.

use std::time::Duration;

use fieldnet_api::ethernet::{ethernet_commit_calls, ethernet_config_calls};
use fieldnet_api::{HttpTransport, Transport, TransportConfig, UbusCall, UbusClient, VlanId};
use serde::Serialize;
use strum::Display;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::config::SwitchConfig;
use crate::error::CoreError;
use crate::model::Roster;
use crate::retry::RetryPolicy;
use crate::status::StatusGuard;

/// Published state of the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum SwitchStatus {
    /// No run has completed yet.
    Unknown,
    Configuring,
    Ready,
    /// The last run failed part way; the device may be half configured.
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EthernetReport {
    /// Station VLANs that received a team, with the team number.
    pub assigned: Vec<(VlanId, u32)>,
    /// Commit sequences issued (1 for an empty roster, otherwise 2).
    pub commits: u8,
}

/// Every call a run will issue, built before the first request.
#[derive(Debug, Clone)]
pub struct EthernetPlan {
    pub resets: Vec<UbusCall>,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub vlan: VlanId,
    pub team_id: u32,
    pub calls: Vec<UbusCall>,
}

impl EthernetPlan {
    /// Build the plan for `roster`. An underivable team address fails here,
    /// before the device is touched.
    pub fn for_roster(roster: &Roster) -> Result<Self, CoreError> {
        let mut resets = Vec::new();
        for vlan in VlanId::ALL {
            resets.extend(ethernet_config_calls(None, vlan.get())?);
        }

        let assignments = roster
            .iter()
            .zip(VlanId::ALL)
            .filter_map(|(team, vlan)| team.as_ref().map(|team| (vlan, team.id)))
            .map(|(vlan, team_id)| {
                Ok(Assignment {
                    vlan,
                    team_id,
                    calls: ethernet_config_calls(Some(team_id), vlan.get())?,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(Self {
            resets,
            assignments,
        })
    }
}

/// The field switch.
pub struct Switch<T = HttpTransport> {
    client: Mutex<UbusClient<T>>,
    status: watch::Sender<SwitchStatus>,
    settle: Duration,
    backoff: Duration,
}

impl Switch<HttpTransport> {
    pub fn new(config: &SwitchConfig) -> Result<Self, CoreError> {
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
        Ok(Self::with_client(client, config.settle, config.backoff))
    }
}

impl<T: Transport> Switch<T> {
    pub fn with_client(client: UbusClient<T>, settle: Duration, backoff: Duration) -> Self {
        let (status, _) = watch::channel(SwitchStatus::Unknown);
        Self {
            client: Mutex::new(client),
            status,
            settle,
            backoff,
        }
    }

    pub fn status(&self) -> SwitchStatus {
        *self.status.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SwitchStatus> {
        self.status.subscribe()
    }

    /// Configure the six station VLANs for `roster`.
    ///
    /// Waits for any run already in progress. A failure aborts the run at
    /// the failing call; earlier staged edits are not rolled back and the
    /// status becomes [`SwitchStatus::Failed`].
    pub async fn configure_team_ethernet(
        &self,
        roster: &Roster,
    ) -> Result<EthernetReport, CoreError> {
        let plan = EthernetPlan::for_roster(roster)?;

        let mut client = self.client.lock().await;
        let run = StatusGuard::enter(&self.status, SwitchStatus::Configuring);
        info!(teams = plan.assignments.len(), "configuring station vlans");

        match self.run(&mut client, &plan).await {
            Ok(report) => {
                info!(commits = report.commits, "station vlans configured");
                run.finish(SwitchStatus::Ready);
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, "station vlan configuration failed");
                run.finish(SwitchStatus::Failed);
                Err(err)
            }
        }
    }

    /// [`configure_team_ethernet`](Self::configure_team_ethernet) under a
    /// retry policy. Each attempt is a complete run.
    pub async fn configure_team_ethernet_with_retry(
        &self,
        roster: &Roster,
        policy: &RetryPolicy,
    ) -> Result<EthernetReport, CoreError> {
        policy
            .run(|_| self.configure_team_ethernet(roster))
            .await
    }

    async fn run(
        &self,
        client: &mut UbusClient<T>,
        plan: &EthernetPlan,
    ) -> Result<EthernetReport, CoreError> {
        client.login().await?;

        client.execute_all(&plan.resets).await?;
        client.execute_all(&ethernet_commit_calls()).await?;
        let mut commits = 1;
        debug!(settle = ?self.settle, "waiting for switch to settle");
        tokio::time::sleep(self.settle).await;

        let mut assigned = Vec::with_capacity(plan.assignments.len());
        for assignment in &plan.assignments {
            debug!(vlan = %assignment.vlan, team = assignment.team_id, "assigning team");
            client.execute_all(&assignment.calls).await?;
            assigned.push((assignment.vlan, assignment.team_id));
        }

        if !assigned.is_empty() {
            client.execute_all(&ethernet_commit_calls()).await?;
            commits += 1;
            debug!(backoff = ?self.backoff, "backing off after assignment");
            tokio::time::sleep(self.backoff).await;
        }

        Ok(EthernetReport { assigned, commits })
    }
}
