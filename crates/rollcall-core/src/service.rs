//! Periodic sweep driver.
//!
//! Wires the tracker and both sweeps onto tokio interval timers. One
//! async mutex serializes every (load, mutate, save) cycle -- member
//! actions and sweep passes alike -- so a clock-out can never race a
//! detection pass on the same record. Delayed missed-tick behavior
//! keeps at most one firing of each sweep in flight.
//!
//! A failed pass is logged and skipped; nothing here is fatal to the
//! process.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::attendance::{AfkReport, AfkSweep, AttendanceTracker};
use crate::config::Config;
use crate::error::CoreError;
use crate::events::Event;
use crate::ids::MemberId;
use crate::notify::Notifier;
use crate::quota::{QuotaReport, QuotaSweep};
use crate::roster::Roster;

pub struct AttendanceService {
    tracker: Arc<Mutex<AttendanceTracker>>,
    afk: AfkSweep,
    quota: QuotaSweep,
    roster: Arc<dyn Roster>,
    notifier: Arc<dyn Notifier>,
    afk_interval: std::time::Duration,
    quota_interval: std::time::Duration,
}

/// Handles for the two sweep loops.
pub struct SweepHandles {
    pub afk: JoinHandle<()>,
    pub quota: JoinHandle<()>,
}

impl SweepHandles {
    pub fn abort(&self) {
        self.afk.abort();
        self.quota.abort();
    }
}

impl AttendanceService {
    pub fn new(
        tracker: AttendanceTracker,
        config: &Config,
        roster: Arc<dyn Roster>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            afk: AfkSweep::new(config.afk.clone()),
            quota: QuotaSweep::new(config.quota.clone(), config.goals.clone()),
            roster,
            notifier,
            afk_interval: config.afk.sweep_interval(),
            quota_interval: config.quota.sweep_interval(),
        }
    }

    // ── Member actions ───────────────────────────────────────────────

    pub async fn clock_in(&self, member: MemberId, now: DateTime<Utc>) -> Result<Event, CoreError> {
        self.tracker.lock().await.clock_in(member, now)
    }

    pub async fn clock_out(
        &self,
        member: MemberId,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        self.tracker.lock().await.clock_out(member, now)
    }

    pub async fn confirm_active(
        &self,
        member: MemberId,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, CoreError> {
        self.tracker.lock().await.confirm_active(member, now)
    }

    // ── Sweep passes ─────────────────────────────────────────────────

    /// Run one inactivity pass under the service lock.
    pub async fn run_afk_pass(&self, now: DateTime<Utc>) -> Result<AfkReport, CoreError> {
        let tracker = self.tracker.lock().await;
        self.afk.run(&tracker, self.notifier.as_ref(), now)
    }

    /// Run one reminder pass under the service lock.
    pub async fn run_quota_pass(&self, now: DateTime<Utc>) -> Result<QuotaReport, CoreError> {
        let tracker = self.tracker.lock().await;
        self.quota
            .run(&tracker, self.roster.as_ref(), self.notifier.as_ref(), now)
    }

    /// Spawn both sweep loops. They run until aborted.
    pub fn spawn_sweeps(self: Arc<Self>) -> SweepHandles {
        let afk_service = Arc::clone(&self);
        let afk = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(afk_service.afk_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match afk_service.run_afk_pass(Utc::now()).await {
                    Ok(report) => {
                        if !report.is_quiet() {
                            info!(
                                prompted = report.prompted.len(),
                                closed = report.closed.len(),
                                "inactivity pass complete"
                            );
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "inactivity pass failed, retrying next interval");
                    }
                }
            }
        });

        let quota_service = self;
        let quota = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(quota_service.quota_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match quota_service.run_quota_pass(Utc::now()).await {
                    Ok(report) => {
                        if !report.is_quiet() {
                            info!(
                                notified = report.notified.len(),
                                unreachable = report.unreachable.len(),
                                "reminder pass complete"
                            );
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "reminder pass failed, retrying next interval");
                    }
                }
            }
        });

        SweepHandles { afk, quota }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::AttendanceState;
    use crate::notify::testing::RecordingNotifier;
    use crate::roster::{RosterEntry, StaticRoster};
    use crate::storage::{MemoryStore, Store};
    use chrono::Duration;

    const MEMBER: MemberId = MemberId(5);

    fn service_with(notifier: Arc<RecordingNotifier>) -> (AttendanceService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let tracker = AttendanceTracker::new(store.clone());
        let roster = Arc::new(StaticRoster::new(vec![RosterEntry {
            id: MEMBER,
            roles: [crate::ids::RoleId(1)].into(),
        }]));
        let mut config = Config::default();
        config.goals = vec![crate::config::RoleGoal {
            role: crate::ids::RoleId(1),
            label: "Helper".into(),
            goal_seconds: 1800,
        }];
        (
            AttendanceService::new(tracker, &config, roster, notifier),
            store,
        )
    }

    #[tokio::test]
    async fn member_actions_and_sweeps_share_one_lock() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, store) = service_with(notifier.clone());
        let t0 = Utc::now();

        service.clock_in(MEMBER, t0).await.expect("clock in");

        // Detector promotes, member confirms, clocks out later.
        let report = service
            .run_afk_pass(t0 + Duration::hours(3))
            .await
            .expect("afk pass");
        assert_eq!(report.prompted.len(), 1);
        assert_eq!(report.prompted[0].member(), MEMBER);

        service
            .confirm_active(MEMBER, t0 + Duration::hours(3) + Duration::minutes(5))
            .await
            .expect("confirm");
        service
            .clock_out(MEMBER, t0 + Duration::hours(5))
            .await
            .expect("clock out");

        let ledger = store.load().expect("load");
        assert_eq!(ledger[&MEMBER].state(), AttendanceState::Idle);
        assert_eq!(ledger[&MEMBER].total_seconds(), 18_000);
    }

    #[tokio::test]
    async fn quota_pass_runs_against_shared_state() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _) = service_with(notifier.clone());

        let report = service.run_quota_pass(Utc::now()).await.expect("pass");
        assert_eq!(report.notified, vec![MEMBER]);
        assert_eq!(notifier.direct_count(), 1);
    }

    #[tokio::test]
    async fn sweep_loops_spawn_and_abort() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _) = service_with(notifier);
        let service = Arc::new(service);

        let handles = service.spawn_sweeps();
        handles.abort();
        assert!(handles.afk.await.expect_err("aborted").is_cancelled());
        assert!(handles.quota.await.expect_err("aborted").is_cancelled());
    }
}
