//! Quota reminders.
//!
//! One pass walks the organization roster and reminds idle members who
//! hold a goal role but have not reached every applicable goal.
//! Reminders are cooldown-gated per member; the cooldown only advances
//! on a delivered notice, so an unreachable member is retried on the
//! next pass. Each pass ends with at most one batched audit summary.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::attendance::{AttendanceState, AttendanceTracker};
use crate::config::{QuotaConfig, RoleGoal};
use crate::duration::format_minutes;
use crate::error::CoreError;
use crate::ids::MemberId;
use crate::notify::{Delivery, Notice, Notifier};
use crate::roster::Roster;

/// Outcome of one reminder pass.
#[derive(Debug, Default)]
pub struct QuotaReport {
    /// Members whose reminder was delivered; their cooldown advanced.
    pub notified: Vec<MemberId>,
    /// Members with unmet goals whose reminder could not be delivered.
    pub unreachable: Vec<MemberId>,
    /// Members skipped because a reminder went out within the cooldown.
    pub skipped_cooldown: usize,
}

impl QuotaReport {
    pub fn is_quiet(&self) -> bool {
        self.notified.is_empty() && self.unreachable.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct QuotaSweep {
    config: QuotaConfig,
    goals: Vec<RoleGoal>,
}

impl QuotaSweep {
    pub fn new(config: QuotaConfig, goals: Vec<RoleGoal>) -> Self {
        Self { config, goals }
    }

    /// Run one reminder pass at `now`.
    pub fn run(
        &self,
        tracker: &AttendanceTracker,
        roster: &dyn Roster,
        notifier: &dyn Notifier,
        now: DateTime<Utc>,
    ) -> Result<QuotaReport, CoreError> {
        let members = roster.members()?;
        let mut ledger = tracker.load()?;
        let mut report = QuotaReport::default();

        for member in members {
            let record = ledger.get(&member);

            // Members with an open session are already engaged.
            if record.map(|r| r.state()) == Some(AttendanceState::Active)
                || record.map(|r| r.state()) == Some(AttendanceState::PendingConfirmation)
            {
                continue;
            }

            let roles = roster.roles_of(member)?;
            let applicable: Vec<&RoleGoal> = self
                .goals
                .iter()
                .filter(|goal| roles.contains(&goal.role))
                .collect();
            if applicable.is_empty() {
                continue;
            }

            if let Some(last) = record.and_then(|r| r.last_quota_notice) {
                if now - last < self.config.cooldown() {
                    report.skipped_cooldown += 1;
                    continue;
                }
            }

            let accumulated = record.map(|r| r.total_seconds()).unwrap_or(0);
            let unmet: Vec<&RoleGoal> = applicable
                .into_iter()
                .filter(|goal| accumulated < goal.goal_seconds)
                .collect();
            if unmet.is_empty() {
                continue;
            }

            let notice = reminder_notice(accumulated, &unmet);
            match notifier.send_direct(member, &notice) {
                Ok(Delivery::Delivered) => {
                    ledger.entry(member).or_default().last_quota_notice = Some(now);
                    report.notified.push(member);
                    info!(%member, unmet = unmet.len(), "quota reminder sent");
                }
                Ok(Delivery::Undeliverable) => {
                    report.unreachable.push(member);
                    warn!(%member, "quota reminder undeliverable, will retry next pass");
                }
                Err(err) => {
                    report.unreachable.push(member);
                    warn!(%member, error = %err, "quota reminder failed, will retry next pass");
                }
            }
        }

        if !report.notified.is_empty() {
            tracker.save(&ledger)?;
        }

        if !report.is_quiet() {
            if let Err(err) = notifier.send_audit(&pass_audit(&report, now)) {
                warn!(error = %err, "quota audit notice failed");
            }
        }

        Ok(report)
    }
}

fn reminder_notice(accumulated: u64, unmet: &[&RoleGoal]) -> Notice {
    let mut body = String::from(
        "A friendly reminder about your voluntary activity goals:\n\n",
    );
    for goal in unmet {
        body.push_str(&format!(
            "- **{}**: `{} / {}` minutes\n",
            goal.label,
            format_minutes(accumulated as i64),
            format_minutes(goal.goal_seconds as i64),
        ));
    }
    body.push_str("\nClock in whenever you have time to contribute.");
    Notice::new("Activity reminder", body)
}

fn pass_audit(report: &QuotaReport, at: DateTime<Utc>) -> Notice {
    let mut lines = Vec::new();
    for member in &report.notified {
        lines.push(format!("- {member}: reminder delivered"));
    }
    for member in &report.unreachable {
        lines.push(format!("- {member}: not notified (unreachable)"));
    }
    Notice::new(
        "Activity goal reminders",
        format!("Reminder pass at {at}:\n{}", lines.join("\n")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuotaConfig;
    use crate::ids::RoleId;
    use crate::notify::testing::RecordingNotifier;
    use crate::roster::{RosterEntry, StaticRoster};
    use crate::storage::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    const HELPER: MemberId = MemberId(1);
    const ADMIN: MemberId = MemberId(2);

    fn goals() -> Vec<RoleGoal> {
        vec![
            RoleGoal {
                role: RoleId(10),
                label: "Helper".into(),
                goal_seconds: 1800,
            },
            RoleGoal {
                role: RoleId(20),
                label: "Admin".into(),
                goal_seconds: 5400,
            },
        ]
    }

    fn roster() -> StaticRoster {
        StaticRoster::new(vec![
            RosterEntry {
                id: HELPER,
                roles: [RoleId(10)].into(),
            },
            RosterEntry {
                id: ADMIN,
                roles: [RoleId(10), RoleId(20)].into(),
            },
            RosterEntry {
                id: MemberId(3),
                roles: Default::default(),
            },
        ])
    }

    fn setup() -> (AttendanceTracker, QuotaSweep) {
        let tracker = AttendanceTracker::new(Arc::new(MemoryStore::new()));
        let sweep = QuotaSweep::new(QuotaConfig::default(), goals());
        (tracker, sweep)
    }

    #[test]
    fn reminds_each_unmet_goal_and_advances_cooldown() {
        let (tracker, sweep) = setup();
        let notifier = RecordingNotifier::default();
        let now = Utc::now();

        let report = sweep
            .run(&tracker, &roster(), &notifier, now)
            .expect("sweep");

        assert_eq!(report.notified, vec![HELPER, ADMIN]);
        assert_eq!(report.skipped_cooldown, 0);

        // The admin holds both goal roles; their notice lists both.
        let notices = notifier.direct_to(ADMIN);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].body.contains("Helper"));
        assert!(notices[0].body.contains("Admin"));
        assert!(notices[0].body.contains("`0 / 90` minutes"));

        let ledger = tracker.load().expect("load");
        assert_eq!(ledger[&HELPER].last_quota_notice, Some(now));
    }

    #[test]
    fn cooldown_suppresses_then_releases() {
        let (tracker, sweep) = setup();
        let notifier = RecordingNotifier::default();
        let now = Utc::now();

        sweep
            .run(&tracker, &roster(), &notifier, now)
            .expect("first");
        let within = sweep
            .run(&tracker, &roster(), &notifier, now + Duration::hours(1))
            .expect("within cooldown");
        assert!(within.is_quiet());
        assert_eq!(within.skipped_cooldown, 2);

        let after = sweep
            .run(&tracker, &roster(), &notifier, now + Duration::hours(6))
            .expect("after cooldown");
        assert_eq!(after.notified, vec![HELPER, ADMIN]);
    }

    #[test]
    fn met_goals_are_not_reminded() {
        let (tracker, sweep) = setup();
        let notifier = RecordingNotifier::default();
        let t0 = Utc::now() - Duration::hours(2);

        // Helper banks 45 minutes, past their 30-minute goal.
        tracker.clock_in(HELPER, t0).expect("clock in");
        tracker
            .clock_out(HELPER, t0 + Duration::minutes(45))
            .expect("clock out");

        let report = sweep
            .run(&tracker, &roster(), &notifier, Utc::now())
            .expect("sweep");

        assert_eq!(report.notified, vec![ADMIN]);
        assert!(notifier.direct_to(HELPER).is_empty());
    }

    #[test]
    fn engaged_members_are_excluded() {
        let (tracker, sweep) = setup();
        let notifier = RecordingNotifier::default();
        let now = Utc::now();

        tracker.clock_in(HELPER, now).expect("clock in");

        let report = sweep
            .run(&tracker, &roster(), &notifier, now)
            .expect("sweep");

        assert_eq!(report.notified, vec![ADMIN]);
        assert!(notifier.direct_to(HELPER).is_empty());
    }

    #[test]
    fn undeliverable_reminder_retries_next_pass() {
        let (tracker, sweep) = setup();
        let notifier = RecordingNotifier::unreachable_for([HELPER]);
        let now = Utc::now();

        let first = sweep
            .run(&tracker, &roster(), &notifier, now)
            .expect("first");
        assert_eq!(first.unreachable, vec![HELPER]);

        // No cooldown was recorded, so the very next pass retries.
        let second = sweep
            .run(&tracker, &roster(), &notifier, now + Duration::hours(1))
            .expect("second");
        assert_eq!(second.unreachable, vec![HELPER]);
        assert_eq!(notifier.direct_to(HELPER).len(), 2);
    }

    #[test]
    fn one_batched_audit_per_pass() {
        let (tracker, sweep) = setup();
        let notifier = RecordingNotifier::unreachable_for([HELPER]);

        sweep
            .run(&tracker, &roster(), &notifier, Utc::now())
            .expect("sweep");

        assert_eq!(notifier.audit_count(), 1);
        let audit = notifier.last_audit().expect("audit");
        assert!(audit.body.contains(&format!("{ADMIN}: reminder delivered")));
        assert!(audit.body.contains(&format!("{HELPER}: not notified")));
    }

    #[test]
    fn quiet_pass_sends_no_audit() {
        let (tracker, sweep) = setup();
        let notifier = RecordingNotifier::default();
        let now = Utc::now();

        sweep
            .run(&tracker, &roster(), &notifier, now)
            .expect("first");
        notifier.audit.lock().expect("lock").clear();

        // Everyone is inside the cooldown; nothing to report.
        let report = sweep
            .run(&tracker, &roster(), &notifier, now)
            .expect("second");
        assert!(report.is_quiet());
        assert_eq!(notifier.audit_count(), 0);
    }
}
