//! Inactivity detection.
//!
//! One sweep does two things, per member and independently of other
//! members: long-open `Active` sessions are promoted to
//! `PendingConfirmation` with a response deadline, and pending sessions
//! whose deadline has lapsed are force-closed with the same accounting
//! as a voluntary clock-out.
//!
//! All state transitions commit before any notice goes out, so an
//! undeliverable prompt leaves the member pending and the deadline
//! still governs eventual resolution. A sweep never re-prompts a member
//! whose check is already outstanding; re-running a pass with no
//! elapsed time is a no-op. After an answered check, the next check
//! window measures from the confirmation instant.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::attendance::tracker::AttendanceTracker;
use crate::config::AfkConfig;
use crate::duration::format_duration;
use crate::error::CoreError;
use crate::events::{CloseReason, Event};
use crate::ids::MemberId;
use crate::notify::{Delivery, Notice, Notifier};

/// Outcome of one detection pass.
#[derive(Debug, Default)]
pub struct AfkReport {
    /// `ConfirmationRequested` events for members newly prompted.
    pub prompted: Vec<Event>,
    /// Prompted members whose direct notice could not be delivered.
    pub undeliverable: Vec<MemberId>,
    /// `ClockedOut` events for sessions closed after an expired window.
    pub closed: Vec<Event>,
}

impl AfkReport {
    pub fn is_quiet(&self) -> bool {
        self.prompted.is_empty() && self.closed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AfkSweep {
    config: AfkConfig,
}

impl AfkSweep {
    pub fn new(config: AfkConfig) -> Self {
        Self { config }
    }

    /// Run one detection pass at `now`.
    pub fn run(
        &self,
        tracker: &AttendanceTracker,
        notifier: &dyn Notifier,
        now: DateTime<Utc>,
    ) -> Result<AfkReport, CoreError> {
        let mut ledger = tracker.load()?;
        let mut report = AfkReport::default();
        let mut dirty = false;

        for (&member, record) in ledger.iter_mut() {
            let Some(open) = record.open.as_mut() else {
                continue;
            };
            match open.response_deadline {
                None => {
                    let reference = open.confirmed_at.unwrap_or(open.started_at);
                    if now - reference >= self.config.check_after() {
                        let deadline = now + self.config.respond_within();
                        open.response_deadline = Some(deadline);
                        record.afk_check_outstanding = true;
                        report.prompted.push(Event::ConfirmationRequested {
                            member,
                            deadline,
                            at: now,
                        });
                        dirty = true;
                    }
                }
                Some(deadline) => {
                    // The flag is cleared by a confirmation that won the
                    // race; without it the deadline is dead.
                    if record.afk_check_outstanding && now >= deadline {
                        if let Some(log) = record.close_open(now) {
                            report.closed.push(Event::ClockedOut {
                                member,
                                start: log.start,
                                end: log.end,
                                duration_seconds: log.duration_seconds,
                                reason: CloseReason::Inactivity,
                            });
                            dirty = true;
                        }
                    }
                }
            }
        }

        if dirty {
            tracker.save(&ledger)?;
        }

        for event in &report.prompted {
            let member = event.member();
            match notifier.send_direct(member, &self.confirmation_prompt()) {
                Ok(Delivery::Delivered) => {
                    info!(%member, "inactivity prompt sent");
                }
                Ok(Delivery::Undeliverable) => {
                    warn!(%member, "inactivity prompt undeliverable, deadline stands");
                    report.undeliverable.push(member);
                }
                Err(err) => {
                    warn!(%member, error = %err, "inactivity prompt failed, deadline stands");
                    report.undeliverable.push(member);
                }
            }
        }

        for event in &report.closed {
            if let Event::ClockedOut {
                member,
                duration_seconds,
                ..
            } = event
            {
                info!(%member, duration_seconds, "session closed for inactivity");
                if let Err(err) = notifier.send_audit(&self.closure_audit(*member, *duration_seconds)) {
                    warn!(%member, error = %err, "audit notice failed");
                }
            }
        }

        Ok(report)
    }

    fn confirmation_prompt(&self) -> Notice {
        Notice::new(
            "Activity check",
            format!(
                "Your attendance session has been open for over {}. \
                 Confirm you are still active within {} or the session \
                 will be closed automatically.",
                format_duration(self.config.check_after_secs as i64),
                format_duration(self.config.respond_within_secs as i64),
            ),
        )
    }

    fn closure_audit(&self, member: MemberId, duration_seconds: u64) -> Notice {
        Notice::new(
            "Session closed due to inactivity",
            format!(
                "Member {member} did not respond to the activity check. \
                 The session was closed automatically after {}.",
                format_duration(duration_seconds as i64),
            ),
        )
    }
}
