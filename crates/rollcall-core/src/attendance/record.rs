//! Per-member attendance records and the persisted ledger.
//!
//! State is derived, never stored twice: no open session means `Idle`,
//! an open session without a response deadline means `Active`, and a
//! set deadline means `PendingConfirmation`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    Idle,
    Active,
    PendingConfirmation,
}

/// One open session.
///
/// `response_deadline` is set only while the member is pending an
/// inactivity confirmation; the start time never changes while open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSession {
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub response_deadline: Option<DateTime<Utc>>,
    /// Set when a pending check is answered; the next inactivity check
    /// measures continuous time from here instead of the start.
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl OpenSession {
    pub fn starting(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            response_deadline: None,
            confirmed_at: None,
        }
    }
}

/// One closed session interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLog {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_seconds: u64,
}

impl SessionLog {
    /// Close an interval, saturating a negative span to zero.
    pub fn close(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let duration_seconds = (end - start).num_seconds().max(0) as u64;
        Self {
            start,
            end,
            duration_seconds,
        }
    }
}

/// Everything the ledger keeps for one member. Created lazily on first
/// clock-in; never deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub open: Option<OpenSession>,
    /// Append-only; insertion order is chronological order.
    #[serde(default)]
    pub completed: Vec<SessionLog>,
    /// Last successful quota reminder. Monotonic.
    #[serde(default)]
    pub last_quota_notice: Option<DateTime<Utc>>,
    /// Mirrors `PendingConfirmation`; guards against duplicate prompts
    /// within a detection pass.
    #[serde(default)]
    pub afk_check_outstanding: bool,
}

impl MemberRecord {
    pub fn state(&self) -> AttendanceState {
        match &self.open {
            None => AttendanceState::Idle,
            Some(open) if open.response_deadline.is_none() => AttendanceState::Active,
            Some(_) => AttendanceState::PendingConfirmation,
        }
    }

    /// Total accumulated seconds across completed sessions. An open
    /// session does not count until it is closed.
    pub fn total_seconds(&self) -> u64 {
        self.completed.iter().map(|log| log.duration_seconds).sum()
    }

    /// The `count` most recent completed sessions, most-recent-first.
    pub fn recent_sessions(&self, count: usize) -> Vec<SessionLog> {
        self.completed.iter().rev().take(count).cloned().collect()
    }

    /// Close the open session through `end`, appending it to the
    /// completed log and clearing the outstanding-check flag. Returns
    /// `None` when no session is open.
    pub(crate) fn close_open(&mut self, end: DateTime<Utc>) -> Option<SessionLog> {
        let open = self.open.take()?;
        let log = SessionLog::close(open.started_at, end);
        self.completed.push(log.clone());
        self.afk_check_outstanding = false;
        Some(log)
    }
}

/// The full persisted snapshot: one record per member, ordered by id.
/// BTreeMap iteration doubles as the documented ranking tie-break.
pub type Ledger = BTreeMap<MemberId, MemberRecord>;
