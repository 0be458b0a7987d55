//! Summary and ranking aggregation.
//!
//! Pure functions over member records; no side effects. Goal
//! percentages are deliberately uncapped -- a member past their goal
//! shows over 100%.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attendance::{AttendanceState, Ledger, MemberRecord, SessionLog};
use crate::config::RoleGoal;
use crate::ids::{MemberId, RoleId};

/// How many completed sessions a summary lists.
pub const RECENT_SESSIONS: usize = 5;

/// Progress against one applicable role goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProgress {
    pub role: RoleId,
    pub label: String,
    pub accumulated_seconds: u64,
    pub goal_seconds: u64,
    /// Uncapped; 250.0 means two and a half times the goal.
    pub percent: f64,
}

/// Read-only view of one member's attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member: MemberId,
    pub state: AttendanceState,
    pub total_seconds: u64,
    /// Start of the open session, when one exists.
    pub open_since: Option<DateTime<Utc>>,
    pub goals: Vec<GoalProgress>,
    /// Most-recent-first.
    pub recent: Vec<SessionLog>,
}

/// One ranking row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMember {
    pub member: MemberId,
    pub total_seconds: u64,
}

/// Uncapped percentage; a zero-second goal counts as met.
pub fn percent_of_goal(accumulated: u64, goal: u64) -> f64 {
    if goal == 0 {
        100.0
    } else {
        accumulated as f64 / goal as f64 * 100.0
    }
}

pub fn summarize(
    member: MemberId,
    record: &MemberRecord,
    roles: &BTreeSet<RoleId>,
    goals: &[RoleGoal],
) -> MemberSummary {
    let total = record.total_seconds();
    let goals = goals
        .iter()
        .filter(|goal| roles.contains(&goal.role))
        .map(|goal| GoalProgress {
            role: goal.role,
            label: goal.label.clone(),
            accumulated_seconds: total,
            goal_seconds: goal.goal_seconds,
            percent: percent_of_goal(total, goal.goal_seconds),
        })
        .collect();

    MemberSummary {
        member,
        state: record.state(),
        total_seconds: total,
        open_since: record.open.as_ref().map(|open| open.started_at),
        goals,
        recent: record.recent_sessions(RECENT_SESSIONS),
    }
}

/// Totals per member with at least one completed session, descending.
/// Ties break by member id ascending (ledger iteration order, kept by
/// the stable sort).
pub fn rank(ledger: &Ledger) -> Vec<RankedMember> {
    let mut ranked: Vec<RankedMember> = ledger
        .iter()
        .filter(|(_, record)| !record.completed.is_empty())
        .map(|(&member, record)| RankedMember {
            member,
            total_seconds: record.total_seconds(),
        })
        .collect();
    ranked.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));
    ranked
}
