use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MemberId;

/// Why a session was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Member clocked out.
    Voluntary,
    /// Unanswered activity check; the detector closed the session.
    Inactivity,
}

/// Every attendance transition produces an Event.
/// The command surface prints them; the sweep driver logs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ClockedIn {
        member: MemberId,
        at: DateTime<Utc>,
    },
    ClockedOut {
        member: MemberId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        duration_seconds: u64,
        reason: CloseReason,
    },
    /// An inactivity prompt went out; the member must respond by
    /// `deadline` or the session is closed automatically.
    ConfirmationRequested {
        member: MemberId,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// A pending check was answered; the session continues with its
    /// original start time.
    ConfirmationCleared {
        member: MemberId,
        started_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The member the transition belongs to.
    pub fn member(&self) -> MemberId {
        match self {
            Event::ClockedIn { member, .. }
            | Event::ClockedOut { member, .. }
            | Event::ConfirmationRequested { member, .. }
            | Event::ConfirmationCleared { member, .. } => *member,
        }
    }
}
