//! Outbound notification boundary.
//!
//! Delivery is an external collaborator concern; the core composes
//! notices and records outcomes. `Undeliverable` is a successful report
//! of a closed mailbox (e.g. direct messages disabled), not a transport
//! error -- the distinction matters for cooldown accounting.

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;
use crate::ids::MemberId;

/// Plain title/body content; the presentation layer decides rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Outcome of a direct-message attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Undeliverable,
}

/// Every notification channel implements this trait.
pub trait Notifier: Send + Sync {
    /// Send a direct notice to one member.
    fn send_direct(&self, member: MemberId, notice: &Notice) -> Result<Delivery, NotifyError>;

    /// Post to the fixed audit/reporting channel. Fire-and-forget:
    /// failure never rolls back a state transition already committed.
    fn send_audit(&self, notice: &Notice) -> Result<(), NotifyError>;
}
