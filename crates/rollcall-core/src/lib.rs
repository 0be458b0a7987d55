//! # Rollcall Core Library
//!
//! Core business logic for Rollcall, a voluntary attendance tracker for
//! organization members: clock in, clock out, and let two periodic
//! sweeps keep the ledger honest -- an inactivity detector that
//! confirms long-running sessions, and a quota scheduler that reminds
//! members who are behind their role goals.
//!
//! ## Architecture
//!
//! - **Attendance**: per-member session state machine over a durable
//!   ledger; every operation is one atomic (load, mutate, save) cycle
//! - **Sweeps**: inactivity detection and quota reminders, driven by
//!   interval timers behind one shared lock
//! - **Storage**: SQLite-backed ledger snapshot, TOML configuration
//! - **Boundaries**: notification, roster, and store traits for the
//!   platform collaborators
//!
//! ## Key Components
//!
//! - [`AttendanceTracker`]: member-initiated transitions and summaries
//! - [`AfkSweep`] / [`QuotaSweep`]: the two reconciliation passes
//! - [`AttendanceService`]: interval driver sharing one lock
//! - [`Config`]: thresholds and role goals, injected at startup

pub mod attendance;
pub mod config;
pub mod duration;
pub mod error;
pub mod events;
pub mod ids;
pub mod notify;
pub mod quota;
pub mod report;
pub mod roster;
pub mod service;
pub mod storage;

pub use attendance::{
    AfkReport, AfkSweep, AttendanceState, AttendanceTracker, Ledger, MemberRecord, OpenSession,
    SessionLog,
};
pub use config::{AfkConfig, Config, QuotaConfig, RoleGoal};
pub use duration::{format_duration, format_minutes, DurationParts};
pub use error::{ConfigError, CoreError, NotifyError, RosterError, StoreError};
pub use events::{CloseReason, Event};
pub use ids::{MemberId, RoleId};
pub use notify::{Delivery, Notice, Notifier};
pub use quota::{QuotaReport, QuotaSweep};
pub use report::{GoalProgress, MemberSummary, RankedMember};
pub use roster::{Roster, RosterEntry, StaticRoster};
pub use service::{AttendanceService, SweepHandles};
pub use storage::{MemoryStore, SqliteStore, Store};
