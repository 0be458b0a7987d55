//! Attendance session lifecycle: records, member-initiated transitions,
//! and the inactivity detector.

pub mod afk;
mod record;
mod tracker;

pub use afk::{AfkReport, AfkSweep};
pub use record::{AttendanceState, Ledger, MemberRecord, OpenSession, SessionLog};
pub use tracker::AttendanceTracker;
