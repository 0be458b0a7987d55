pub mod clock;
pub mod config;
pub mod serve;
pub mod stats;

use std::sync::Arc;

use rollcall_core::{AttendanceTracker, SqliteStore};

/// Open the default ledger and wrap it in a tracker.
pub fn open_tracker() -> Result<AttendanceTracker, Box<dyn std::error::Error>> {
    Ok(AttendanceTracker::new(Arc::new(SqliteStore::open_default()?)))
}
