//! Ledger persistence.
//!
//! The core treats the store as a simple durable snapshot: `load` the
//! whole ledger, mutate it, `save` it back. Atomicity across concurrent
//! operations comes from the caller's locking discipline (see
//! `service`), not from the store itself.

mod sqlite;

pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Mutex;

use crate::attendance::Ledger;
use crate::error::StoreError;

pub trait Store: Send + Sync {
    /// Read the full ledger snapshot.
    fn load(&self) -> Result<Ledger, StoreError>;

    /// Replace the persisted snapshot.
    fn save(&self, ledger: &Ledger) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Ledger, StoreError> {
        Ok(self.ledger.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        *self.ledger.lock().map_err(|_| StoreError::Poisoned)? = ledger.clone();
        Ok(())
    }
}

/// Returns `~/.config/rollcall[-dev]/` based on ROLLCALL_ENV, creating
/// it if needed. ROLLCALL_DATA_DIR overrides the path entirely.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = if let Ok(dir) = std::env::var("ROLLCALL_DATA_DIR") {
        PathBuf::from(dir)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");

        let env = std::env::var("ROLLCALL_ENV").unwrap_or_else(|_| "production".to_string());

        if env == "dev" {
            base_dir.join("rollcall-dev")
        } else {
            base_dir.join("rollcall")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
