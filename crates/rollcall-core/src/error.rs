//! Core error types for rollcall-core.
//!
//! State violations are rejected at the API boundary with no mutation;
//! store failures abort the owning operation before any save; delivery
//! failures are recorded but never roll back a committed transition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for rollcall-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Clock-in attempted while a session is already open.
    #[error("already clocked in since {since}")]
    AlreadyActive { since: DateTime<Utc> },

    /// Clock-out attempted with no open session.
    #[error("not clocked in")]
    NotActive,

    /// Ledger store errors
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification transport errors
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Roster/membership lookup errors
    #[error("roster error: {0}")]
    Roster(#[from] RosterError),
}

/// Ledger store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the ledger database
    #[error("failed to open ledger at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record encoding/decoding failed
    #[error("ledger encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Persisted schema is newer than this build understands
    #[error("unsupported ledger schema version {found} (expected {expected})")]
    SchemaVersion { found: i64, expected: i64 },

    /// Store lock poisoned by a panicked writer
    #[error("store lock poisoned")]
    Poisoned,

    /// Filesystem errors (data directory, etc.)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to write the configuration file
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse TOML
    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Semantically invalid value
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Filesystem errors (config directory, etc.)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Notification transport errors.
///
/// Distinct from an undeliverable notice, which is a successful report
/// of a closed mailbox rather than a transport failure.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Roster/membership lookup errors.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("roster lookup failed: {0}")]
    Lookup(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
