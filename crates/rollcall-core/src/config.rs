//! TOML-based service configuration.
//!
//! Thresholds, sweep intervals, and role goals are injected at startup
//! rather than compiled in, so tests can run with compressed windows.
//!
//! Stored at `~/.config/rollcall/config.toml`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ids::RoleId;
use crate::storage::data_dir;

/// Inactivity detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfkConfig {
    /// Continuous session time before a confirmation prompt goes out.
    #[serde(default = "default_check_after_secs")]
    pub check_after_secs: u64,
    /// Response window before an unanswered session is force-closed.
    #[serde(default = "default_respond_within_secs")]
    pub respond_within_secs: u64,
    /// Detection pass cadence.
    #[serde(default = "default_afk_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl AfkConfig {
    pub fn check_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.check_after_secs as i64)
    }

    pub fn respond_within(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.respond_within_secs as i64)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for AfkConfig {
    fn default() -> Self {
        Self {
            check_after_secs: default_check_after_secs(),
            respond_within_secs: default_respond_within_secs(),
            sweep_interval_secs: default_afk_sweep_interval_secs(),
        }
    }
}

/// Quota reminder thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Minimum gap between successive reminders to one member.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Reminder pass cadence.
    #[serde(default = "default_quota_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl QuotaConfig {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            sweep_interval_secs: default_quota_sweep_interval_secs(),
        }
    }
}

/// A cumulative-time goal attached to one role. Members holding several
/// goal roles are measured against each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGoal {
    pub role: RoleId,
    pub label: String,
    pub goal_seconds: u64,
}

/// Service configuration.
///
/// Serialized to/from TOML at `~/.config/rollcall/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub afk: AfkConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default = "default_goals")]
    pub goals: Vec<RoleGoal>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            afk: AfkConfig::default(),
            quota: QuotaConfig::default(),
            goals: default_goals(),
        }
    }
}

impl Config {
    /// Configuration file path under the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default path; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Config =
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    /// Reject windows that cannot resolve and ambiguous goal tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.afk.respond_within_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "afk.respond_within_secs".into(),
                message: "response window must be non-zero".into(),
            });
        }
        let mut seen = BTreeSet::new();
        for goal in &self.goals {
            if !seen.insert(goal.role) {
                return Err(ConfigError::InvalidValue {
                    key: "goals".into(),
                    message: format!("duplicate goal for role {}", goal.role),
                });
            }
        }
        Ok(())
    }
}

// Default functions; windows mirror the original deployment.
fn default_check_after_secs() -> u64 {
    3 * 3600
}
fn default_respond_within_secs() -> u64 {
    10 * 60
}
fn default_afk_sweep_interval_secs() -> u64 {
    5 * 60
}
fn default_cooldown_secs() -> u64 {
    6 * 3600
}
fn default_quota_sweep_interval_secs() -> u64 {
    3600
}
fn default_goals() -> Vec<RoleGoal> {
    vec![
        RoleGoal {
            role: RoleId(1),
            label: "Trainee".into(),
            goal_seconds: 25 * 60,
        },
        RoleGoal {
            role: RoleId(2),
            label: "Helper".into(),
            goal_seconds: 30 * 60,
        },
        RoleGoal {
            role: RoleId(3),
            label: "Moderator".into(),
            goal_seconds: 60 * 60,
        },
        RoleGoal {
            role: RoleId(4),
            label: "Admin".into(),
            goal_seconds: 90 * 60,
        },
    ]
}
