//! Role and membership lookups.
//!
//! The live membership directory is an external collaborator; the core
//! only needs the organization roster and each member's role set.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RosterError};
use crate::ids::{MemberId, RoleId};

pub trait Roster: Send + Sync {
    /// Role identifiers currently held by one member.
    fn roles_of(&self, member: MemberId) -> Result<BTreeSet<RoleId>, RosterError>;

    /// The organization-wide member roster.
    fn members(&self) -> Result<Vec<MemberId>, RosterError>;
}

/// One roster entry: a member and the roles they hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: MemberId,
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,
}

/// Fixed roster loaded from a TOML file; stands in for a live
/// membership directory.
///
/// ```toml
/// [[members]]
/// id = 1342569124554866801
/// roles = [2, 3]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticRoster {
    #[serde(default)]
    members: Vec<RosterEntry>,
}

impl StaticRoster {
    pub fn new(members: Vec<RosterEntry>) -> Self {
        Self { members }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }
}

impl Roster for StaticRoster {
    fn roles_of(&self, member: MemberId) -> Result<BTreeSet<RoleId>, RosterError> {
        Ok(self
            .members
            .iter()
            .find(|entry| entry.id == member)
            .map(|entry| entry.roles.clone())
            .unwrap_or_default())
    }

    fn members(&self) -> Result<Vec<MemberId>, RosterError> {
        Ok(self.members.iter().map(|entry| entry.id).collect())
    }
}
