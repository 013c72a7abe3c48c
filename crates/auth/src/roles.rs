use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// The set is closed: every role a guard references or a credential row stores
/// must be one of these variants. Raw text only appears at the store and wire
/// boundaries, where it is parsed with [`Role::from_str`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Sales,
    Project,
    ProjectManager,
    Designer,
    Printing,
    Logistics,
    Accounts,
    Hr,
    Staff,
    Crm,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    /// The full registry, in declaration order.
    pub const ALL: [Role; 11] = [
        Role::Admin,
        Role::Sales,
        Role::Project,
        Role::ProjectManager,
        Role::Designer,
        Role::Printing,
        Role::Logistics,
        Role::Accounts,
        Role::Hr,
        Role::Staff,
        Role::Crm,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Project => "project",
            Role::ProjectManager => "project_manager",
            Role::Designer => "designer",
            Role::Printing => "printing",
            Role::Logistics => "logistics",
            Role::Accounts => "accounts",
            Role::Hr => "hr",
            Role::Staff => "staff",
            Role::Crm => "crm",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
