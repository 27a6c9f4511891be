use serde::{Deserialize, Serialize};
use std::fmt;

/// Authority a user holds over a repository, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Collaborator,
    Viewer,
    None,
}

impl Role {
    /// Position in this table is the rank: lower index means more authority.
    pub const HIERARCHY: [Role; 5] = [
        Role::Owner,
        Role::Admin,
        Role::Collaborator,
        Role::Viewer,
        Role::None,
    ];

    pub fn rank(self) -> usize {
        Self::HIERARCHY
            .iter()
            .position(|role| *role == self)
            .unwrap_or(Self::HIERARCHY.len())
    }

    /// True if `self` carries strictly more authority than `other`.
    pub fn outranks(self, other: Role) -> bool {
        self.rank() < other.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Collaborator => "collaborator",
            Role::Viewer => "viewer",
            Role::None => "none",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of [`Role`] that can be granted through a role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignableRole {
    Admin,
    Collaborator,
    Viewer,
}

impl AssignableRole {
    pub const ALL: [AssignableRole; 3] = [
        AssignableRole::Admin,
        AssignableRole::Collaborator,
        AssignableRole::Viewer,
    ];

    pub fn role(self) -> Role {
        match self {
            AssignableRole::Admin => Role::Admin,
            AssignableRole::Collaborator => Role::Collaborator,
            AssignableRole::Viewer => Role::Viewer,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.role().as_str()
    }
}

impl fmt::Display for AssignableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<Role> for AssignableRole {
    type Error = Role;

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        match role {
            Role::Admin => Ok(AssignableRole::Admin),
            Role::Collaborator => Ok(AssignableRole::Collaborator),
            Role::Viewer => Ok(AssignableRole::Viewer),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role. Must be one of: admin, collaborator, viewer")]
pub struct InvalidRole(pub String);

impl std::str::FromStr for AssignableRole {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AssignableRole::Admin),
            "collaborator" => Ok(AssignableRole::Collaborator),
            "viewer" => Ok(AssignableRole::Viewer),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}
