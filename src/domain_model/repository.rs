use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct RepositoryId(pub uuid::Uuid);

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RepositoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(RepositoryId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: RepositoryId,
    pub owner_id: UserId,
    pub name: RepositoryName,
    pub description: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryNameError {
    #[error("Name must be 1-100 characters")]
    Length,
    #[error("Name cannot start with '.' or '-'")]
    LeadingSymbol,
    #[error("Name can only contain letters, numbers, dash, underscore, dot")]
    InvalidCharacter,
}

/// Repository name, unique per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub const MAX_LEN: usize = 100;

    pub fn parse(name: &str) -> Result<Self, RepositoryNameError> {
        if name.is_empty() || name.len() > Self::MAX_LEN {
            return Err(RepositoryNameError::Length);
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Err(RepositoryNameError::LeadingSymbol);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(RepositoryNameError::InvalidCharacter);
        }

        Ok(RepositoryName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_usual_names() {
        for name in ["repohub", "my-repo", "my_repo.rs", "R2D2", "a"] {
            assert_eq!(RepositoryName::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(RepositoryName::parse(""), Err(RepositoryNameError::Length));
        assert_eq!(
            RepositoryName::parse(&"x".repeat(101)),
            Err(RepositoryNameError::Length)
        );
        assert_eq!(
            RepositoryName::parse(".hidden"),
            Err(RepositoryNameError::LeadingSymbol)
        );
        assert_eq!(
            RepositoryName::parse("-flag"),
            Err(RepositoryNameError::LeadingSymbol)
        );
        assert_eq!(
            RepositoryName::parse("has space"),
            Err(RepositoryNameError::InvalidCharacter)
        );
        assert_eq!(
            RepositoryName::parse("../etc"),
            Err(RepositoryNameError::LeadingSymbol)
        );
    }
}
