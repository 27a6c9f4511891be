use crate::domain_model::*;
use crate::domain_port::StoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    #[error("Repository not found")]
    RepositoryNotFound,
    #[error("Current user not found")]
    CallerNotFound,
    #[error("User to add not found")]
    TargetNotFound,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Role state changed concurrently, gave up after {attempts} attempt(s)")]
    Conflict { attempts: u32 },
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for RoleError {
    fn from(error: StoreError) -> Self {
        RoleError::Store(error.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AssignRoleInput {
    pub repository_id: RepositoryId,
    pub caller_id: UserId,
    pub target_id: UserId,
    pub role: AssignableRole,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub repository_id: RepositoryId,
    pub target_id: UserId,
    pub previous_role: Role,
    pub role: AssignableRole,
    pub message: String,
}

#[async_trait::async_trait]
pub trait RoleService: Send + Sync {
    async fn assign_role(&self, input: AssignRoleInput) -> Result<RoleAssignment, RoleError>;
}
