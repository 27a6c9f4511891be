use crate::domain_model::*;
use crate::domain_port::StoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Validation(String),
    #[error("No Such user found")]
    OwnerNotFound,
    #[error("Repository not found")]
    NotFound,
    #[error("Repository with same name already exists!")]
    AlreadyExists,
    #[error("Not Allowed to access!")]
    AccessDenied,
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for RepositoryError {
    fn from(error: StoreError) -> Self {
        RepositoryError::Store(error.to_string())
    }
}

impl From<RepositoryNameError> for RepositoryError {
    fn from(error: RepositoryNameError) -> Self {
        RepositoryError::Validation(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateRepositoryInput {
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameCheck {
    pub available: bool,
    pub message: String,
}

/// A repository together with everyone who holds a role on it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAccessView {
    pub repository: Repository,
    pub owner: UserSummary,
    pub admins: Vec<UserSummary>,
    pub collaborators: Vec<UserSummary>,
    pub viewers: Vec<UserSummary>,
    /// Role of the requesting user, `none` for anonymous or outside viewers.
    pub viewer_role: Role,
}

#[async_trait::async_trait]
pub trait RepositoryService: Send + Sync {
    async fn create(&self, input: CreateRepositoryInput) -> Result<Repository, RepositoryError>;

    async fn check_name(&self, owner_id: UserId, name: &str) -> Result<NameCheck, RepositoryError>;

    async fn access_view(
        &self,
        owner_username: &str,
        name: &str,
        viewer: Option<UserId>,
    ) -> Result<RepositoryAccessView, RepositoryError>;
}
