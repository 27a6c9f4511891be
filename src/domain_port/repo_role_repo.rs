use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use crate::domain_port::StoreError;

/// Role state of a repository as read at [`RoleSnapshot::version`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    pub state: RepositoryRoleState,
    pub version: RoleVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { version: RoleVersion },
    /// Role state moved past the expected version; nothing was written.
    VersionMismatch,
}

#[async_trait::async_trait]
pub trait RepoRoleRepo: Send + Sync {
    async fn load_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
    ) -> Result<Option<RoleSnapshot>, StoreError>;

    async fn load(&self, repository_id: RepositoryId) -> Result<Option<RoleSnapshot>, StoreError>;

    /// Applies `mutation` only if the stored version still equals `expected`.
    async fn apply_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
        expected: RoleVersion,
        mutation: &RoleMutation,
    ) -> Result<ApplyOutcome, StoreError>;
}
