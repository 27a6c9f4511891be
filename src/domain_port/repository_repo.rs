use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use crate::domain_port::StoreError;

#[async_trait::async_trait]
pub trait RepositoryRepo: Send + Sync {
    /// Inserts the repository with an empty member list and a zero
    /// [`RoleVersion`]. Fails with [`StoreError::Duplicate`] if the owner
    /// already has a repository with that name.
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository: &Repository,
    ) -> Result<(), StoreError>;

    async fn find_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &RepositoryName,
    ) -> Result<Option<Repository>, StoreError>;
}
