use super::MemoryStore;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct MemoryRepoRoleRepo {
    store: Arc<MemoryStore>,
}

impl MemoryRepoRoleRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryRepoRoleRepo { store }
    }
}

#[async_trait::async_trait]
impl RepoRoleRepo for MemoryRepoRoleRepo {
    async fn load_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
    ) -> Result<Option<RoleSnapshot>, StoreError> {
        self.load(repository_id).await
    }

    async fn load(&self, repository_id: RepositoryId) -> Result<Option<RoleSnapshot>, StoreError> {
        Ok(self
            .store
            .roles
            .get(&repository_id)
            .map(|r| r.value().clone()))
    }

    async fn apply_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
        expected: RoleVersion,
        mutation: &RoleMutation,
    ) -> Result<ApplyOutcome, StoreError> {
        // the shard lock held by `get_mut` makes check-and-apply atomic
        let Some(mut snapshot) = self.store.roles.get_mut(&repository_id) else {
            return Err(StoreError::Corrupt(format!(
                "no role state for repository {repository_id}"
            )));
        };
        if snapshot.version != expected {
            return Ok(ApplyOutcome::VersionMismatch);
        }

        snapshot
            .state
            .apply(mutation)
            .map_err(|e| StoreError::Corrupt(format!("repository {repository_id}: {e}")))?;
        snapshot.version = expected.next();

        Ok(ApplyOutcome::Applied {
            version: snapshot.version,
        })
    }
}
