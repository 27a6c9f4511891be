use super::MemoryStore;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

pub struct MemoryRepositoryRepo {
    store: Arc<MemoryStore>,
}

impl MemoryRepositoryRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryRepositoryRepo { store }
    }
}

#[async_trait::async_trait]
impl RepositoryRepo for MemoryRepositoryRepo {
    async fn insert_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        repository: &Repository,
    ) -> Result<(), StoreError> {
        let key = (repository.owner_id, repository.name.clone());
        match self.store.repository_names.entry(key) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!(
                "repository {}/{}",
                repository.owner_id, repository.name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(repository.id);
                self.store.roles.insert(
                    repository.id,
                    RoleSnapshot {
                        state: RepositoryRoleState::with_owner(repository.owner_id),
                        version: RoleVersion::default(),
                    },
                );
                self.store
                    .repositories
                    .insert(repository.id, repository.clone());
                Ok(())
            }
        }
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &RepositoryName,
    ) -> Result<Option<Repository>, StoreError> {
        let Some(id) = self
            .store
            .repository_names
            .get(&(owner_id, name.clone()))
            .map(|id| *id)
        else {
            return Ok(None);
        };
        Ok(self.store.repositories.get(&id).map(|r| r.value().clone()))
    }
}
