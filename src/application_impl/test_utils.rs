//! In-memory wiring shared by the service tests.

use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct Backend {
    user_repo: Arc<dyn UserRepo>,
    repository_repo: Arc<dyn RepositoryRepo>,
    role_repo: Arc<dyn RepoRoleRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl Backend {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Backend {
            user_repo: Arc::new(MemoryUserRepo::new(store.clone())),
            repository_repo: Arc::new(MemoryRepositoryRepo::new(store.clone())),
            role_repo: Arc::new(MemoryRepoRoleRepo::new(store)),
            tx_manager: Arc::new(MemoryTxManager::new()),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepo> {
        self.user_repo.clone()
    }

    pub fn role_repo(&self) -> Arc<dyn RepoRoleRepo> {
        self.role_repo.clone()
    }

    pub fn tx_manager(&self) -> Arc<dyn TxManager> {
        self.tx_manager.clone()
    }

    pub fn user_service(&self) -> RealUserService {
        RealUserService::new(self.user_repo(), self.tx_manager())
    }

    pub fn repository_service(&self) -> RealRepositoryService {
        RealRepositoryService::new(
            self.user_repo(),
            self.repository_repo.clone(),
            self.role_repo(),
            self.tx_manager(),
        )
    }

    pub fn role_service(&self) -> RealRoleService {
        RealRoleService::new(self.user_repo(), self.role_repo(), self.tx_manager(), 3)
    }

    pub async fn user(&self, username: &str) -> UserProfile {
        self.user_service()
            .register(RegisterInput {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                avatar_url: None,
            })
            .await
            .unwrap()
    }

    pub async fn repository(&self, owner: &UserProfile, name: &str, is_public: bool) -> Repository {
        self.repository_service()
            .create(CreateRepositoryInput {
                owner_id: owner.id,
                name: name.to_string(),
                description: String::new(),
                is_public,
            })
            .await
            .unwrap()
    }

    pub async fn grant(
        &self,
        repository: &Repository,
        caller: &UserProfile,
        target: &UserProfile,
        role: AssignableRole,
    ) {
        self.role_service()
            .assign_role(AssignRoleInput {
                repository_id: repository.id,
                caller_id: caller.id,
                target_id: target.id,
                role,
            })
            .await
            .unwrap();
    }

    pub async fn snapshot(&self, repository_id: RepositoryId) -> RoleSnapshot {
        self.role_repo.load(repository_id).await.unwrap().unwrap()
    }
}

/// Reports a version mismatch for the first `conflicts` applies, as if
/// another writer got there first.
pub struct RacingRoleRepo {
    inner: Arc<dyn RepoRoleRepo>,
    conflicts: u32,
    apply_calls: AtomicU32,
}

impl RacingRoleRepo {
    pub fn new(inner: Arc<dyn RepoRoleRepo>, conflicts: u32) -> Self {
        RacingRoleRepo {
            inner,
            conflicts,
            apply_calls: AtomicU32::new(0),
        }
    }

    pub fn apply_calls(&self) -> u32 {
        self.apply_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RepoRoleRepo for RacingRoleRepo {
    async fn load_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
    ) -> Result<Option<RoleSnapshot>, StoreError> {
        self.inner.load_in_tx(tx, repository_id).await
    }

    async fn load(&self, repository_id: RepositoryId) -> Result<Option<RoleSnapshot>, StoreError> {
        self.inner.load(repository_id).await
    }

    async fn apply_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        repository_id: RepositoryId,
        expected: RoleVersion,
        mutation: &RoleMutation,
    ) -> Result<ApplyOutcome, StoreError> {
        let call = self.apply_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.conflicts {
            return Ok(ApplyOutcome::VersionMismatch);
        }
        self.inner
            .apply_in_tx(tx, repository_id, expected, mutation)
            .await
    }
}
