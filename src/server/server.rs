use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use nanoid::nanoid;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

struct Repos {
    user_repo: Arc<dyn UserRepo>,
    repository_repo: Arc<dyn RepositoryRepo>,
    role_repo: Arc<dyn RepoRoleRepo>,
    tx_manager: Arc<dyn TxManager>,
}

pub struct Server {
    pub run_id: String,
    pub user_service: Arc<dyn UserService>,
    pub repository_service: Arc<dyn RepositoryService>,
    pub role_service: Arc<dyn RoleService>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (repos, pool) = match settings.store.backend.as_str() {
            "memory" => (Self::memory_repos(), None),
            "mysql" => {
                let dsn = settings
                    .store
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.mysql_dsn is required for mysql"))?;
                let pool = connect_pool(
                    dsn,
                    settings.store.max_connections,
                    Duration::from_secs(settings.store.acquire_timeout_secs),
                )
                .await?;
                let repos = Repos {
                    user_repo: Arc::new(MySqlUserRepo::new(pool.clone())),
                    repository_repo: Arc::new(MySqlRepositoryRepo::new(pool.clone())),
                    role_repo: Arc::new(MySqlRepoRoleRepo::new(pool.clone())),
                    tx_manager: Arc::new(MySqlTxManager::new(pool.clone())),
                };
                (repos, Some(pool))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let server = Self::from_repos(repos, settings.roles.max_attempts, pool);
        info!(run_id = %server.run_id, backend = %settings.store.backend, "server started");
        Ok(server)
    }

    /// A server over a fresh in-memory store.
    pub fn in_memory(max_attempts: u32) -> Self {
        Self::from_repos(Self::memory_repos(), max_attempts, None)
    }

    fn memory_repos() -> Repos {
        let store = Arc::new(MemoryStore::new());
        Repos {
            user_repo: Arc::new(MemoryUserRepo::new(store.clone())),
            repository_repo: Arc::new(MemoryRepositoryRepo::new(store.clone())),
            role_repo: Arc::new(MemoryRepoRoleRepo::new(store)),
            tx_manager: Arc::new(MemoryTxManager::new()),
        }
    }

    fn from_repos(repos: Repos, max_attempts: u32, pool: Option<MySqlPool>) -> Self {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(
            repos.user_repo.clone(),
            repos.tx_manager.clone(),
        ));
        let repository_service: Arc<dyn RepositoryService> =
            Arc::new(RealRepositoryService::new(
                repos.user_repo.clone(),
                repos.repository_repo,
                repos.role_repo.clone(),
                repos.tx_manager.clone(),
            ));
        let role_service: Arc<dyn RoleService> = Arc::new(RealRoleService::new(
            repos.user_repo,
            repos.role_repo,
            repos.tx_manager,
            max_attempts,
        ));

        Self {
            run_id,
            user_service,
            repository_service,
            role_service,
            pool,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("mysql pool closed");
        }
    }
}
