use crate::domain_model::*;
use crate::domain_port::{RoleSnapshot, UserRecord};
use dashmap::DashMap;

/// Shared tables behind the in-memory repositories.
///
/// Each write goes straight to its map, so a `MemoryTx` only scopes calls and
/// rollback does not undo anything. Uniqueness is enforced through the entry
/// API on the index maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(super) users: DashMap<UserId, UserRecord>,
    pub(super) emails: DashMap<String, UserId>,
    pub(super) repositories: DashMap<RepositoryId, Repository>,
    pub(super) repository_names: DashMap<(UserId, RepositoryName), RepositoryId>,
    pub(super) roles: DashMap<RepositoryId, RoleSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
