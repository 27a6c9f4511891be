use super::MemoryStore;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

pub struct MemoryUserRepo {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryUserRepo { store }
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), StoreError> {
        match self.store.emails.entry(record.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!("email {}", record.email))),
            Entry::Vacant(slot) => {
                slot.insert(record.user_id);
                self.store.users.insert(record.user_id, record.clone());
                Ok(())
            }
        }
    }

    async fn id_exists_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
    ) -> Result<bool, StoreError> {
        Ok(self.store.users.contains_key(&user_id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let Some(user_id) = self.store.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.store.users.get(&user_id).map(|r| r.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        // usernames are not unique, the earliest account wins
        Ok(self
            .store
            .users
            .iter()
            .filter(|r| r.username == username)
            .map(|r| r.value().clone())
            .min_by_key(|r| r.created_at))
    }

    async fn get_many(&self, user_ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.store.users.get(id).map(|r| r.value().clone()))
            .collect())
    }
}
