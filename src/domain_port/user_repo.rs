use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        UserProfile {
            id: record.user_id,
            username: record.username,
            email: record.email,
            avatar_url: record.avatar_url,
            bio: record.bio,
            created_at: record.created_at,
        }
    }
}

impl From<UserRecord> for UserSummary {
    fn from(record: UserRecord) -> Self {
        UserProfile::from(record).into()
    }
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] if the email is already taken.
    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), StoreError>;

    async fn id_exists_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
    ) -> Result<bool, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Unknown ids are skipped. Order of the result is unspecified.
    async fn get_many(&self, user_ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError>;
}
