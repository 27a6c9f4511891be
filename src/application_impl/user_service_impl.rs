use crate::application_port::{RegisterInput, UserError, UserService};
use crate::domain_model::{UserId, UserProfile};
use crate::domain_port::{StoreError, TxManager, UserRecord, UserRepo};
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealUserService {
    pub fn new(user_repo: Arc<dyn UserRepo>, tx_manager: Arc<dyn TxManager>) -> RealUserService {
        RealUserService {
            user_repo,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn register(&self, input: RegisterInput) -> Result<UserProfile, UserError> {
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() || email.is_empty() {
            return Err(UserError::Validation(
                "Username and Email is required !!".to_string(),
            ));
        }

        if let Some(existing) = self.user_repo.find_by_email(email).await? {
            return Ok(existing.into());
        }

        let record = UserRecord {
            user_id: UserId(uuid::Uuid::new_v4()),
            username: username.to_string(),
            email: email.to_string(),
            avatar_url: input.avatar_url.unwrap_or_default(),
            bio: String::new(),
            created_at: Utc::now(),
        };

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;

        match self.user_repo.create_in_tx(&mut *tx, &record).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                // lost a race against a concurrent registration of the same email
                drop(tx);
                return self
                    .user_repo
                    .find_by_email(email)
                    .await?
                    .map(UserProfile::from)
                    .ok_or_else(|| UserError::Store(format!("user {email} vanished")));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit()
            .await
            .map_err(|e| UserError::Store(e.to_string()))?;

        info!(user_id = %record.user_id, username = %record.username, "user registered");
        Ok(record.into())
    }
}
