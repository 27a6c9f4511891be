use crate::domain_model::UserProfile;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for UserError {
    fn from(error: StoreError) -> Self {
        UserError::Store(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Returns the existing profile if the email is already registered.
    async fn register(&self, input: RegisterInput) -> Result<UserProfile, UserError>;
}
