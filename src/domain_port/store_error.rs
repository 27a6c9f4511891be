#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate entry: {0}")]
    Duplicate(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("backend error: {0}")]
    Backend(String),
}
