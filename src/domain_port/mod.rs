mod store_error;

pub use store_error::*;

// repo

mod repo_role_repo;
mod repository_repo;
mod user_repo;

mod repo_tx;

pub use repo_role_repo::*;
pub use repository_repo::*;
pub use user_repo::*;

pub use repo_tx::*;
