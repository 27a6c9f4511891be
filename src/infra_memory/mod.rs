//! In-memory adapters for the `memory` store backend and for tests.

mod repo_role_repo_memory;
mod repository_repo_memory;
mod user_repo_memory;

pub use repo_role_repo_memory::*;
pub use repository_repo_memory::*;
pub use user_repo_memory::*;

mod repo_tx_memory;
mod store;

pub use repo_tx_memory::*;
pub use store::*;
