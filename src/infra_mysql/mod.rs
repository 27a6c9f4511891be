mod repo_role_repo_mysql;
mod repository_repo_mysql;
mod user_repo_mysql;

pub use repo_role_repo_mysql::*;
pub use repository_repo_mysql::*;
pub use user_repo_mysql::*;

mod repo_tx_mysql;

pub use repo_tx_mysql::*;

mod util;
