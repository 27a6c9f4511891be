mod repository_service;
mod role_service;
mod user_service;

pub use repository_service::*;
pub use role_service::*;
pub use user_service::*;
