mod repository;
mod role;
mod role_state;
mod user;

pub use repository::*;
pub use role::*;
pub use role_state::*;
pub use user::*;
