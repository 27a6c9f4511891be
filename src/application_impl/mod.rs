mod repository_service_impl;
mod role_service_impl;
mod user_service_impl;

pub use repository_service_impl::*;
pub use role_service_impl::*;
pub use user_service_impl::*;

#[cfg(test)]
pub(crate) mod test_utils;
