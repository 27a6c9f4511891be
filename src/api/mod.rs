pub mod v1;

use crate::server::Server;
use std::sync::Arc;
use warp::Filter;

/// All versioned routes mounted under `/api`, with errors rendered as JSON.
pub fn app(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(v1::routes(server))
        .recover(v1::recover_error)
}
