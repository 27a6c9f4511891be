use super::error::*;
use super::handler;
use crate::server::*;
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

const MAX_BODY_BYTES: u64 = 16 * 1024;

// Paths are matched before methods so an unknown path falls through to 404
// rather than 405.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let register_user = warp::path("users")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with(server.user_service.clone()))
        .and_then(handler::register_user);

    let create_repository = warp::path("repositories")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with(server.repository_service.clone()))
        .and_then(handler::create_repository);

    let check_repository_name = warp::path("repositories")
        .and(warp::path("check"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handler::NameCheckQuery>())
        .and(with(server.repository_service.clone()))
        .and_then(handler::check_repository_name);

    let repository_access = warp::path("repositories")
        .and(decoded_segment())
        .and(decoded_segment())
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handler::RepositoryAccessQuery>())
        .and(with(server.repository_service.clone()))
        .and_then(handler::repository_access);

    let assign_role = warp::path("roles")
        .and(warp::path("assign"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with(server.role_service.clone()))
        .and_then(handler::assign_role);

    register_user
        .or(create_repository)
        .or(check_repository_name)
        .or(repository_access)
        .or(assign_role)
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// A path segment with its percent-escapes decoded, e.g. `zo%C3%AB` -> `zoë`.
fn decoded_segment() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::path::param::<String>().and_then(|raw: String| async move {
        percent_decode_str(&raw)
            .decode_utf8()
            .map(|decoded| decoded.into_owned())
            .map_err(|_| {
                reject::custom(ApiError::validation(
                    "Path segment is not valid UTF-8 once decoded",
                ))
            })
    })
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
