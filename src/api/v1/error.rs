use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let error = if let Some(err) = err.find::<ApiError>() {
        err.clone()
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        ApiError::validation(format!("Malformed request body: {e}"))
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        ApiError::validation(e.to_string())
    } else if let Some(e) = err.find::<warp::reject::PayloadTooLarge>() {
        ApiError::validation(e.to_string())
    } else if let Some(e) = err.find::<warp::reject::LengthRequired>() {
        ApiError::validation(e.to_string())
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        ApiError::validation(e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::new(ApiErrorCode::MethodNotAllowed, "Method not allowed")
    } else if err.is_not_found() {
        ApiError::new(ApiErrorCode::NotFound, "Route not found")
    } else {
        ApiError::new(
            ApiErrorCode::InternalError,
            format!("Unhandled error: {:?}", err),
        )
    };

    let status = error.code.status();
    let json = warp::reply::json(&ApiResponse::<()>::err(error));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid request")]
    Validation,
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Conflict")]
    Conflict,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    /// Caller without a role is refused with 403 as well, not 401: the
    /// caller is identified, they just have no standing in the repository.
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::Validation => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Unauthorized => StatusCode::FORBIDDEN,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error carried through warp's rejection chain; `message` reaches the
/// client verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Validation, message)
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        warn!("Internal error: {}", error);
        Self::new(ApiErrorCode::InternalError, ApiErrorCode::InternalError.to_string())
    }
}

impl reject::Reject for ApiError {}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::Validation(message) => ApiError::validation(message),
            UserError::Store(e) => ApiError::internal(e),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        let message = error.to_string();
        match error {
            RepositoryError::Validation(message) => ApiError::validation(message),
            RepositoryError::OwnerNotFound | RepositoryError::NotFound => {
                ApiError::new(ApiErrorCode::NotFound, message)
            }
            RepositoryError::AlreadyExists => ApiError::new(ApiErrorCode::Conflict, message),
            RepositoryError::AccessDenied => ApiError::new(ApiErrorCode::Forbidden, message),
            RepositoryError::Store(e) => ApiError::internal(e),
        }
    }
}

impl From<RoleError> for ApiError {
    fn from(error: RoleError) -> Self {
        let message = error.to_string();
        match error {
            RoleError::RepositoryNotFound | RoleError::CallerNotFound | RoleError::TargetNotFound => {
                ApiError::new(ApiErrorCode::NotFound, message)
            }
            RoleError::Unauthorized(message) => ApiError::new(ApiErrorCode::Unauthorized, message),
            RoleError::Forbidden(message) => ApiError::new(ApiErrorCode::Forbidden, message),
            RoleError::Conflict { .. } => ApiError::new(ApiErrorCode::Conflict, message),
            RoleError::Store(e) => ApiError::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_errors_map_to_statuses() {
        let cases = [
            (RoleError::RepositoryNotFound, StatusCode::NOT_FOUND),
            (RoleError::CallerNotFound, StatusCode::NOT_FOUND),
            (RoleError::TargetNotFound, StatusCode::NOT_FOUND),
            (RoleError::Unauthorized("no".into()), StatusCode::FORBIDDEN),
            (RoleError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (RoleError::Conflict { attempts: 3 }, StatusCode::CONFLICT),
            (RoleError::Store("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).code.status(), status);
        }
    }

    #[test]
    fn denial_messages_pass_through_and_store_errors_do_not() {
        let error = ApiError::from(RoleError::Forbidden(
            "Cannot modify the role of the repository owner".to_string(),
        ));
        assert_eq!(error.message, "Cannot modify the role of the repository owner");

        let error = ApiError::from(RoleError::Store("password=hunter2".to_string()));
        assert_eq!(error.message, "Internal error");
    }
}
