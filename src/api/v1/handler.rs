use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ApiError) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Empty strings count as absent, the same as a missing key.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, warp::Rejection> {
    raw.trim()
        .parse()
        .map_err(|_| reject::custom(ApiError::validation(format!("Malformed identifier: {field}"))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn register_user(
    body: RegisterUserRequest,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = RegisterInput {
        username: body.username.unwrap_or_default(),
        email: body.email.unwrap_or_default(),
        avatar_url: present(body.avatar_url),
    };
    let profile = user_service
        .register(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepositoryRequest {
    pub owner_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

pub async fn create_repository(
    body: CreateRepositoryRequest,
    repository_service: Arc<dyn RepositoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (Some(owner_id), Some(name)) = (present(body.owner_id), present(body.name)) else {
        return Err(reject::custom(ApiError::validation(
            "Missing required fields: ownerId, name",
        )));
    };
    let input = CreateRepositoryInput {
        owner_id: parse_id("ownerId", &owner_id)?,
        name,
        description: body.description.unwrap_or_default(),
        is_public: body.is_public.unwrap_or(true),
    };
    let repository = repository_service
        .create(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(repository)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameCheckQuery {
    pub owner_id: Option<String>,
    pub name: Option<String>,
}

pub async fn check_repository_name(
    query: NameCheckQuery,
    repository_service: Arc<dyn RepositoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (Some(owner_id), Some(name)) = (present(query.owner_id), present(query.name)) else {
        return Err(reject::custom(ApiError::validation(
            "Missing required fields: ownerId, name",
        )));
    };
    let owner_id: UserId = parse_id("ownerId", &owner_id)?;
    let check = repository_service
        .check_name(owner_id, &name)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(check)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryAccessQuery {
    pub viewer_id: Option<String>,
}

pub async fn repository_access(
    owner_username: String,
    name: String,
    query: RepositoryAccessQuery,
    repository_service: Arc<dyn RepositoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let viewer = match present(query.viewer_id) {
        Some(raw) => Some(parse_id::<UserId>("viewerId", &raw)?),
        None => None,
    };
    let view = repository_service
        .access_view(&owner_username, &name, viewer)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(view)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub repository_id: Option<String>,
    pub caller_id: Option<String>,
    pub target_id: Option<String>,
    pub role: Option<String>,
}

pub async fn assign_role(
    body: AssignRoleRequest,
    role_service: Arc<dyn RoleService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (Some(repository_id), Some(caller_id), Some(target_id), Some(role)) = (
        present(body.repository_id),
        present(body.caller_id),
        present(body.target_id),
        present(body.role),
    ) else {
        return Err(reject::custom(ApiError::validation(
            "Missing required fields: repositoryId, callerId, targetId, role",
        )));
    };
    let role: AssignableRole = role
        .trim()
        .parse()
        .map_err(|e: InvalidRole| reject::custom(ApiError::validation(e.to_string())))?;

    let input = AssignRoleInput {
        repository_id: parse_id("repositoryId", &repository_id)?,
        caller_id: parse_id("callerId", &caller_id)?,
        target_id: parse_id("targetId", &target_id)?,
        role,
    };
    debug!(repository_id = %input.repository_id, role = %role, "assign role requested");

    let assignment = role_service
        .assign_role(input)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(assignment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_has_no_data() {
        let response = ApiResponse::<()>::err(ApiError::new(ApiErrorCode::Forbidden, "nope"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "data": null,
                "error": { "code": "Forbidden", "message": "nope" },
            })
        );
    }

    #[test]
    fn blank_fields_count_as_missing() {
        assert_eq!(present(Some("  ".to_string())), None);
        assert_eq!(present(Some("ada".to_string())), Some("ada".to_string()));
        assert_eq!(present(None), None);
    }
}
