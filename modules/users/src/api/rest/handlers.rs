use std::sync::Arc;

use axum::{http::StatusCode, response::Json, Extension};
use tracing::{info, warn};

use crate::api::rest::dto::{CreateUserReq, IdParam, UpdateUserReq, UserDto};
use crate::api::rest::error::{map_domain_error, ErrorPolicy};
use crate::api::rest::extract::{RequestId, ValidJson, ValidPath};
use crate::api::rest::problem::ProblemResponse;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

fn fail(e: DomainError, policy: ErrorPolicy, instance: &str, rid: &RequestId) -> ProblemResponse {
    warn!("Request to {} failed: {}", instance, e);
    map_domain_error(&e, policy, instance).with_request_id(rid.0.as_deref())
}

/// List all users
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    Extension(policy): Extension<ErrorPolicy>,
    rid: RequestId,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    info!("Listing users");

    let users = svc
        .list_users()
        .await
        .map_err(|e| fail(e, policy, "/users", &rid))?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(policy): Extension<ErrorPolicy>,
    rid: RequestId,
    ValidPath(IdParam { id }): ValidPath<IdParam>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    let user = svc
        .get_user(&id)
        .await
        .map_err(|e| fail(e, policy, &format!("/user/{id}"), &rid))?;
    Ok(Json(UserDto::from(user)))
}

/// Create a new user
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(policy): Extension<ErrorPolicy>,
    rid: RequestId,
    ValidJson(req): ValidJson<CreateUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Creating user");

    let user = svc
        .create_user(req.into())
        .await
        .map_err(|e| fail(e, policy, "/user", &rid))?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Update an existing user with the fields present in the body
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(policy): Extension<ErrorPolicy>,
    rid: RequestId,
    ValidPath(IdParam { id }): ValidPath<IdParam>,
    ValidJson(req): ValidJson<UpdateUserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating user {}", id);

    let user = svc
        .update_user(&id, req.into())
        .await
        .map_err(|e| fail(e, policy, &format!("/user/{id}"), &rid))?;
    Ok(Json(UserDto::from(user)))
}

/// Delete a user by ID; responds with the removed record
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(policy): Extension<ErrorPolicy>,
    rid: RequestId,
    ValidPath(IdParam { id }): ValidPath<IdParam>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Deleting user: {}", id);

    let user = svc
        .delete_user(&id)
        .await
        .map_err(|e| fail(e, policy, &format!("/user/{id}"), &rid))?;
    Ok(Json(UserDto::from(user)))
}

/// `/user/` with an empty id segment; resolved like any unknown id
pub async fn empty_id(
    Extension(svc): Extension<Arc<Service>>,
    Extension(policy): Extension<ErrorPolicy>,
    rid: RequestId,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Request without user id");

    let user = svc
        .get_user("")
        .await
        .map_err(|e| fail(e, policy, "/user/", &rid))?;
    Ok(Json(UserDto::from(user)))
}
