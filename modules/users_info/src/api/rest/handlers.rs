use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::Uri,
    response::Json,
    Extension,
};
use modkit::{
    IntoProblemResponse, JsonBody, Problem, ProblemResponse, INTERNAL_SERVER_ERROR_DETAIL,
};
use tracing::{debug, info};

use crate::api::rest::dto::{CreateUserReq, ListUsersQuery, UserDto, UsersDumpDto};
use crate::api::rest::error::{
    map_domain_error, CREATE_USER_FAILED, GET_USER_FAILED, LIST_USERS_FAILED,
};
use crate::domain::service::Service;

/// List users, `skip`/`limit` slicing in insertion order
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    operation_id = "users_info.list_users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = [UserDto]),
        (status = 422, description = "Invalid query", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    let Query(query) = query.map_err(|e| e.into_problem_response(uri.path()))?;
    debug!("Listing users with query: {:?}", query);

    match svc.list_users(query.skip, query.limit).await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => Err(map_domain_error(&e, uri.path(), LIST_USERS_FAILED)),
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_info.get_user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid id", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let Path(id) = id.map_err(|e| e.into_problem_response(uri.path()))?;
    debug!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => Err(map_domain_error(&e, uri.path(), GET_USER_FAILED)),
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    operation_id = "users_info.create_user",
    request_body = CreateUserReq,
    responses(
        (status = 200, description = "Created user", body = UserDto),
        (status = 400, description = "User already exists", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation error", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    body: Result<JsonBody<CreateUserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let JsonBody(req_body) = body.map_err(|e| e.into_problem_response(uri.path()))?;
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            info!("User not created: {}", e);
            Err(map_domain_error(&e, uri.path(), CREATE_USER_FAILED))
        }
    }
}

/// Dump the whole store. Inspection only.
#[utoipa::path(
    get,
    path = "/debug/users",
    tag = "debug",
    operation_id = "users_info.debug_users",
    responses(
        (status = 200, description = "Users count and contents", body = UsersDumpDto),
    )
)]
pub async fn debug_users(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<UsersDumpDto>, ProblemResponse> {
    match svc.debug_dump().await {
        Ok(dump) => Ok(Json(UsersDumpDto::from(dump))),
        Err(e) => Err(map_domain_error(
            &e,
            uri.path(),
            INTERNAL_SERVER_ERROR_DETAIL,
        )),
    }
}
