use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;
use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "users_info", description = "In-memory user records"),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::debug_users
    ),
    components(schemas(
        dto::UserDto,
        dto::CreateUserReq,
        dto::UsersDumpDto,
        modkit::Problem,
        modkit::ValidationError
    )),
    tags((name = "users", description = "User records"))
)]
pub struct UsersApiDoc;

pub const DEBUG_USERS_PATH: &str = "/debug/users";

pub fn register_routes(router: Router, service: Arc<Service>, expose_debug_routes: bool) -> Router {
    let mut router = router
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/{id}", get(handlers::get_user));

    if expose_debug_routes {
        router = router.route(DEBUG_USERS_PATH, get(handlers::debug_users));
    }

    router.layer(Extension(service))
}

/// OpenAPI document matching what `register_routes` mounts.
pub fn openapi(expose_debug_routes: bool) -> utoipa::openapi::OpenApi {
    let mut doc = UsersApiDoc::openapi();
    if !expose_debug_routes {
        doc.paths.paths.remove(DEBUG_USERS_PATH);
    }
    doc
}
