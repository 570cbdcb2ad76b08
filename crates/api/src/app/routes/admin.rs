//! User and role administration endpoints (admin-only permissions).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stocksmith_core::{RoleId, UserId};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/users/:id/role", post(change_role))
        .route("/users/:id/suspend", post(suspend_user))
        .route("/users/:id/activate", post(activate_user))
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", axum::routing::put(update_role).delete(delete_role))
}

fn parse_user_id(id: &str) -> Result<UserId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"))
}

fn parse_role_id(id: &str) -> Result<RoleId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id"))
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.write") {
        return resp;
    }
    match services.create_user(body).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.read") {
        return resp;
    }
    match services.list_users().await {
        Ok(users) => {
            let items = users.iter().map(dto::user_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.read") {
        return resp;
    }
    let id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.get_user(id).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.write") {
        return resp;
    }
    let id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.update_user(id, body).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ChangeRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.write") {
        return resp;
    }
    let id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.change_user_role(id, principal.user_id(), body).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn suspend_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.write") {
        return resp;
    }
    let id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.suspend_user(id).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.write") {
        return resp;
    }
    let id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.activate_user(id).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "users.write") {
        return resp;
    }
    let id = match parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.delete_user(id, principal.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "roles.write") {
        return resp;
    }
    match services.create_role(body).await {
        Ok(role) => (StatusCode::CREATED, Json(dto::role_to_json(&role))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "roles.read") {
        return resp;
    }
    match services.list_roles().await {
        Ok(roles) => {
            let items = roles.iter().map(dto::role_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "roles.write") {
        return resp;
    }
    let id = match parse_role_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.update_role(id, body).await {
        Ok(role) => (StatusCode::OK, Json(dto::role_to_json(&role))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "roles.write") {
        return resp;
    }
    let id = match parse_role_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.delete_role(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::error_to_response(e),
    }
}
