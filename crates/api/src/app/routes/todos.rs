use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stocksmith_core::TodoId;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/:id", get(get_todo).put(update_todo).delete(delete_todo))
}

fn parse_id(id: &str) -> Result<TodoId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid todo id"))
}

pub async fn create_todo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateTodoRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "todos.write") {
        return resp;
    }
    match services.create_todo(body).await {
        Ok(todo) => (StatusCode::CREATED, Json(dto::todo_to_json(&todo))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn list_todos(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "todos.read") {
        return resp;
    }
    match services.list_todos().await {
        Ok(todos) => {
            let items = todos.iter().map(dto::todo_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn get_todo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "todos.read") {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.get_todo(id).await {
        Ok(todo) => (StatusCode::OK, Json(dto::todo_to_json(&todo))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn update_todo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateTodoRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "todos.write") {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.update_todo(id, body).await {
        Ok(todo) => (StatusCode::OK, Json(dto::todo_to_json(&todo))).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}

pub async fn delete_todo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "todos.write") {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.delete_todo(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::error_to_response(e),
    }
}
