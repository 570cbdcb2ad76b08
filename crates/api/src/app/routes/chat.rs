use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", post(chat))
}

pub async fn chat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ChatRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::require(&principal, "chat.use") {
        return resp;
    }
    match services.chat(&body.message).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => errors::error_to_response(e),
    }
}
