use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// POST /auth/login (public).
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(body).await {
        Ok((user, token)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "token": token,
                "user": dto::user_to_json(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::error_to_response(e),
    }
}
