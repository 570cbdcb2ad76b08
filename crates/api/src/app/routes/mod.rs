use axum::{routing::get, Router};

pub mod admin;
pub mod auth;
pub mod categories;
pub mod chat;
pub mod common;
pub mod dashboard;
pub mod locations;
pub mod movements;
pub mod products;
pub mod system;
pub mod todos;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/locations", locations::router())
        .nest("/movements", movements::router())
        .nest("/todos", todos::router())
        .nest("/dashboard", dashboard::router())
        .nest("/chat", chat::router())
        .nest("/admin", admin::router())
}
