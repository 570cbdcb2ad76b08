//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store wiring, use-case methods, seeding, SSE helper
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Environment-driven configuration for the API process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    /// Read configuration from the environment, warning on insecure dev
    /// defaults.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let admin_email =
            std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@stocksmith.local".to_string());
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("ADMIN_PASSWORD not set; using insecure dev default");
            "admin".to_string()
        });
        Self {
            jwt_secret,
            admin_email,
            admin_password,
        }
    }
}

/// Build the full HTTP router on in-memory stores (public entrypoint used by
/// `main.rs` and the black-box tests).
pub async fn build_app(config: AppConfig) -> Router {
    let services = Arc::new(services::build_services(&config).await);
    finish_app(services)
}

/// Build the router with Postgres-backed catalog and movement stores.
#[cfg(feature = "postgres")]
pub async fn build_app_with_pool(config: AppConfig, pool: sqlx::PgPool) -> Router {
    let services = Arc::new(services::build_persistent_services(&config, pool).await);
    finish_app(services)
}

fn finish_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.jwt_validator(),
        services: services.clone(),
    };

    // Public routes: liveness and login.
    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .layer(Extension(services.clone()));

    // Protected routes: require a valid token for an active user.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services)),
    );

    public.merge(protected)
}
