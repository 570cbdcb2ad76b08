use anyhow::Context;

use stocksmith_api::app::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stocksmith_observability::init();

    let config = AppConfig::from_env();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

#[cfg(feature = "postgres")]
async fn build(config: AppConfig) -> anyhow::Result<axum::Router> {
    let persistent = std::env::var("USE_PERSISTENT_STORES")
        .is_ok_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"));
    if persistent {
        let url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set when USE_PERSISTENT_STORES is enabled")?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect(&url)
            .await
            .context("failed to connect to postgres")?;
        Ok(stocksmith_api::app::build_app_with_pool(config, pool).await)
    } else {
        Ok(stocksmith_api::app::build_app(config).await)
    }
}

#[cfg(not(feature = "postgres"))]
async fn build(config: AppConfig) -> anyhow::Result<axum::Router> {
    Ok(stocksmith_api::app::build_app(config).await)
}
