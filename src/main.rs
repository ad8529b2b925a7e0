use anyhow::Context;
use task_tracker::{build_router, config::Config, services::DbService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().context("Failed to load configuration")?;

    let db = DbService::connect(&config.database)
        .await
        .with_context(|| format!("Failed to connect to {}", config.database.url))?;

    db.init_schema().await.map_err(|e| {
        tracing::error!("[DB INIT ERROR] {:?}", e);
        e
    }).context("Failed to create tables")?;

    if config.database.log_snapshot {
        db.log_snapshot().await;
    }

    let app = build_router(db, config.limits.max_body_size);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    tracing::info!("Server running on {}", config.bind_addr());

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
