use anyhow::{Context, Result};
use messagely::{create_app, init_tracing, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    // A missing .env file is fine; real deployments set the environment.
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let app = create_app(&config).await?;

    let endpoint = config.server.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&endpoint)
        .await
        .with_context(|| format!("Failed to bind {endpoint}"))?;

    info!("Starting Messagely API server v{}...", env!("CARGO_PKG_VERSION"));
    info!("Listening at endpoint:{}", endpoint);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
