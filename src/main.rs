use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shift_attendance::api::{create_router, AppState};
use shift_attendance::attendance::SystemClock;
use shift_attendance::config::{ConfigLoader, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shift_attendance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env()?;
    let config = ConfigLoader::load(&server.config_dir)?;
    tracing::info!(config_dir = %server.config_dir.display(), "Configuration loaded");

    let state = AppState::from_config(&config, Arc::new(SystemClock))?;

    let shutdown = CancellationToken::new();
    let sweeper = state.scheduler().clone().spawn(shutdown.child_token());

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(server.bind_addr).await?;
    tracing::info!("Starting server on {}", server.bind_addr);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    sweeper.await?;
    tracing::info!("Auto-logout scheduler stopped");
    Ok(())
}
