use std::net::SocketAddr;
use std::sync::Arc;

use rapidingo::api;
use rapidingo::config::Config;
use rapidingo::engine::runner::spawn_engine;
use rapidingo::error::AppError;
use rapidingo::state::AppState;
use rapidingo::storage::FileStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let store = FileStore::open(&config.store_path)?;
    tracing::info!(path = %store.path().display(), "local store opened");

    let (app_state, channels) = AppState::new(config.command_queue_size, config.event_buffer_size)?;
    let shared_state = Arc::new(app_state);

    let engine = spawn_engine(&shared_state, channels, Box::new(store), config.sim_tick);

    let app = api::rest::router(shared_state.clone(), &config.static_dir);

    let bind_addr = SocketAddr::new(config.bind_addr, config.http_port);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(%bind_addr, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    // dropping the engine releases the simulator timer and geolocation feed
    engine.abort();
    tracing::info!("session engine stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
