//! Todo Frontend - image cache proxy and todo API gateway
//!
//! Serves a periodically refreshed image from local storage, forwards todo
//! calls to the backend, and exposes liveness/readiness probes.

use file_image_cache::{HttpImageSource, ImageCache};
use std::sync::Arc;
use todo_frontend::{
    start_server, BackendClient, FrontendConfig, FrontendError, Result, ServerState, SharedState,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("todo_frontend=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting todo frontend...");

    let config = FrontendConfig::from_env()?;
    info!(
        port = config.port,
        image_url = %config.image_url,
        image_dir = ?config.image_dir,
        cache_duration_ms = config.cache_duration.as_millis() as u64,
        backend_url = %config.backend_url,
        "Loaded configuration"
    );

    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .map_err(|e| FrontendError::Config(format!("failed to build HTTP client: {}", e)))?;
    let source = Arc::new(HttpImageSource::with_client(http, &config.image_url));

    let cache = ImageCache::new(
        config.image_dir.clone(),
        source,
        config.cache_duration,
        config.upstream_timeout,
    );
    cache.init().await?;

    let backend = BackendClient::new(
        &config.backend_url,
        &config.readiness_probe_path,
        config.upstream_timeout,
    )?;

    let state: SharedState = Arc::new(ServerState::new(cache, backend));

    start_server(state, config.port).await?;

    info!("Todo frontend stopped");
    Ok(())
}
