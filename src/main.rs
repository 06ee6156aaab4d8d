use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use url_injector::{config::Config, router, search::build_backend, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    info!("Starting url-injector MCP server");
    info!(
        "Search backend: {:?}, rate limit: {}/{:?}, cache ttl: {:?}",
        config.search_backend, config.rate_limit, config.rate_window, config.cache_ttl
    );

    let backend = build_backend(&config)?;
    let state = Arc::new(AppState::new(&config, backend));
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("url-injector listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("url-injector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
