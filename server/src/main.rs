use overlay_server::config::Config;
use overlay_server::{AppState, SledOverlayStore, UploadService, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "overlay_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        "Loaded configuration: host={}, port={}",
        config.host, config.port
    );
    let public_base_url = config.public_base_url();
    info!("Public base URL: {}", public_base_url);

    // Open the document store
    let store = Arc::new(SledOverlayStore::open(config.storage.database_path())?);
    info!("Overlay store holds {} records", store.len());

    // Upload directory is created on demand
    let uploads = Arc::new(UploadService::new(&config.upload, &public_base_url)?);
    info!("Serving uploads from {:?}", uploads.uploads_dir());
    match config.upload.max_upload_size {
        Some(limit) => info!("Upload size limit: {} bytes", limit),
        None => info!("Upload size limit disabled"),
    }

    let app_state = AppState::new(store.clone(), uploads)
        .with_max_upload_size(config.upload.max_upload_size);
    let app = router(app_state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Overlay server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close the store
    let flushed = store.flush().await?;
    info!("Flushed {} bytes to the overlay store, exiting", flushed);

    Ok(())
}
