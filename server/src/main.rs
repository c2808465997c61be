use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod config;
mod error;
mod handlers;
mod logic;
mod state;
mod storage;

use crate::config::{Args, StorageKind};
use crate::handlers::router;
use crate::state::AppState;
use crate::storage::{FileStorage, MemoryStorage, Storage};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfmark_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let storage: Arc<dyn Storage> = match args.storage {
        StorageKind::File => {
            let annotation_dir = args.annotation_dir();
            if let Err(error) = tokio::fs::create_dir_all(&annotation_dir).await {
                tracing::warn!("Failed to create annotation dir {}: {error}", annotation_dir.display());
            }
            tracing::info!("Storing annotations in {}", annotation_dir.display());
            Arc::new(FileStorage::new(annotation_dir))
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage; annotations are lost on restart");
            Arc::new(MemoryStorage::new())
        }
    };

    let public_dir = args.public_dir();
    let public_dir = public_dir.is_dir().then_some(public_dir);
    match &public_dir {
        Some(dir) => tracing::info!("Serving static files from {}", dir.display()),
        None => tracing::info!("No public dir found; serving the API only"),
    }

    let app = router(AppState::new(storage), public_dir);

    let addr = args.addr();
    tracing::info!("pdfmark server v{} listening on {addr}", env!("CARGO_PKG_VERSION"));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server crashed");

    tracing::info!("Server shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
