//! Router assembly and the serve loop.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use pocbench_core::{
    open_store, Config, CustomerId, CustomerLockingReader, InteractionCoordinator,
    InteractionWriter, SharedEntityStore,
};
use tower_http::trace::TraceLayer;

use crate::{correlation, handlers};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<InteractionCoordinator>,
    pub db_read_customer_id: CustomerId,
}

impl AppState {
    /// Wire the coordinator over `store`.
    pub fn new(store: SharedEntityStore, db_read_customer_id: CustomerId) -> Self {
        let coordinator =
            InteractionCoordinator::new(store, CustomerLockingReader::new(), InteractionWriter::new());
        Self {
            coordinator: Arc::new(coordinator),
            db_read_customer_id,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plaintext", get(handlers::plaintext))
        .route("/json", post(handlers::json_echo))
        .route("/cpu", post(handlers::cpu))
        .route("/db", get(handlers::db_read))
        .route("/interaction", post(handlers::create_interaction))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(correlation::propagate))
        .with_state(state)
}

/// Open the store, bind, and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config.database)
        .await
        .context("failed to open entity store")?;
    let backend = store.backend();
    let state = AppState::new(store, CustomerId::new(config.server.db_read_customer_id));

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, backend, "pocbench listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
