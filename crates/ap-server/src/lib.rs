//! ap-server: the HTTP layer of audiopress.
//!
//! Exposes `/convert` and `/health`, wiring the engine transcoder and
//! configuration into route handlers through [`context::AppContext`].

pub mod context;
pub mod error;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use ap_core::{Config, Result};
use ap_engine::Transcoder;

use crate::context::AppContext;
use crate::router::build_router;

/// Start the HTTP server and block until shutdown.
///
/// The transcoder (and with it the resolved engine path) is constructed
/// once by the caller and owned by the context; requests only ever read
/// it.
pub async fn start(config: Config, transcoder: Transcoder) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ap_core::Error::Internal(format!("invalid listen address: {e}")))?;

    let ctx = AppContext {
        config: Arc::new(config),
        transcoder: Arc::new(transcoder),
    };
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on ctrl-c so in-flight conversions can drain.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
