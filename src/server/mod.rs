//! Decision API server
//!
//! A small HTTP surface for the webhook dispatcher: it posts an already
//! decoded [`Event`](crate::event::Event) and gets the verdict back.

pub mod routes;

pub use routes::{DecisionResponse, ServerState, router};

use crate::acl::AclEngine;
use crate::config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run the decision API until `shutdown` is cancelled
///
/// In-flight decisions observe the same token and stop early.
pub async fn run_server(
    config: &ServerConfig,
    engine: Arc<AclEngine>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let bind: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = ServerState::new(engine, config, shutdown.clone());
    let app = router(state);

    let listener = TcpListener::bind(bind).await?;
    info!("Decision API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Decision API stopped");
    Ok(())
}
