//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Starts the session task (with its injection worker).
//! - Serves the HTTP control endpoints on a blocking thread.
//! - Accepts controller connections and assigns each a `ConnectionId`.
//! - Spawns a per-connection task to handle I/O.
//!
//! Everything stops once shutdown is signalled, either through
//! `GET /shutdown` or Ctrl-C.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::client;
use crate::config::Config;
use crate::control::ControlServer;
use crate::manager::{LoadSettings, Services, SessionHandle};
use crate::types::ConnectionId;

/// Counter for assigning unique `ConnectionId`s.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_connection_id() -> ConnectionId {
    ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// Run the relay with the given configuration until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let services = Services::from_config(&config);
    let session = SessionHandle::spawn(LoadSettings::from(&config), services);

    let control = ControlServer::start(&config.control_addr_string(), session.clone())?;
    info!("Control endpoints on {}", control.local_addr());

    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding controller gateway on {addr}"))?;
    info!("Controllers connect on {}", addr);

    {
        let session = session.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                session.shutdown().await;
            }
        });
    }

    serve_gateway(listener, session, config.max_connections).await?;
    control.stop();

    info!("Relay stopped");
    Ok(())
}

/// Accept controller connections until shutdown is signalled.
///
/// At most `max_connections` sockets are served at once; extra ones are
/// dropped on accept.
pub async fn serve_gateway(
    listener: TcpListener,
    session: SessionHandle,
    max_connections: usize,
) -> anyhow::Result<()> {
    let permits = Arc::new(Semaphore::new(max_connections));
    let mut shutdown = session.shutdown_signal();

    loop {
        let (stream, peer_addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = async { let _ = shutdown.wait_for(|stopped| *stopped).await; } => break,
        };

        let Ok(permit) = permits.clone().try_acquire_owned() else {
            warn!(
                "Rejecting connection from {}: max_connections ({}) reached",
                peer_addr, max_connections
            );
            // Just drop the stream; client will see the connection closed.
            continue;
        };

        let conn = next_connection_id();
        info!(conn = conn.0, "Accepted connection from {}", peer_addr);

        if let Err(e) = stream.set_nodelay(true) {
            warn!(conn = conn.0, "set_nodelay failed: {e}");
        }

        let session = session.clone();
        tokio::spawn(async move {
            if let Err(e) = client::run_client(conn, stream, session).await {
                error!(conn = conn.0, "Client error: {e:#}");
            }
            drop(permit);
        });
    }

    info!("Gateway stopped accepting connections");
    Ok(())
}
