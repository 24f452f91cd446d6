//! HTTP control endpoints.
//!
//! - `GET /game/:gameId` : load a game; answers once the load attempt
//!   has completed (200 with the game + join code, or an error status)
//! - `GET /shutdown`     : answer 200, then shut the relay down
//! - `GET /status`       : current session snapshot
//!
//! Served by tiny_http. The accept thread hands every request to its own
//! thread, which blocks on the async session handle through the runtime
//! handle captured at start, so `/status` and `/shutdown` are answered
//! while a `/game` load is still waiting on the catalog.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::catalog::CatalogError;
use crate::manager::{LoadError, SessionHandle};

pub struct ControlServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ShutdownBody {
    stopping: bool,
}

impl ControlServer {
    /// Bind `addr` and start serving. Must be called from within a
    /// tokio runtime.
    pub fn start(addr: &str, session: SessionHandle) -> anyhow::Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("binding control endpoints on {addr}: {e}"))?;
        let local = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| anyhow::anyhow!("control endpoints not bound to an IP address"))?;

        let server = Arc::new(server);
        let runtime = Handle::current();
        {
            let server = server.clone();
            thread::Builder::new()
                .name("pad-control".to_string())
                .spawn(move || serve(&server, &session, &runtime))?;
        }

        Ok(ControlServer {
            server,
            addr: local,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting requests; the serving thread exits.
    pub fn stop(&self) {
        self.server.unblock();
    }
}

fn serve(server: &Server, session: &SessionHandle, runtime: &Handle) {
    for request in server.incoming_requests() {
        let session = session.clone();
        let runtime = runtime.clone();
        let spawned = thread::Builder::new()
            .name("pad-control-req".to_string())
            .spawn(move || {
                if let Err(e) = handle_request(request, &session, &runtime) {
                    warn!("Control request failed: {e:#}");
                }
            });
        if let Err(e) = spawned {
            warn!("Dropping control request, no thread available: {e}");
        }
    }
    info!("Control endpoints stopped");
}

fn handle_request(
    request: Request,
    session: &SessionHandle,
    runtime: &Handle,
) -> anyhow::Result<()> {
    let method = request.method().clone();
    let path = request.url().split('?').next().unwrap_or_default().to_string();

    match (&method, path.as_str()) {
        (Method::Get, "/shutdown") => {
            request.respond(json_response(200, &ShutdownBody { stopping: true })?)?;
            runtime.block_on(session.shutdown());
        }
        (Method::Get, "/status") => {
            let response = match runtime.block_on(session.status()) {
                Ok(snapshot) => json_response(200, &snapshot)?,
                Err(e) => error_response(503, e.to_string())?,
            };
            request.respond(response)?;
        }
        (Method::Get, p) if p.starts_with("/game/") => {
            let game_id = &p["/game/".len()..];
            let response = if game_id.is_empty() || game_id.contains('/') {
                error_response(400, "missing game id".to_string())?
            } else {
                match runtime.block_on(session.load_game(game_id)) {
                    Ok(loaded) => json_response(200, &loaded)?,
                    Err(e) => error_response(load_error_status(&e), e.to_string())?,
                }
            };
            request.respond(response)?;
        }
        _ => {
            request.respond(error_response(404, "not found".to_string())?)?;
        }
    }

    Ok(())
}

fn load_error_status(err: &LoadError) -> u16 {
    match err {
        LoadError::Catalog(CatalogError::NotFound(_)) => 404,
        LoadError::Catalog(CatalogError::Timeout(_)) => 504,
        LoadError::Catalog(CatalogError::Unavailable(_) | CatalogError::Invalid(_)) => 502,
        LoadError::ShuttingDown | LoadError::SessionClosed(_) => 503,
    }
}

fn error_response(status: u16, error: String) -> anyhow::Result<Response<Cursor<Vec<u8>>>> {
    json_response(status, &ErrorBody { error })
}

fn json_response<T: Serialize>(status: u16, body: &T) -> anyhow::Result<Response<Cursor<Vec<u8>>>> {
    let json = serde_json::to_vec(body)?;
    let mut response = Response::from_data(json).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    Ok(response)
}
