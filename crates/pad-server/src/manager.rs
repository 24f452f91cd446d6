//! Async front of the session.
//!
//! [`SessionHandle`] is what the gateway and the control surface hold.
//! Simple operations are a message to the session task; `load_game`
//! and `shutdown` also talk to the catalog and the directory, and do
//! so *outside* the session task so connect/disconnect/command traffic
//! keeps flowing while a fetch is in flight.
//!
//! A load is two-phase:
//! 1. fetch the game (bounded by `fetch_timeout`) and claim a code with
//!    the directory, touching no session state;
//! 2. commit game + code in one `Install` request.
//!
//! A failed fetch commits a `Reset` instead, so a stale binding table
//! never survives a failed reload.
//!
//! The new code is registered before `Install` commits, so the committed
//! snapshot always carries a code the directory already knows. Until the
//! commit lands, the directory may send a player to this relay while it
//! still serves the previous game; that player is bound to the old game
//! and then receives `rejected: reloaded` with everyone else, and joins
//! the new game on reconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pad_core::{
    Command, ConnectError, ConnectionId, GameDefinition, GameId, SessionCode, SessionSnapshot,
    SlotLabel,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

use crate::backend::{CommandBackend, InputBackend, LogBackend};
use crate::catalog::{Catalog, CatalogError, HttpCatalog};
use crate::config::Config;
use crate::discovery::{DirectoryClient, DirectoryError, HttpDirectory, NoDirectory};
use crate::injector;
use crate::session_task;
use crate::types::{InstallOutcome, OutboundTx, SessionRequest, SessionTx};

/// The session task has stopped.
#[derive(Debug, Clone, Copy, Error)]
#[error("session task is gone")]
pub struct SessionClosed;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("relay is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    SessionClosed(#[from] SessionClosed),
}

/// What a successful load reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedGame {
    pub id: GameId,
    pub name: String,
    pub num_of_players: u32,
    pub keys: u32,
    pub code: String,
}

/// External collaborators of the session.
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn Catalog>,
    pub directory: Arc<dyn DirectoryClient>,
    pub backend: Arc<dyn InputBackend>,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let catalog: Arc<dyn Catalog> =
            Arc::new(HttpCatalog::new(config.catalog_url.clone(), config.fetch_timeout));

        let directory: Arc<dyn DirectoryClient> = match &config.directory_url {
            Some(url) => Arc::new(HttpDirectory::new(url.clone(), config.fetch_timeout)),
            None => Arc::new(NoDirectory),
        };

        let backend: Arc<dyn InputBackend> = match config
            .key_command
            .as_deref()
            .and_then(CommandBackend::from_command_line)
        {
            Some(backend) => Arc::new(backend),
            None => Arc::new(LogBackend),
        };

        Services {
            catalog,
            directory,
            backend,
        }
    }
}

/// Knobs for `load_game`.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub advertise_ip: String,
    pub fetch_timeout: Duration,
    pub register_attempts: u32,
}

impl From<&Config> for LoadSettings {
    fn from(config: &Config) -> Self {
        LoadSettings {
            advertise_ip: config.advertise_ip.clone(),
            fetch_timeout: config.fetch_timeout,
            register_attempts: config.register_attempts,
        }
    }
}

struct Inner {
    tx: SessionTx,
    catalog: Arc<dyn Catalog>,
    directory: Arc<dyn DirectoryClient>,
    settings: LoadSettings,
    stopping: AtomicBool,
    shutdown: watch::Sender<bool>,
}

/// Cloneable handle to the single session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl SessionHandle {
    /// Start the session task and the injection worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(settings: LoadSettings, services: Services) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (injection_tx, injection_rx) = mpsc::unbounded_channel();

        injector::spawn_injector(injection_rx, services.backend);
        tokio::spawn(session_task::run_session_loop(rx, injection_tx));

        let (shutdown, _) = watch::channel(false);
        SessionHandle {
            inner: Arc::new(Inner {
                tx,
                catalog: services.catalog,
                directory: services.directory,
                settings,
                stopping: AtomicBool::new(false),
                shutdown,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Gateway notifications
    // -------------------------------------------------------------------------

    pub async fn connect(
        &self,
        conn: ConnectionId,
        outbound: OutboundTx,
    ) -> Result<SlotLabel, ConnectError> {
        match self
            .request(|reply| SessionRequest::Connect {
                conn,
                outbound,
                reply,
            })
            .await
        {
            Ok(result) => result,
            Err(SessionClosed) => Err(ConnectError::NotStarted),
        }
    }

    pub fn disconnect(&self, conn: ConnectionId) {
        let _ = self.inner.tx.send(SessionRequest::Disconnect { conn });
    }

    /// Queue a command. Never fails from the caller's point of view.
    pub fn command(&self, conn: ConnectionId, command: Command) {
        let _ = self.inner.tx.send(SessionRequest::Command { conn, command });
    }

    pub async fn status(&self) -> Result<SessionSnapshot, SessionClosed> {
        self.request(|reply| SessionRequest::Status { reply }).await
    }

    // -------------------------------------------------------------------------
    // Load / shutdown
    // -------------------------------------------------------------------------

    /// Fetch `game_id` from the catalog and make it the current game.
    ///
    /// Returns only once the attempt has completed. On failure the
    /// session is left with no game loaded.
    pub async fn load_game(&self, game_id: &str) -> Result<LoadedGame, LoadError> {
        info!(game_id, "Loading game");

        let game = match self.fetch(game_id).await {
            Ok(game) => Arc::new(game),
            Err(e) => {
                warn!(game_id, "Load failed: {e}");
                let retired = self.request(|reply| SessionRequest::Reset { reply }).await?;
                if let Some(code) = retired {
                    self.deregister(code).await;
                }
                return Err(e.into());
            }
        };

        let code = self.claim_code().await;

        let outcome = self
            .request(|reply| SessionRequest::Install {
                game: game.clone(),
                code: code.clone(),
                reply,
            })
            .await?;

        match outcome {
            InstallOutcome::Installed { retired } => {
                if let Some(old) = retired.filter(|old| *old != code) {
                    self.deregister(old).await;
                }
            }
            InstallOutcome::ShuttingDown => {
                self.deregister(code).await;
                return Err(LoadError::ShuttingDown);
            }
        }

        info!(game = %game.id, name = %game.name, %code, "Game loaded");
        Ok(LoadedGame {
            id: game.id.clone(),
            name: game.name.clone(),
            num_of_players: game.num_of_players,
            keys: game.keys,
            code: code.to_string(),
        })
    }

    /// Stop relaying, deregister best-effort, then signal the process
    /// to exit. Later calls are no-ops.
    pub async fn shutdown(&self) {
        if self.inner.stopping.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutdown requested");

        match self.request(|reply| SessionRequest::Shutdown { reply }).await {
            Ok(Some(code)) => self.deregister(code).await,
            Ok(None) => {}
            Err(SessionClosed) => warn!("Session task already gone at shutdown"),
        }

        self.inner.shutdown.send_replace(true);
    }

    /// Resolves to `true` once shutdown has been signalled.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionRequest,
    ) -> Result<T, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.inner.tx.send(make(reply)).map_err(|_| SessionClosed)?;
        rx.await.map_err(|_| SessionClosed)
    }

    async fn fetch(&self, game_id: &str) -> Result<GameDefinition, CatalogError> {
        let catalog = self.inner.catalog.clone();
        let id = game_id.to_string();
        let timeout = self.inner.settings.fetch_timeout;

        let fetch = tokio::task::spawn_blocking(move || catalog.fetch(&id));
        let game = match tokio::time::timeout(timeout, fetch).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(CatalogError::Unavailable(format!("catalog task failed: {e}")));
            }
            Err(_) => return Err(CatalogError::Timeout(timeout)),
        };

        game.validate()
            .map_err(|e| CatalogError::Invalid(e.to_string()))?;
        Ok(game)
    }

    /// Pick a fresh code and register it, retrying on collisions.
    ///
    /// Never fails: if the directory is unreachable (or every attempt
    /// collides) the last code is used without discoverability.
    async fn claim_code(&self) -> SessionCode {
        let attempts = self.inner.settings.register_attempts.max(1);
        let mut attempt = 1;

        loop {
            let code = SessionCode::generate(&mut rand::thread_rng());
            let directory = self.inner.directory.clone();
            let ip = self.inner.settings.advertise_ip.clone();
            let candidate = code.clone();

            let result =
                tokio::task::spawn_blocking(move || directory.register(&candidate, &ip)).await;
            match result {
                Ok(Ok(())) => {
                    info!(%code, "Registered with directory");
                    return code;
                }
                Ok(Err(DirectoryError::CodeTaken(_))) if attempt < attempts => {
                    warn!(%code, attempt, "Code already registered, retrying");
                    attempt += 1;
                }
                Ok(Err(e)) => {
                    warn!(%code, "Continuing without discoverability: {e}");
                    return code;
                }
                Err(e) => {
                    warn!(%code, "Directory task failed: {e}");
                    return code;
                }
            }
        }
    }

    async fn deregister(&self, code: SessionCode) {
        let directory = self.inner.directory.clone();
        let retired = code.clone();

        match tokio::task::spawn_blocking(move || directory.deregister(&retired)).await {
            Ok(Ok(())) => info!(%code, "Deregistered from directory"),
            Ok(Err(e)) => warn!(%code, "Deregistration failed: {e}"),
            Err(e) => warn!(%code, "Directory task failed: {e}"),
        }
    }
}
