// crates/pad-server/tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pad_core::{Command, GameDefinition, GameId, KeyAction, KeyCode, SessionCode, SessionSnapshot};
use pad_protocol::{
    decode_server_line, encode_client_frame, ClientFrame, CommandPayload, ServerFrame,
};
use pad_server::backend::RecordingBackend;
use pad_server::catalog::{Catalog, CatalogError};
use pad_server::discovery::{DirectoryClient, DirectoryError};
use pad_server::manager::{LoadSettings, Services, SessionHandle};
use pad_server::server::serve_gateway;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

pub const WAIT: Duration = Duration::from_secs(3);

// -----------------------------------------------------------------------------
// Fakes
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeCatalog {
    pub games: Mutex<HashMap<String, GameDefinition>>,
    pub down: AtomicBool,
    pub delay: Option<Duration>,
}

impl FakeCatalog {
    pub fn with(games: Vec<GameDefinition>) -> Self {
        let catalog = FakeCatalog::default();
        for game in games {
            catalog.add(game);
        }
        catalog
    }

    pub fn add(&self, game: GameDefinition) {
        self.games
            .lock()
            .unwrap()
            .insert(game.id.to_string(), game);
    }
}

impl Catalog for FakeCatalog {
    fn fetch(&self, game_id: &str) -> Result<GameDefinition, CatalogError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("connection refused".to_string()));
        }
        self.games
            .lock()
            .unwrap()
            .get(game_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(game_id.to_string()))
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    pub registered: Mutex<Vec<(String, String)>>,
    pub deregistered: Mutex<Vec<String>>,

    /// Number of upcoming registrations answered with "code taken".
    pub collisions: AtomicUsize,
    pub unreachable: AtomicBool,
}

impl FakeDirectory {
    pub fn registered_codes(&self) -> Vec<String> {
        self.registered
            .lock()
            .unwrap()
            .iter()
            .map(|(code, _)| code.clone())
            .collect()
    }

    pub fn deregistered_codes(&self) -> Vec<String> {
        self.deregistered.lock().unwrap().clone()
    }
}

impl DirectoryClient for FakeDirectory {
    fn register(&self, code: &SessionCode, ip: &str) -> Result<(), DirectoryError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("no route to host".to_string()));
        }
        self.registered
            .lock()
            .unwrap()
            .push((code.to_string(), ip.to_string()));

        let pending = self.collisions.load(Ordering::SeqCst);
        if pending > 0 {
            self.collisions.store(pending - 1, Ordering::SeqCst);
            return Err(DirectoryError::CodeTaken(code.clone()));
        }
        Ok(())
    }

    fn deregister(&self, code: &SessionCode) -> Result<(), DirectoryError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("no route to host".to_string()));
        }
        self.deregistered.lock().unwrap().push(code.to_string());
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Games
// -----------------------------------------------------------------------------

/// `bindings`: per slot, `(logical key, native code)` pairs.
pub fn game(id: &str, players: u32, bindings: &[(&str, &[(&str, &str)])]) -> GameDefinition {
    let key_bindings = bindings
        .iter()
        .map(|(slot, keys)| {
            let map = keys
                .iter()
                .map(|(k, code)| (k.to_string(), KeyCode::new(*code)))
                .collect();
            (slot.to_string(), map)
        })
        .collect();

    GameDefinition {
        id: GameId::new(id),
        name: format!("Game {id}"),
        num_of_players: players,
        keys: 2,
        key_bindings,
    }
}

pub fn pong() -> GameDefinition {
    game(
        "1",
        2,
        &[("player1", &[("up", "w")]), ("player2", &[("up", "ArrowUp")])],
    )
}

// -----------------------------------------------------------------------------
// Relay harness
// -----------------------------------------------------------------------------

pub struct Relay {
    pub session: SessionHandle,
    pub addr: SocketAddr,
    pub catalog: Arc<FakeCatalog>,
    pub directory: Arc<FakeDirectory>,
    pub backend: Arc<RecordingBackend>,
}

pub async fn start_relay(catalog: FakeCatalog, fetch_timeout: Duration) -> Relay {
    start_relay_with(catalog, FakeDirectory::default(), fetch_timeout).await
}

pub async fn start_relay_with(
    catalog: FakeCatalog,
    directory: FakeDirectory,
    fetch_timeout: Duration,
) -> Relay {
    let catalog = Arc::new(catalog);
    let directory = Arc::new(directory);
    let backend = Arc::new(RecordingBackend::new());

    let session = SessionHandle::spawn(
        LoadSettings {
            advertise_ip: "10.0.0.5".to_string(),
            fetch_timeout,
            register_attempts: 3,
        },
        Services {
            catalog: catalog.clone(),
            directory: directory.clone(),
            backend: backend.clone(),
        },
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_gateway(listener, session.clone(), 16));

    Relay {
        session,
        addr,
        catalog,
        directory,
        backend,
    }
}

impl Relay {
    /// Wait until the backend has seen `n` events, then return them.
    pub async fn backend_events(&self, n: usize) -> Vec<(KeyAction, KeyCode)> {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let events = self.backend.events();
            if events.len() >= n || tokio::time::Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Poll the session until `check` holds.
    pub async fn wait_status(&self, check: impl Fn(&SessionSnapshot) -> bool) -> SessionSnapshot {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let snapshot = self.session.status().await.unwrap();
            if check(&snapshot) || tokio::time::Instant::now() >= deadline {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

// -----------------------------------------------------------------------------
// Controller client
// -----------------------------------------------------------------------------

pub struct Controller {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Controller {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = stream.into_split();
        Controller {
            lines: BufReader::new(read).lines(),
            writer,
        }
    }

    /// Next frame, or `None` on EOF. Panics if nothing arrives in time.
    pub async fn next_frame(&mut self) -> Option<ServerFrame> {
        let line = tokio::time::timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for a frame")
            .unwrap()?;
        Some(decode_server_line(&line).unwrap())
    }

    /// Next frame if one arrives within `wait`.
    pub async fn try_frame(&mut self, wait: Duration) -> Option<ServerFrame> {
        match tokio::time::timeout(wait, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => Some(decode_server_line(&line).unwrap()),
            _ => None,
        }
    }

    pub async fn send(&mut self, command: Command) {
        let frame = ClientFrame::Command(CommandPayload::from(&command));
        self.send_raw(&encode_client_frame(&frame).unwrap()).await;
    }

    pub async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Connect and expect a welcome; returns the assigned slot label.
    pub async fn join(addr: SocketAddr) -> (Self, String) {
        let mut controller = Controller::connect(addr).await;
        match controller.next_frame().await {
            Some(ServerFrame::Welcome(welcome)) => (controller, welcome.slot),
            other => panic!("expected welcome, got {other:?}"),
        }
    }
}
