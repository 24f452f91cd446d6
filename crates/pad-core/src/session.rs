//! Session state machine.
//!
//! One [`Session`] exists per process. It owns the current game, the
//! join code and the slot table, and is the single place they change.
//!
//! The three always move together: they live in one [`Loaded`] value,
//! so installing a game (or resetting) is a single assignment and no
//! reader can pair a new code with an old binding table.
//!
//! State is derived from the snapshot rather than stored:
//! - no game                      => `NotStarted`
//! - game, no player bound        => `WaitingForPlayers`
//! - game, some slots free        => `Active`
//! - game, every slot bound       => `Full`

use std::sync::Arc;

use serde::Serialize;

use crate::code::SessionCode;
use crate::error::ConnectError;
use crate::game::{GameDefinition, GameId};
use crate::slot::{SlotLabel, SlotPool};

/// Identifier for a client connection.
///
/// Owned by the gateway; we only rely on it being unique over the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    WaitingForPlayers,
    Active,
    Full,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::NotStarted => "not_started",
            SessionState::WaitingForPlayers => "waiting_for_players",
            SessionState::Active => "active",
            SessionState::Full => "full",
        }
    }
}

/// Everything that belongs to one successful load.
#[derive(Debug)]
pub(crate) struct Loaded {
    pub(crate) game: Arc<GameDefinition>,
    pub(crate) code: SessionCode,
    pub(crate) pool: SlotPool,

    /// Bound connections in connection order.
    pub(crate) assignments: Vec<(ConnectionId, SlotLabel)>,
}

#[derive(Debug, Default)]
pub struct Session {
    pub(crate) loaded: Option<Loaded>,
}

/// Read-only view of the session, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub code: Option<String>,
    pub game: Option<GameId>,
    pub name: Option<String>,
    pub num_of_players: Option<u32>,
    pub keys: Option<u32>,
    pub players: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Install a new game under a new code.
    ///
    /// Clears every slot binding. Returns the code being replaced, if
    /// any, so the caller can retire it with the directory.
    pub fn install(&mut self, game: Arc<GameDefinition>, code: SessionCode) -> Option<SessionCode> {
        let pool = SlotPool::new(game.num_of_players);
        let previous = self.loaded.replace(Loaded {
            game,
            code,
            pool,
            assignments: Vec::new(),
        });
        previous.map(|loaded| loaded.code)
    }

    /// Drop the current game (failed reload). Returns the retired code.
    pub fn reset(&mut self) -> Option<SessionCode> {
        self.loaded.take().map(|loaded| loaded.code)
    }

    /// Bind a connection to the smallest free player slot.
    ///
    /// Connecting an already bound connection returns its existing slot.
    pub fn on_connect(&mut self, conn: ConnectionId) -> Result<SlotLabel, ConnectError> {
        let loaded = self.loaded.as_mut().ok_or(ConnectError::NotStarted)?;

        if let Some(slot) = lookup(&loaded.assignments, conn) {
            return Ok(slot);
        }

        let slot = loaded.pool.acquire().ok_or(ConnectError::Full)?;
        loaded.assignments.push((conn, slot));
        debug_assert!(loaded.assignments.len() as u32 <= loaded.pool.capacity());
        Ok(slot)
    }

    /// Release the connection's slot, if it holds one.
    pub fn on_disconnect(&mut self, conn: ConnectionId) -> Option<SlotLabel> {
        let loaded = self.loaded.as_mut()?;
        let idx = loaded.assignments.iter().position(|(c, _)| *c == conn)?;
        let (_, slot) = loaded.assignments.remove(idx);
        loaded.pool.release(slot);
        Some(slot)
    }

    pub fn resolve_slot(&self, conn: ConnectionId) -> Option<SlotLabel> {
        self.loaded
            .as_ref()
            .and_then(|loaded| lookup(&loaded.assignments, conn))
    }

    /// Every bound connection except `conn`, in connection order.
    pub fn peers(&self, conn: ConnectionId) -> Vec<ConnectionId> {
        match &self.loaded {
            Some(loaded) => loaded
                .assignments
                .iter()
                .map(|(c, _)| *c)
                .filter(|c| *c != conn)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        match &self.loaded {
            None => SessionState::NotStarted,
            Some(loaded) if loaded.pool.is_exhausted() => SessionState::Full,
            Some(loaded) if loaded.assignments.is_empty() => SessionState::WaitingForPlayers,
            Some(_) => SessionState::Active,
        }
    }

    pub fn game(&self) -> Option<&Arc<GameDefinition>> {
        self.loaded.as_ref().map(|loaded| &loaded.game)
    }

    pub fn code(&self) -> Option<&SessionCode> {
        self.loaded.as_ref().map(|loaded| &loaded.code)
    }

    /// Number of bound connections.
    pub fn player_count(&self) -> usize {
        self.loaded
            .as_ref()
            .map_or(0, |loaded| loaded.assignments.len())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        match &self.loaded {
            None => SessionSnapshot {
                state,
                code: None,
                game: None,
                name: None,
                num_of_players: None,
                keys: None,
                players: Vec::new(),
            },
            Some(loaded) => {
                let mut players: Vec<SlotLabel> =
                    loaded.assignments.iter().map(|(_, slot)| *slot).collect();
                players.sort();
                SessionSnapshot {
                    state,
                    code: Some(loaded.code.to_string()),
                    game: Some(loaded.game.id.clone()),
                    name: Some(loaded.game.name.clone()),
                    num_of_players: Some(loaded.game.num_of_players),
                    keys: Some(loaded.game.keys),
                    players: players.iter().map(SlotLabel::to_string).collect(),
                }
            }
        }
    }
}

fn lookup(assignments: &[(ConnectionId, SlotLabel)], conn: ConnectionId) -> Option<SlotLabel> {
    assignments
        .iter()
        .find(|(c, _)| *c == conn)
        .map(|(_, slot)| *slot)
}
