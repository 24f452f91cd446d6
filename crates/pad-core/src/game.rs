//! Game definitions as returned by the catalog.
//!
//! A definition is immutable once loaded; the session holds it behind an
//! `Arc` and a reload installs a wholly new instance.
//!
//! Catalog payload:
//!
//! ```json
//! { "id": 3, "name": "Pong", "numOfPlayers": 2, "keys": 2,
//!   "keyBindings": { "player1": { "up": "w" }, "player2": { "up": "up" } } }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::slot::SlotLabel;

/// Catalog identifier of a game.
///
/// The catalog stores numeric ids but lookups arrive as path strings,
/// so both forms deserialize into the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawGameId")]
pub struct GameId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGameId {
    Number(u64),
    Text(String),
}

impl From<RawGameId> for GameId {
    fn from(raw: RawGameId) -> Self {
        match raw {
            RawGameId::Number(n) => GameId(n.to_string()),
            RawGameId::Text(s) => GameId(s),
        }
    }
}

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        GameId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native key code understood by the input backend (`"w"`, `"up"`, `"space"`...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    pub fn new(code: impl Into<String>) -> Self {
        KeyCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical key name -> native key code, for one player slot.
pub type KeyMap = HashMap<String, KeyCode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDefinition {
    pub id: GameId,
    pub name: String,

    /// Capacity of the session; slots `player1..=playerN` exist.
    pub num_of_players: u32,

    /// Number of simultaneous inputs the controller UI must render.
    pub keys: u32,

    /// Slot label (`"player1"`, ...) -> key map. Labels beyond
    /// `num_of_players` are kept but can never be bound.
    pub key_bindings: HashMap<String, KeyMap>,
}

impl GameDefinition {
    /// Check the definition can back a session.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.num_of_players == 0 {
            return Err(GameError::NoPlayers(self.id.to_string()));
        }
        Ok(())
    }

    /// Key map for a slot, if the game defines one.
    pub fn key_map(&self, slot: SlotLabel) -> Option<&KeyMap> {
        self.key_bindings.get(&slot.to_string())
    }

    /// Native code bound to `key` for `slot`.
    pub fn binding(&self, slot: SlotLabel, key: &str) -> Option<&KeyCode> {
        self.key_map(slot).and_then(|map| map.get(key))
    }
}
