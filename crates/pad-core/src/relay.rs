//! Command resolution.
//!
//! Turns a `(connection, command)` pair into the native key action to
//! inject and the peers that should see the command echoed. Resolution
//! reads one session snapshot, so a command is never matched against
//! the slot table of one load and the bindings of another.
//!
//! Missing slot, missing slot bindings, and missing key are all
//! [`Unresolved`]: expected while a game is (re)loading, logged by the
//! caller and otherwise ignored.

use thiserror::Error;

use crate::code::SessionCode;
use crate::game::KeyCode;
use crate::messages::{Command, KeyEvent};
use crate::session::{ConnectionId, Session};
use crate::slot::SlotLabel;

/// What the input backend should do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

impl From<KeyEvent> for KeyAction {
    fn from(event: KeyEvent) -> Self {
        match event {
            KeyEvent::Down => KeyAction::Press,
            KeyEvent::Up => KeyAction::Release,
        }
    }
}

/// A resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub slot: SlotLabel,
    pub action: KeyAction,
    pub code: KeyCode,

    /// Join code of the session snapshot this was resolved against.
    pub session: SessionCode,

    /// Other bound connections, to receive the original command.
    pub peers: Vec<ConnectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unresolved {
    #[error("connection has no player slot")]
    NoSlot,

    #[error("game has no bindings for {0}")]
    NoBindings(SlotLabel),

    #[error("{slot} has no binding for key {key:?}")]
    NoKey { slot: SlotLabel, key: String },
}

impl Session {
    /// Resolve a command from `conn` against the current snapshot.
    ///
    /// Repeated downs (or ups) resolve every time; tracking which keys
    /// are held is the backend's concern.
    pub fn resolve_command(
        &self,
        conn: ConnectionId,
        command: &Command,
    ) -> Result<Resolution, Unresolved> {
        let loaded = self.loaded.as_ref().ok_or(Unresolved::NoSlot)?;
        let slot = self.resolve_slot(conn).ok_or(Unresolved::NoSlot)?;

        let key_map = loaded
            .game
            .key_map(slot)
            .ok_or(Unresolved::NoBindings(slot))?;
        let code = key_map
            .get(&command.key)
            .cloned()
            .ok_or_else(|| Unresolved::NoKey {
                slot,
                key: command.key.clone(),
            })?;

        Ok(Resolution {
            slot,
            action: command.event.into(),
            code,
            session: loaded.code.clone(),
            peers: self.peers(conn),
        })
    }
}
