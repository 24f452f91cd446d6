//! Frame shapes exchanged with controller clients.
//!
//! The `command` payload is identical in both directions: the relay
//! echoes exactly what the originator sent to its peers.

use pad_core::{Command, KeyEvent};
use serde::{Deserialize, Serialize};

/// `"down"` / `"up"` on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKeyEvent {
    Down,
    Up,
}

impl From<WireKeyEvent> for KeyEvent {
    fn from(event: WireKeyEvent) -> Self {
        match event {
            WireKeyEvent::Down => KeyEvent::Down,
            WireKeyEvent::Up => KeyEvent::Up,
        }
    }
}

impl From<KeyEvent> for WireKeyEvent {
    fn from(event: KeyEvent) -> Self {
        match event {
            KeyEvent::Down => WireKeyEvent::Down,
            KeyEvent::Up => WireKeyEvent::Up,
        }
    }
}

/// `{ "type": "down" | "up", "key": "<logical key>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPayload {
    #[serde(rename = "type")]
    pub event: WireKeyEvent,
    pub key: String,
}

impl From<CommandPayload> for Command {
    fn from(payload: CommandPayload) -> Self {
        Command {
            event: payload.event.into(),
            key: payload.key,
        }
    }
}

impl From<&Command> for CommandPayload {
    fn from(command: &Command) -> Self {
        CommandPayload {
            event: command.event.into(),
            key: command.key.clone(),
        }
    }
}

/// Client -> relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    Command(CommandPayload),
}

/// Sent once after a connection is bound to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    pub slot: String,
    pub game: String,
    pub players: u32,

    /// How many inputs the controller UI should render.
    pub keys: u32,
}

/// Why the relay is closing (or refusing) a connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotStarted,
    Full,

    /// A new game was loaded; slots from the previous one are void.
    Reloaded,
    ShuttingDown,
}

/// Relay -> client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    Welcome(Welcome),
    Rejected { reason: RejectReason },
    Command(CommandPayload),
}
