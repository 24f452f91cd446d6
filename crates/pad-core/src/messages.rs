//! Logical controller messages.
//!
//! These are transport-agnostic; the JSON wire shape lives in the
//! `pad-protocol` crate.

/// Direction of a key event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Down,
    Up,
}

impl KeyEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyEvent::Down => "down",
            KeyEvent::Up => "up",
        }
    }
}

/// A key event sent by a controller, tagged with a logical key name
/// (e.g. `"up"`, `"fire"`). The originating connection decides which
/// player slot it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub event: KeyEvent,
    pub key: String,
}

impl Command {
    pub fn down(key: impl Into<String>) -> Self {
        Command {
            event: KeyEvent::Down,
            key: key.into(),
        }
    }

    pub fn up(key: impl Into<String>) -> Self {
        Command {
            event: KeyEvent::Up,
            key: key.into(),
        }
    }
}
