//! Error types for the core session logic.
//!
//! Unresolvable commands are not errors (see [`crate::relay::Unresolved`]);
//! only connection admission and game validation can fail.

use thiserror::Error;

/// Why a connection could not be bound to a player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// No game is loaded yet.
    #[error("no game has been started")]
    NotStarted,

    /// Every player slot is taken.
    #[error("all player slots are taken")]
    Full,
}

/// A game definition that cannot be installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game {0} declares zero players")]
    NoPlayers(String),
}
