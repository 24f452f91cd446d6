//! Shared types for the relay server.
//!
//! This module defines:
//! - channel aliases between connection tasks and the session task
//! - `SessionRequest`: messages flowing into the session task

use std::sync::Arc;

use pad_core::{
    Command, ConnectError, GameDefinition, KeyAction, KeyCode, SessionCode, SessionSnapshot,
    SlotLabel,
};
use pad_protocol::ServerFrame;
use tokio::sync::{mpsc, oneshot};

pub use pad_core::ConnectionId;

/// Outbound frames from the session task to a given connection.
pub type OutboundTx = mpsc::UnboundedSender<ServerFrame>;
pub type OutboundRx = mpsc::UnboundedReceiver<ServerFrame>;

/// Message flowing into the central session task.
///
/// Every read or write of session state goes through one of these.
#[derive(Debug)]
pub enum SessionRequest {
    /// Bind a new connection. On success the session task owns `outbound`
    /// and has already queued the welcome frame on it.
    Connect {
        conn: ConnectionId,
        outbound: OutboundTx,
        reply: oneshot::Sender<Result<SlotLabel, ConnectError>>,
    },

    Disconnect {
        conn: ConnectionId,
    },

    Command {
        conn: ConnectionId,
        command: Command,
    },

    /// Commit a freshly fetched game under a new code.
    Install {
        game: Arc<GameDefinition>,
        code: SessionCode,
        reply: oneshot::Sender<InstallOutcome>,
    },

    /// Drop the current game after a failed load. Replies with the
    /// retired code.
    Reset {
        reply: oneshot::Sender<Option<SessionCode>>,
    },

    Status {
        reply: oneshot::Sender<SessionSnapshot>,
    },

    /// Stop relaying and admitting connections. Replies with the code
    /// that should be deregistered.
    Shutdown {
        reply: oneshot::Sender<Option<SessionCode>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Committed; carries the code it replaced.
    Installed { retired: Option<SessionCode> },

    /// Shutdown already started; nothing changed.
    ShuttingDown,
}

/// Channel from connection tasks / control surface -> session task.
pub type SessionTx = mpsc::UnboundedSender<SessionRequest>;
pub type SessionRx = mpsc::UnboundedReceiver<SessionRequest>;

/// One key action for the input backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub action: KeyAction,
    pub code: KeyCode,
}

/// Channel from the session task -> injection worker.
pub type InjectionTx = mpsc::UnboundedSender<Injection>;
pub type InjectionRx = mpsc::UnboundedReceiver<Injection>;
