//! pad-core
//!
//! Pure session logic for the controller relay:
//! - game definitions (player count + key-binding table)
//! - player-slot labels and the free-slot pool
//! - session join codes
//! - the session state machine and command resolution

pub mod code;
pub mod error;
pub mod game;
pub mod messages;
pub mod relay;
pub mod session;
pub mod slot;

pub use code::SessionCode;
pub use error::{ConnectError, GameError};
pub use game::{GameDefinition, GameId, KeyCode};
pub use messages::{Command, KeyEvent};
pub use relay::{KeyAction, Resolution, Unresolved};
pub use session::{ConnectionId, Session, SessionSnapshot, SessionState};
pub use slot::{SlotLabel, SlotPool};
