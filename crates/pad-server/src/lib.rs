//! pad-server
//!
//! Turns phones into game controllers for a locally running game.
//!
//! - [`server`]    : wiring; TCP gateway accept loop
//! - [`manager`]   : async front of the session (load / shutdown)
//! - [`control`]   : HTTP control endpoints
//! - [`catalog`]   : game catalog client
//! - [`discovery`] : directory registration
//! - [`backend`]   : native key injection

pub mod backend;
pub mod catalog;
pub mod config;
pub mod control;
pub mod discovery;
pub mod manager;
pub mod server;
pub mod types;

// these are internal modules, not re-exported
mod client;
mod injector;
mod session_task;
