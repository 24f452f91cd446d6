//! Injection worker.
//!
//! A single blocking loop draining the injection queue in FIFO order.
//! The session task enqueues in the order it resolves commands, so events
//! from one connection reach the backend in arrival order, and a slow
//! backend never stalls connect/disconnect traffic.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::InputBackend;
use crate::types::{Injection, InjectionRx};

pub fn spawn_injector(mut rx: InjectionRx, backend: Arc<dyn InputBackend>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while let Some(Injection { action, code }) = rx.blocking_recv() {
            debug!(?action, key = %code, "injecting");
            if let Err(e) = backend.apply(action, &code) {
                warn!(?action, key = %code, "input backend failed: {e:#}");
            }
        }
        debug!("Injection worker shutting down (queue closed)");
    })
}
