//! Central session loop.
//!
//! This task owns the `Session` and the outbound channels of bound
//! connections, and processes every `SessionRequest` one at a time.
//! It is the single writer: a load is committed between two requests,
//! so a command is always resolved against one complete snapshot.
//!
//! Routing policy:
//! - resolved commands are queued for the injection worker, then the
//!   original command is sent to every *other* bound connection.
//! - unresolved commands are logged and dropped.

use std::collections::HashMap;

use pad_core::{Command, ConnectError, ConnectionId, Session, SlotLabel};
use pad_protocol::{CommandPayload, RejectReason, ServerFrame, Welcome};
use tracing::{debug, info, warn};

use crate::types::{
    Injection, InjectionTx, InstallOutcome, OutboundTx, SessionRequest, SessionRx,
};

struct SessionTask {
    session: Session,

    /// Outbound channels of bound connections only.
    outbound: HashMap<ConnectionId, OutboundTx>,
    injector: InjectionTx,
    shutting_down: bool,
}

/// Run the central session processing loop.
///
/// - `session_rx`: receives requests from connection tasks and the manager.
/// - `injector`: FIFO queue into the input backend worker.
pub async fn run_session_loop(mut session_rx: SessionRx, injector: InjectionTx) {
    let mut task = SessionTask {
        session: Session::new(),
        outbound: HashMap::new(),
        injector,
        shutting_down: false,
    };

    while let Some(req) = session_rx.recv().await {
        task.handle(req);
    }

    info!("Session loop shutting down (session_rx closed)");
}

impl SessionTask {
    fn handle(&mut self, req: SessionRequest) {
        match req {
            SessionRequest::Connect {
                conn,
                outbound,
                reply,
            } => {
                let result = self.connect(conn, outbound);
                let _ = reply.send(result);
            }
            SessionRequest::Disconnect { conn } => self.disconnect(conn),
            SessionRequest::Command { conn, command } => self.command(conn, command),
            SessionRequest::Install { game, code, reply } => {
                if self.shutting_down {
                    let _ = reply.send(InstallOutcome::ShuttingDown);
                    return;
                }
                info!(game = %game.id, name = %game.name, %code, "Installing game");
                let retired = self.session.install(game, code);
                self.evict_all(RejectReason::Reloaded);
                let _ = reply.send(InstallOutcome::Installed { retired });
            }
            SessionRequest::Reset { reply } => {
                let retired = self.session.reset();
                if retired.is_some() {
                    info!("Session reset, no game loaded");
                }
                self.evict_all(RejectReason::NotStarted);
                let _ = reply.send(retired);
            }
            SessionRequest::Status { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            SessionRequest::Shutdown { reply } => {
                info!("Session stopping");
                self.shutting_down = true;
                self.evict_all(RejectReason::ShuttingDown);
                let _ = reply.send(self.session.code().cloned());
            }
        }
    }

    fn connect(
        &mut self,
        conn: ConnectionId,
        outbound: OutboundTx,
    ) -> Result<SlotLabel, ConnectError> {
        if self.shutting_down {
            return Err(ConnectError::NotStarted);
        }

        let slot = match self.session.on_connect(conn) {
            Ok(slot) => slot,
            Err(e) => {
                info!(
                    conn = conn.0,
                    state = self.session.state().as_str(),
                    "Rejecting connection: {e}"
                );
                return Err(e);
            }
        };

        if let Some(game) = self.session.game() {
            let welcome = ServerFrame::Welcome(Welcome {
                slot: slot.to_string(),
                game: game.name.clone(),
                players: game.num_of_players,
                keys: game.keys,
            });
            let _ = outbound.send(welcome);
        }
        self.outbound.insert(conn, outbound);

        info!(
            conn = conn.0,
            %slot,
            state = self.session.state().as_str(),
            "Connection bound"
        );
        Ok(slot)
    }

    fn disconnect(&mut self, conn: ConnectionId) {
        self.outbound.remove(&conn);
        if let Some(slot) = self.session.on_disconnect(conn) {
            info!(
                conn = conn.0,
                %slot,
                state = self.session.state().as_str(),
                "Slot released"
            );
        }
    }

    fn command(&mut self, conn: ConnectionId, command: Command) {
        if self.shutting_down {
            return;
        }

        let resolution = match self.session.resolve_command(conn, &command) {
            Ok(resolution) => resolution,
            Err(reason) => {
                debug!(conn = conn.0, key = %command.key, "Ignoring command: {reason}");
                return;
            }
        };

        debug!(
            conn = conn.0,
            slot = %resolution.slot,
            key = %command.key,
            event = command.event.as_str(),
            "Relaying command"
        );

        let injection = Injection {
            action: resolution.action,
            code: resolution.code,
        };
        if self.injector.send(injection).is_err() {
            warn!("Injection worker gone; dropping key event");
        }

        let payload = CommandPayload::from(&command);
        for peer in resolution.peers {
            if let Some(tx) = self.outbound.get(&peer) {
                let _ = tx.send(ServerFrame::Command(payload.clone()));
            }
        }
    }

    /// Tell every bound connection why it lost its slot and drop its
    /// outbound channel, which closes the connection.
    fn evict_all(&mut self, reason: RejectReason) {
        for (_conn, tx) in self.outbound.drain() {
            let _ = tx.send(ServerFrame::Rejected { reason });
        }
    }
}
