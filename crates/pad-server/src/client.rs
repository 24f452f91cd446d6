//! Per-connection I/O.
//!
//! One task per controller socket:
//! - asks the session for a slot; a refused connection gets a single
//!   `rejected` frame and is closed;
//! - a writer drains the connection's outbound queue as JSON lines;
//! - a reader parses inbound lines and forwards commands in arrival order.
//!
//! The connection ends when the peer closes, when the session drops the
//! outbound queue (reload / shutdown), or when shutdown is signalled.
//! In every case the session is told about the disconnect.

use std::time::Duration;

use pad_core::ConnectError;
use pad_protocol::{
    decode_client_line, encode_server_frame, ClientFrame, RejectReason, ServerFrame, MAX_LINE_LEN,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::manager::SessionHandle;
use crate::types::{ConnectionId, OutboundRx, OutboundTx};

const FAREWELL_GRACE: Duration = Duration::from_millis(500);

/// Run the client I/O loop for a single connection.
pub async fn run_client(
    conn: ConnectionId,
    stream: TcpStream,
    session: SessionHandle,
) -> anyhow::Result<()> {
    let (read_stream, mut write_stream) = stream.into_split();
    let mut shutdown = session.shutdown_signal();

    let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

    if let Err(e) = session.connect(conn, out_tx).await {
        let reason = match e {
            ConnectError::NotStarted => RejectReason::NotStarted,
            ConnectError::Full => RejectReason::Full,
        };
        write_frame(&mut write_stream, &ServerFrame::Rejected { reason }).await?;
        write_stream.shutdown().await?;
        return Ok(());
    }

    let mut writer = tokio::spawn(run_writer(conn, write_stream, out_rx));

    tokio::select! {
        res = run_reader(conn, read_stream, &session) => {
            if let Err(e) = res {
                debug!(conn = conn.0, "Read side ended: {e:#}");
            }
            writer.abort();
        }
        _ = &mut writer => {
            debug!(conn = conn.0, "Outbound queue closed by session");
        }
        // The watch guard must not outlive the wait, or this future stops being Send.
        _ = async { let _ = shutdown.wait_for(|stopped| *stopped).await; } => {
            // The session has already queued a farewell frame and dropped
            // our queue; give the writer a moment to flush it.
            if tokio::time::timeout(FAREWELL_GRACE, &mut writer).await.is_err() {
                writer.abort();
            }
        }
    }

    session.disconnect(conn);
    Ok(())
}

async fn run_reader(
    conn: ConnectionId,
    mut read_stream: OwnedReadHalf,
    session: &SessionHandle,
) -> anyhow::Result<()> {
    let mut buffer = Vec::new();
    let mut temp_buf = [0u8; 1024];

    loop {
        let n = read_stream.read(&mut temp_buf).await?;
        if n == 0 {
            info!(conn = conn.0, "Client disconnected");
            return Ok(());
        }
        buffer.extend_from_slice(&temp_buf[..n]);

        // Process complete lines
        while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
            let line = buffer.drain(..=newline_pos).collect::<Vec<u8>>();
            let line_str = String::from_utf8_lossy(&line);
            let line_str = line_str.trim();

            if line_str.is_empty() {
                continue;
            }

            match decode_client_line(line_str) {
                Ok(ClientFrame::Command(payload)) => session.command(conn, payload.into()),
                Err(e) => warn!(conn = conn.0, "Ignoring frame: {e}"),
            }
        }

        if buffer.len() > MAX_LINE_LEN {
            anyhow::bail!("line exceeds {MAX_LINE_LEN} bytes without newline");
        }
    }
}

async fn run_writer(conn: ConnectionId, mut write_stream: OwnedWriteHalf, mut out_rx: OutboundRx) {
    while let Some(frame) = out_rx.recv().await {
        if let Err(e) = write_frame(&mut write_stream, &frame).await {
            warn!(conn = conn.0, "Write error: {e:#}");
            return;
        }
    }
    let _ = write_stream.shutdown().await;
}

async fn write_frame(stream: &mut OwnedWriteHalf, frame: &ServerFrame) -> anyhow::Result<()> {
    let mut line = encode_server_frame(frame)?;
    line.push('\n');

    stream.write_all(line.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}
