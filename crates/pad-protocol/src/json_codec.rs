//! Line codec.
//!
//! Encoders return the JSON text *without* the trailing newline; the
//! gateway owns framing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::wire_types::{ClientFrame, ServerFrame};

/// Longest line the gateway will buffer before dropping a connection.
pub const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty line")]
    Empty,

    #[error("line of {0} bytes exceeds limit")]
    TooLong(usize),

    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn decode_client_line(line: &str) -> Result<ClientFrame, ProtocolError> {
    decode(line)
}

pub fn decode_server_line(line: &str) -> Result<ServerFrame, ProtocolError> {
    decode(line)
}

pub fn encode_server_frame(frame: &ServerFrame) -> Result<String, ProtocolError> {
    encode(frame)
}

pub fn encode_client_frame(frame: &ClientFrame) -> Result<String, ProtocolError> {
    encode(frame)
}

fn decode<T: DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::Empty);
    }
    if trimmed.len() > MAX_LINE_LEN {
        return Err(ProtocolError::TooLong(trimmed.len()));
    }
    Ok(serde_json::from_str(trimmed)?)
}

fn encode<T: Serialize>(frame: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(frame)?)
}
