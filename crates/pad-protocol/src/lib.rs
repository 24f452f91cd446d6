//! pad-protocol
//!
//! Wire-level encoding/decoding between controller clients and the
//! relay's connection gateway.
//!
//! Every frame is one JSON object on its own line, tagged by `event`:
//!
//! ```text
//! -> {"event":"command","data":{"type":"down","key":"up"}}
//! <- {"event":"welcome","data":{"slot":"player1","game":"Pong","players":2,"keys":2}}
//! <- {"event":"command","data":{"type":"down","key":"up"}}
//! <- {"event":"rejected","data":{"reason":"full"}}
//! ```
//!
//! - [`wire_types`] : frame shapes
//! - [`json_codec`] : line encode / decode

pub mod json_codec;
pub mod wire_types;

pub use json_codec::{
    decode_client_line, decode_server_line, encode_client_frame, encode_server_frame,
    ProtocolError, MAX_LINE_LEN,
};
pub use wire_types::{
    ClientFrame, CommandPayload, RejectReason, ServerFrame, WireKeyEvent, Welcome,
};
