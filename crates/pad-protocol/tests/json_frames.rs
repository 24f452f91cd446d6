// crates/pad-protocol/tests/json_frames.rs
use pad_core::{Command, KeyEvent};
use pad_protocol::{
    decode_client_line, decode_server_line, encode_server_frame, ClientFrame, CommandPayload,
    ProtocolError, RejectReason, ServerFrame, WireKeyEvent, Welcome,
};

#[test]
fn decodes_command_frame() {
    let frame =
        decode_client_line(r#" {"event":"command","data":{"type":"down","key":"up"}} "#).unwrap();
    let ClientFrame::Command(payload) = frame;
    let command: Command = payload.into();
    assert_eq!(command.event, KeyEvent::Down);
    assert_eq!(command.key, "up");
}

#[test]
fn rejects_unknown_event_type() {
    let err = decode_client_line(r#"{"event":"command","data":{"type":"tap","key":"up"}}"#);
    assert!(matches!(err, Err(ProtocolError::Json(_))));

    let err = decode_client_line(r#"{"event":"chat","data":"hi"}"#);
    assert!(matches!(err, Err(ProtocolError::Json(_))));
}

#[test]
fn rejects_blank_and_oversized_lines() {
    assert!(matches!(decode_client_line("   "), Err(ProtocolError::Empty)));

    let huge = format!(
        r#"{{"event":"command","data":{{"type":"up","key":"{}"}}}}"#,
        "k".repeat(5000)
    );
    assert!(matches!(
        decode_client_line(&huge),
        Err(ProtocolError::TooLong(_))
    ));
}

#[test]
fn echoed_command_keeps_original_shape() {
    let frame = ServerFrame::Command(CommandPayload::from(&Command::up("fire")));
    let line = encode_server_frame(&frame).unwrap();
    assert_eq!(line, r#"{"event":"command","data":{"type":"up","key":"fire"}}"#);
}

#[test]
fn welcome_and_rejection_encode_as_documented() {
    let welcome = ServerFrame::Welcome(Welcome {
        slot: "player2".to_string(),
        game: "Pong".to_string(),
        players: 2,
        keys: 3,
    });
    let line = encode_server_frame(&welcome).unwrap();
    assert_eq!(
        line,
        r#"{"event":"welcome","data":{"slot":"player2","game":"Pong","players":2,"keys":3}}"#
    );
    assert_eq!(decode_server_line(&line).unwrap(), welcome);

    let rejected = ServerFrame::Rejected {
        reason: RejectReason::NotStarted,
    };
    assert_eq!(
        encode_server_frame(&rejected).unwrap(),
        r#"{"event":"rejected","data":{"reason":"not_started"}}"#
    );
}

#[test]
fn wire_event_maps_both_ways() {
    assert_eq!(KeyEvent::from(WireKeyEvent::Up), KeyEvent::Up);
    assert_eq!(WireKeyEvent::from(KeyEvent::Down), WireKeyEvent::Down);
}
