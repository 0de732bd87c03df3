//! Integration Tests für das WebSocket Client-Protokoll
//!
//! Handshake und Frame-Empfang laufen wie in der Firmware hintereinander
//! auf demselben Stream, nur ohne Netzwerk.

mod common;

use common::{MockStream, server_frame};
use embassy_futures::block_on;
use esp_core::ws::frame::FrameType;
use esp_core::ws::handshake::{self, HandshakeError};
use esp_core::ws::{Received, RecvError, recv_frame};
use esp_core::{InboundMessage, LedState, codec};

const NONCE: &[u8; 16] = b"the sample nonce";

const SWITCHING_PROTOCOLS: &[u8] = b"HTTP/1.1 101 Switching Protocols\r\n\
Upgrade: websocket\r\n\
Connection: Upgrade\r\n\
Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\r\n";

const WEBSOCKET_BUFFER_SIZE: usize = 512;

// ============================================================================
// Tests: Handshake
// ============================================================================

#[test]
fn test_handshake_sends_upgrade_request() {
    let mut stream = MockStream::new(SWITCHING_PROTOCOLS);
    let mut buf = [0u8; 512];

    let result = block_on(handshake::perform(
        &mut stream,
        "led.example",
        443,
        "/",
        NONCE,
        &mut buf,
    ));
    assert_eq!(result, Ok(()));

    let request = String::from_utf8(stream.written.clone()).unwrap();
    assert!(request.starts_with("GET / HTTP/1.1\r\n"));
    assert!(request.contains("Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n"));
}

#[test]
fn test_handshake_leaves_first_frame_in_stream() {
    let frame = server_frame(0x1, br#"{"type":"remote_change_state","state":"blue"}"#);
    let mut input = SWITCHING_PROTOCOLS.to_vec();
    input.extend_from_slice(&frame);

    let mut stream = MockStream::new(&input);
    let mut buf = [0u8; 512];
    block_on(handshake::perform(&mut stream, "led.example", 443, "/", NONCE, &mut buf)).unwrap();
    assert_eq!(stream.remaining(), frame.len());

    let mut frame_buf = [0u8; WEBSOCKET_BUFFER_SIZE];
    match block_on(recv_frame(&mut stream, &mut frame_buf)).unwrap() {
        Received::Frame {
            frame_type: FrameType::Text(false),
            payload,
        } => assert_eq!(
            codec::decode(payload),
            Ok(InboundMessage::RemoteChangeState(LedState::Blue))
        ),
        _ => panic!("expected text frame"),
    }
}

#[test]
fn test_handshake_rejected_status() {
    let mut stream = MockStream::new(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    let mut buf = [0u8; 512];

    let result = block_on(handshake::perform(&mut stream, "led.example", 443, "/", NONCE, &mut buf));
    assert_eq!(result, Err(HandshakeError::Rejected(404)));
}

#[test]
fn test_handshake_connection_closed() {
    let mut stream = MockStream::new(b"HTTP/1.1 101 Switching");
    let mut buf = [0u8; 512];

    let result = block_on(handshake::perform(&mut stream, "led.example", 443, "/", NONCE, &mut buf));
    assert_eq!(result, Err(HandshakeError::ConnectionClosed));
}

#[test]
fn test_handshake_response_too_large() {
    let mut stream = MockStream::new(SWITCHING_PROTOCOLS);
    let mut buf = [0u8; 32];

    let result = block_on(handshake::perform(&mut stream, "led.example", 443, "/", NONCE, &mut buf));
    assert_eq!(result, Err(HandshakeError::ResponseTooLarge));
}

// ============================================================================
// Tests: Frame-Empfang
// ============================================================================

#[test]
fn test_oversized_text_frame_keeps_session() {
    // 600 Bytes passen nicht in den 512 Byte Frame-Buffer
    let mut input = server_frame(0x1, &[b'x'; 600]);
    input.extend(server_frame(
        0x1,
        br#"{"type":"remote_change_state","state":"red"}"#,
    ));

    let mut stream = MockStream::new(&input);
    let mut frame_buf = [0u8; WEBSOCKET_BUFFER_SIZE];

    let first = block_on(recv_frame(&mut stream, &mut frame_buf)).unwrap();
    assert!(matches!(
        first,
        Received::Oversized {
            frame_type: FrameType::Text(false),
            len: 600
        }
    ));

    match block_on(recv_frame(&mut stream, &mut frame_buf)).unwrap() {
        Received::Frame { payload, .. } => assert_eq!(
            codec::decode(payload),
            Ok(InboundMessage::RemoteChangeState(LedState::Red))
        ),
        _ => panic!("expected text frame"),
    }
    assert_eq!(stream.remaining(), 0);
}

#[test]
fn test_frame_exactly_buffer_size() {
    let payload = [b'y'; WEBSOCKET_BUFFER_SIZE];
    let mut stream = MockStream::new(&server_frame(0x2, &payload));
    let mut frame_buf = [0u8; WEBSOCKET_BUFFER_SIZE];

    let received = block_on(recv_frame(&mut stream, &mut frame_buf)).unwrap();
    assert!(matches!(
        received,
        Received::Frame {
            frame_type: FrameType::Binary(false),
            payload
        } if payload.len() == WEBSOCKET_BUFFER_SIZE
    ));
}

#[test]
fn test_ping_payload_delivered() {
    let mut stream = MockStream::new(&server_frame(0x9, b"hb"));
    let mut frame_buf = [0u8; WEBSOCKET_BUFFER_SIZE];

    let received = block_on(recv_frame(&mut stream, &mut frame_buf)).unwrap();
    assert!(matches!(
        received,
        Received::Frame {
            frame_type: FrameType::Ping,
            payload: b"hb"
        }
    ));
}

#[test]
fn test_closed_stream_is_error() {
    let mut stream = MockStream::new(&[]);
    let mut frame_buf = [0u8; WEBSOCKET_BUFFER_SIZE];

    let result = block_on(recv_frame(&mut stream, &mut frame_buf));
    assert!(result.is_err());
}

#[test]
fn test_truncated_oversized_frame_is_closed() {
    let mut input = server_frame(0x1, &[b'x'; 600]);
    input.truncate(300);

    let mut stream = MockStream::new(&input);
    let mut frame_buf = [0u8; WEBSOCKET_BUFFER_SIZE];

    let result = block_on(recv_frame(&mut stream, &mut frame_buf));
    assert!(matches!(result, Err(RecvError::Closed)));
}
