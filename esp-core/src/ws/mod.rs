//! WebSocket Client-Protokoll
//!
//! Transport-unabhängig: alles läuft über `embedded-io-async` Streams,
//! die Firmware reicht TCP- oder TLS-Verbindungen durch.

pub mod frame;
pub mod handshake;

pub use frame::{Received, RecvError, recv_frame};
pub use handshake::HandshakeError;
