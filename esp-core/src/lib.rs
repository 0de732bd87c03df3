//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Typen, den JSON-Codec, den Auto-Off Timer, die
//! Sync-Engine, die den LED-Zustand mit dem WebSocket-Peer abgleicht,
//! und das WebSocket Client-Protokoll (Handshake, Frame-Empfang).

#![no_std]

pub mod codec;
pub mod sync;
pub mod timer;
pub mod traits;
pub mod types;
pub mod ws;

// Re-exports für einfachen Zugriff
pub use codec::{DecodeError, EncodeError, InboundMessage, MessageType};
pub use sync::{InboundOutcome, SyncEngine};
pub use timer::AutoOffTimer;
pub use traits::{LedError, NotificationSink, SmartLedWriter};
pub use types::{LedState, Origin, StateChangeMessage};
