// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von esp-core
pub use esp_core::{
    LedError, LedState, NotificationSink, SmartLedWriter, StateChangeMessage, SyncEngine,
};

use defmt::warn;

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use crate::config::{OUTBOUND_CAPACITY, SYNC_EVENT_CAPACITY, WEBSOCKET_BUFFER_SIZE};

// ============================================================================
// Events an den Sync-Task
// ============================================================================

/// Roh-Payload eines eingehenden Text-Frames
///
/// Dekodiert wird erst im Sync-Task, damit alle Mutationen an einer Stelle
/// passieren (Codec → Engine).
pub type InboundFrame = heapless::Vec<u8, WEBSOCKET_BUFFER_SIZE>;

/// Alles was den LED-Zustand ändern kann, läuft über diesen Typ
/// durch genau einen Channel in den Sync-Task.
pub enum SyncEvent {
    /// Text-Frame vom WebSocket-Peer
    Frame(InboundFrame),
    /// BOOT-Taster gedrückt: nächster Zustand im Zyklus
    LocalCycle,
}

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Sender<'static, NoopRawMutex, SyncEvent, 2>
// Nutze:  SyncEventSender

/// Channel für Events (WebSocket + Taster → Sync Task)
/// Single Consumer: serialisiert Kommandos und Auto-Off
pub type SyncEventChannel = Channel<NoopRawMutex, SyncEvent, SYNC_EVENT_CAPACITY>;

/// Sender für Events (WebSocket-Task, Taster-Task)
pub type SyncEventSender = Sender<'static, NoopRawMutex, SyncEvent, SYNC_EVENT_CAPACITY>;

/// Receiver für Events (nur der Sync-Task)
pub type SyncEventReceiver = Receiver<'static, NoopRawMutex, SyncEvent, SYNC_EVENT_CAPACITY>;

/// Channel für ausgehende Meldungen (Sync Task → WebSocket)
/// Der WebSocket-Task bekommt den ganzen Channel, um ihn beim Connect zu leeren
pub type OutboundChannel = Channel<NoopRawMutex, StateChangeMessage, OUTBOUND_CAPACITY>;

/// Sender für ausgehende Meldungen (Sync-Engine)
pub type OutboundSender = Sender<'static, NoopRawMutex, StateChangeMessage, OUTBOUND_CAPACITY>;

// ============================================================================
// NotificationSink für die Firmware
// ============================================================================

/// Leitet Meldungen der Sync-Engine an den WebSocket-Task weiter
///
/// Fire-and-forget: ist die Queue voll (z.B. Server nicht erreichbar),
/// wird die Meldung verworfen statt die Engine zu blockieren.
pub struct ChannelNotifier {
    sender: OutboundSender,
}

impl ChannelNotifier {
    pub fn new(sender: OutboundSender) -> Self {
        Self { sender }
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&mut self, msg: StateChangeMessage) {
        if self.sender.try_send(msg).is_err() {
            warn!("SYNC: Outbound queue full, dropping {}", msg);
        }
    }
}
