//! Hardware Abstraction Traits
//!
//! Diese Traits definieren die Schnittstellen der Sync-Engine nach außen
//! (LED-Treiber, ausgehende Meldungen) ohne konkrete Implementierung.

use rgb::RGB8;

use crate::types::StateChangeMessage;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Abstrahiert den Zugriff auf RGB LEDs (WS2812/Neopixel).
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockLedWriter (in-memory Mock)
pub trait SmartLedWriter {
    /// Schreibt eine RGB-Farbe auf die LED
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: RGB8) -> Result<(), LedError>;
}

/// Senke für ausgehende Zustandsmeldungen
///
/// Fire-and-forget: kein Rückgabewert, keine Wiederholung.
///
/// # Implementierungen
/// - **Production:** ChannelNotifier (Embassy Channel → WebSocket-Task)
/// - **Testing:** RecordingSink (sammelt Meldungen in einem Vec)
pub trait NotificationSink {
    fn notify(&mut self, msg: StateChangeMessage);
}
