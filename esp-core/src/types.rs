//! Core Types für LED-Synchronisation
//!
//! Datenstrukturen ohne Hardware-Dependencies

use rgb::RGB8;
use serde::{Deserialize, Serialize};

/// Logischer Zustand der LED
///
/// Auf dem Draht als lowercase String: `"red"`, `"blue"`, `"off"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    Red,
    Blue,
    /// Startzustand nach dem Boot
    #[default]
    Off,
}

impl LedState {
    /// Alle gültigen Zustände (für Tests und Iteration)
    pub const ALL: [LedState; 3] = [LedState::Red, LedState::Blue, LedState::Off];

    /// Wire-Name des Zustands
    pub fn as_str(self) -> &'static str {
        match self {
            LedState::Red => "red",
            LedState::Blue => "blue",
            LedState::Off => "off",
        }
    }

    /// Pixel-Wert für den LED-Treiber
    ///
    /// # Beispiele
    ///
    /// ```
    /// # use rgb::RGB8;
    /// # use esp_core::LedState;
    /// assert_eq!(LedState::Red.color(10), RGB8 { r: 10, g: 0, b: 0 });
    /// assert_eq!(LedState::Off.color(10), RGB8 { r: 0, g: 0, b: 0 });
    /// ```
    pub fn color(self, brightness: u8) -> RGB8 {
        match self {
            LedState::Red => RGB8 {
                r: brightness,
                g: 0,
                b: 0,
            },
            LedState::Blue => RGB8 {
                r: 0,
                g: 0,
                b: brightness,
            },
            LedState::Off => RGB8::default(),
        }
    }

    /// Nächster Zustand im Zyklus: Aus → Rot → Blau → Aus
    ///
    /// Wird vom Taster für lokale Bedienung genutzt.
    pub fn next(self) -> Self {
        match self {
            LedState::Off => LedState::Red,
            LedState::Red => LedState::Blue,
            LedState::Blue => LedState::Off,
        }
    }
}

impl core::convert::TryFrom<&str> for LedState {
    type Error = ();

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            "off" => Ok(Self::Off),
            _ => Err(()),
        }
    }
}

impl core::fmt::Display for LedState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wer eine Zustandsänderung ausgelöst hat
///
/// Wird NICHT serialisiert. Auf dem Draht unterscheidet nur der
/// `type`-Diskriminator die Richtung.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Origin {
    /// Am Gerät ausgelöst (Taster, Auto-Off Timer)
    Local,
    /// Vom Peer über WebSocket angefordert
    Remote,
}

/// Ausgehende Benachrichtigung über einen neuen LED-Zustand
///
/// Wird bei jeder Mutation von der Sync-Engine erzeugt und
/// vom WebSocket-Task als `device_change_state` gesendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChangeMessage {
    pub origin: Origin,
    pub state: LedState,
}

impl StateChangeMessage {
    pub fn local(state: LedState) -> Self {
        Self {
            origin: Origin::Local,
            state,
        }
    }

    pub fn remote(state: LedState) -> Self {
        Self {
            origin: Origin::Remote,
            state,
        }
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for StateChangeMessage {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "StateChangeMessage {{ origin: {}, state: {} }}",
            self.origin,
            self.state.as_str()
        )
    }
}
