//! State Sync Engine
//!
//! Besitzt den LED-Zustand und den Auto-Off Timer. Alle Mutationen laufen
//! hier durch, jede Mutation erzeugt genau eine ausgehende Meldung.
//!
//! Die Engine ist synchron und kennt keine Uhr: der Aufrufer übergibt `now`.
//! In der Firmware gehört sie genau einem Task, der eingehende Frames,
//! Taster-Events und das Auto-Off-Deadline nacheinander abarbeitet.

use embassy_time::{Duration, Instant};

use crate::codec::{self, DecodeError, InboundMessage};
use crate::timer::AutoOffTimer;
use crate::traits::{LedError, NotificationSink, SmartLedWriter};
use crate::types::{LedState, Origin, StateChangeMessage};

/// Ergebnis von `SyncEngine::handle_inbound`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InboundOutcome {
    /// Kommando angewendet; `render` ist das Ergebnis des LED-Schreibens
    Applied {
        state: LedState,
        render: Result<(), LedError>,
    },
    /// Eigene Meldung vom Peer zurückgespiegelt, keine Reaktion
    IgnoredEcho(LedState),
}

/// Sync-Engine
///
/// # Trait-basierte Abstraktion
/// - `L: SmartLedWriter`: RmtLedWriter (Hardware) oder MockLedWriter (Tests)
/// - `N: NotificationSink`: Channel zum WebSocket-Task oder RecordingSink (Tests)
pub struct SyncEngine<L: SmartLedWriter, N: NotificationSink> {
    led: L,
    sink: N,
    brightness: u8,
    state: LedState,
    auto_off: AutoOffTimer,
}

impl<L: SmartLedWriter, N: NotificationSink> SyncEngine<L, N> {
    /// Erstellt die Engine im Zustand `Off`
    ///
    /// Schaltet die LED einmal aus (definierter Zustand nach dem Boot),
    /// sendet dabei aber keine Meldung.
    pub fn new(mut led: L, sink: N, brightness: u8, auto_off: Duration) -> Self {
        let state = LedState::Off;
        // Fehler beim initialen Ausschalten ist unkritisch: nächstes Kommando rendert neu
        let _ = led.write(state.color(brightness));

        Self {
            led,
            sink,
            brightness,
            state,
            auto_off: AutoOffTimer::new(auto_off),
        }
    }

    /// Aktueller logischer Zustand
    pub fn state(&self) -> LedState {
        self.state
    }

    /// Nächstes Auto-Off (None = Timer nicht scharf)
    pub fn auto_off_deadline(&self) -> Option<Instant> {
        self.auto_off.deadline()
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn led_mut(&mut self) -> &mut L {
        &mut self.led
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    /// Kommando vom Peer (`remote_change_state`)
    ///
    /// Setzt Zustand, rendert, startet Auto-Off neu und meldet den Zustand
    /// zurück. Nicht flankengesteuert: auch ohne Änderung wird gemeldet.
    ///
    /// Gibt das Ergebnis des LED-Schreibens zurück. Zustand, Timer und
    /// Meldung sind in jedem Fall aktualisiert.
    pub fn apply_remote_command(&mut self, state: LedState, now: Instant) -> Result<(), LedError> {
        self.apply(state, Origin::Remote, now)
    }

    /// Lokale Änderung am Gerät (Taster)
    ///
    /// Gleiche Behandlung wie `apply_remote_command`. Auf dem Draht ist die
    /// Meldung nicht unterscheidbar (beide `device_change_state`).
    pub fn apply_local_command(&mut self, state: LedState, now: Instant) -> Result<(), LedError> {
        self.apply(state, Origin::Local, now)
    }

    /// Auto-Off ausgelöst: LED aus, genau eine Meldung, kein Re-Arm
    pub fn on_auto_off_fire(&mut self) -> Result<(), LedError> {
        self.auto_off.cancel();
        self.state = LedState::Off;
        let render = self.render();
        self.sink.notify(StateChangeMessage::local(LedState::Off));
        render
    }

    /// Prüft den Auto-Off Timer und löst ggf. aus
    ///
    /// Gibt `Some(render-Ergebnis)` zurück wenn ausgelöst wurde.
    pub fn poll_auto_off(&mut self, now: Instant) -> Option<Result<(), LedError>> {
        if self.auto_off.poll(now) {
            Some(self.on_auto_off_fire())
        } else {
            None
        }
    }

    /// Bricht ein anstehendes Auto-Off ab
    pub fn cancel_auto_off(&mut self) {
        self.auto_off.cancel();
    }

    /// Eingehender Frame: dekodieren und anwenden
    ///
    /// Bei `Err` wurde nichts verändert und nichts gesendet.
    pub fn handle_inbound(
        &mut self,
        payload: &[u8],
        now: Instant,
    ) -> Result<InboundOutcome, DecodeError> {
        match codec::decode(payload)? {
            InboundMessage::RemoteChangeState(state) => {
                let render = self.apply_remote_command(state, now);
                Ok(InboundOutcome::Applied { state, render })
            }
            InboundMessage::DeviceChangeState(state) => Ok(InboundOutcome::IgnoredEcho(state)),
        }
    }

    fn apply(&mut self, state: LedState, origin: Origin, now: Instant) -> Result<(), LedError> {
        self.state = state;
        let render = self.render();
        self.auto_off.arm(now);
        self.sink.notify(StateChangeMessage { origin, state });
        render
    }

    fn render(&mut self) -> Result<(), LedError> {
        self.led.write(self.state.color(self.brightness))
    }
}
