//! Auto-Off Timer
//!
//! Einmaliger Deadline-Timer, kein genereller Scheduler.
//! Der Timer selbst wartet nicht: der Besitzer fragt per `poll()` ab
//! bzw. wartet im Task auf `deadline()`.

use embassy_time::{Duration, Instant};

/// Single-Shot Deadline
///
/// - `arm()` startet den Countdown neu (kein Aufaddieren)
/// - `poll()` liefert genau einmal pro `arm()` `true`
/// - `cancel()` entschärft ohne auszulösen
#[derive(Debug, Clone, Copy)]
pub struct AutoOffTimer {
    timeout: Duration,
    fires_at: Option<Instant>,
}

impl AutoOffTimer {
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            fires_at: None,
        }
    }

    /// (Re-)startet den Countdown ab `now`
    pub fn arm(&mut self, now: Instant) {
        self.fires_at = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.fires_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.fires_at.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Zeitpunkt des nächsten Auslösens (None = nicht scharf)
    pub fn deadline(&self) -> Option<Instant> {
        self.fires_at
    }

    /// Prüft ob die Deadline erreicht ist
    ///
    /// Gibt `true` zurück und entschärft den Timer, wenn `now >= deadline`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.fires_at {
            Some(deadline) if now >= deadline => {
                self.fires_at = None;
                true
            }
            _ => false,
        }
    }
}
