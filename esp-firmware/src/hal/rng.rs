// Hardware-Zufallszahlen als rand_core Quelle
//
// Für TLS-Handshake, Sec-WebSocket-Key und Frame-Masken.

use esp_hal::rng::Rng;
use rand_core::{CryptoRng, RngCore};

/// Wrapper um den esp-hal RNG
///
/// Bei laufendem WiFi wird der RNG vom Funk-Rauschen gespeist und liefert
/// echte Zufallszahlen (Voraussetzung für `CryptoRng`).
pub struct HardwareRng {
    rng: Rng,
}

impl HardwareRng {
    pub fn new() -> Self {
        Self { rng: Rng::new() }
    }
}

impl Default for HardwareRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for HardwareRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.random()
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.rng.random()) << 32) | u64::from(self.rng.random())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.rng.random().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for HardwareRng {}
