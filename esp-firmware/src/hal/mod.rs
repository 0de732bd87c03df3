// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus esp-core bzw. rand_core für echte Hardware.
// Mocks für Tests liegen in esp-tests.

pub mod led_writer;
pub mod rng;

pub use led_writer::RmtLedWriter;
pub use rng::HardwareRng;
