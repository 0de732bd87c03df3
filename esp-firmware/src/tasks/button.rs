// Button Task - Lokale Bedienung über den BOOT-Taster
use defmt::info;
use embassy_time::{Duration, Timer};
use esp_hal::gpio::{Input, InputConfig, Pull};

use crate::config::{BUTTON_DEBOUNCE_MS, BUTTON_GPIO_PIN};
use crate::{SyncEvent, SyncEventSender};

/// Button Task
///
/// Jeder Druck auf den BOOT-Taster (GPIO9, active low) schaltet die LED
/// einen Schritt weiter: Aus → Rot → Blau → Aus. Den Zustand kennt nur
/// der Sync-Task, hier wird nur das Event gesendet.
///
/// # Parameter
/// - `gpio9`: GPIO9 Peripheral (BOOT-Taster)
/// - `events`: Sender für Events an den Sync-Task
#[embassy_executor::task]
pub async fn button_task(gpio9: esp_hal::peripherals::GPIO9<'static>, events: SyncEventSender) {
    let mut button = Input::new(gpio9, InputConfig::default().with_pull(Pull::Up));
    info!("BUTTON: Task started (GPIO{})", BUTTON_GPIO_PIN);

    loop {
        button.wait_for_falling_edge().await;

        // Entprellen: nach der Wartezeit muss der Taster noch gedrückt sein
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if button.is_high() {
            continue;
        }

        info!("BUTTON: Pressed");
        events.send(SyncEvent::LocalCycle).await;

        button.wait_for_high().await;
    }
}
