// Sync Task - Besitzt die Sync-Engine und steuert die RGB LED
use defmt::{error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use esp_core::{InboundOutcome, SmartLedWriter, SyncEngine};
use esp_hal_smartled::smart_led_buffer;

use crate::config::{AUTO_OFF_SECS, LED_BRIGHTNESS, LED_GPIO_PIN, RMT_CLOCK_MHZ};
use crate::hal::RmtLedWriter;
use crate::{ChannelNotifier, OutboundSender, SyncEvent, SyncEventReceiver};

/// Sync Logic - Testbare Business Logic ohne Hardware-Abhängigkeit
///
/// Einziger Besitzer von LED-Zustand und Auto-Off Timer:
/// - Empfängt Frames vom WebSocket und Taster-Events über einen Channel
/// - Wartet gleichzeitig auf das Auto-Off Deadline
/// - Alles läuft nacheinander in diesem Task, daher kein Mutex nötig.
///   Was später verarbeitet wird, ist die letzte Mutation und die letzte Meldung.
///
/// # Parameter
/// - `led`: LED Writer (Hardware oder Mock)
/// - `outbound`: Sender für Meldungen an den WebSocket-Task
/// - `events`: Receiver für Frames und Taster-Events
pub async fn sync_logic<L: SmartLedWriter>(
    led: L,
    outbound: OutboundSender,
    events: SyncEventReceiver,
) -> ! {
    let mut engine = SyncEngine::new(
        led,
        ChannelNotifier::new(outbound),
        LED_BRIGHTNESS,
        Duration::from_secs(AUTO_OFF_SECS),
    );
    info!("SYNC: Engine ready, LED off");

    loop {
        // Ohne scharfen Timer nur auf Events warten
        let event = match engine.auto_off_deadline() {
            Some(deadline) => match select(events.receive(), Timer::at(deadline)).await {
                Either::First(event) => Some(event),
                Either::Second(()) => None,
            },
            None => Some(events.receive().await),
        };

        match event {
            Some(SyncEvent::Frame(frame)) => match engine.handle_inbound(&frame, Instant::now()) {
                Ok(InboundOutcome::Applied { state, render }) => {
                    info!("SYNC: Remote command applied: {}", state);
                    if render.is_err() {
                        error!("Failed to write to LED");
                    }
                }
                Ok(InboundOutcome::IgnoredEcho(state)) => {
                    info!("SYNC: Ignoring own device_change_state ({}) from peer", state);
                }
                Err(e) => {
                    warn!("SYNC: Dropping inbound message: {}", e);
                }
            },
            Some(SyncEvent::LocalCycle) => {
                let next = engine.state().next();
                info!("SYNC: Local command: {}", next);
                if engine.apply_local_command(next, Instant::now()).is_err() {
                    error!("Failed to write to LED");
                }
            }
            None => {
                if let Some(render) = engine.poll_auto_off(Instant::now()) {
                    info!("SYNC: Auto-off after {}s", AUTO_OFF_SECS);
                    if render.is_err() {
                        error!("Failed to write to LED");
                    }
                }
            }
        }
    }
}

/// Sync Task - Embassy Task für parallele Ausführung
///
/// Übernimmt die Hardware-Initialisierung und ruft dann `sync_logic()` auf.
///
/// # Parameter
/// - `gpio8`: GPIO8 Peripheral für LED-Datenleitung
/// - `rmt_peripheral`: RMT Peripheral für präzises Timing
/// - `outbound`: Sender für Meldungen an den WebSocket-Task
/// - `events`: Receiver für Frames und Taster-Events
#[embassy_executor::task]
pub async fn sync_task(
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    outbound: OutboundSender,
    events: SyncEventReceiver,
) {
    // Buffer für SmartLED Daten erstellen (1 LED)
    // Macro allokiert Speicher im richtigen Format für RMT
    let mut rmt_buffer = smart_led_buffer!(1);

    let led = RmtLedWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer);
    info!("SYNC: LED on GPIO{}, auto-off after {}s", LED_GPIO_PIN, AUTO_OFF_SECS);

    sync_logic(led, outbound, events).await
}
