//! Integration Tests für LED-Zustand und LED-Treiber-Mock
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockLedWriter

mod common;

use common::MockLedWriter;
use esp_core::{LedError, LedState, SmartLedWriter};
use rgb::RGB8;

// ============================================================================
// Tests: MockLedWriter
// ============================================================================

#[test]
fn test_mock_led_writer_write() {
    let mut mock = MockLedWriter::new();
    let color = RGB8 { r: 10, g: 0, b: 0 };

    assert_eq!(mock.write_count, 0);
    assert_eq!(mock.last_color, None);

    mock.write(color).unwrap();

    assert_eq!(mock.write_count, 1);
    assert_eq!(mock.last_color, Some(color));
}

#[test]
fn test_mock_led_writer_fail() {
    let mut mock = MockLedWriter::new();
    mock.fail_next_write = true;

    let result = mock.write(RGB8 { r: 10, g: 0, b: 0 });
    assert_eq!(result, Err(LedError::WriteFailed));
    assert_eq!(mock.write_count, 0);
    assert_eq!(mock.last_color, None);
}

#[test]
fn test_mock_led_writer_recovers_after_fail() {
    let mut mock = MockLedWriter::new();
    mock.fail_next_write = true;

    // First write fails
    assert!(mock.write(RGB8 { r: 10, g: 0, b: 0 }).is_err());

    // Second write succeeds
    assert!(mock.write(RGB8 { r: 0, g: 0, b: 10 }).is_ok());
    assert_eq!(mock.write_count, 1);
    assert_eq!(mock.last_color, Some(RGB8 { r: 0, g: 0, b: 10 }));
}

// ============================================================================
// Tests: LedState → Pixel
// ============================================================================

#[test]
fn test_led_state_colors() {
    assert_eq!(LedState::Red.color(10), RGB8 { r: 10, g: 0, b: 0 });
    assert_eq!(LedState::Blue.color(10), RGB8 { r: 0, g: 0, b: 10 });
    assert_eq!(LedState::Off.color(10), RGB8 { r: 0, g: 0, b: 0 });
}

#[test]
fn test_led_state_off_ignores_brightness() {
    assert_eq!(LedState::Off.color(255), RGB8::default());
}

#[test]
fn test_led_state_wire_names() {
    assert_eq!(LedState::Red.as_str(), "red");
    assert_eq!(LedState::Blue.as_str(), "blue");
    assert_eq!(LedState::Off.as_str(), "off");
}

#[test]
fn test_led_state_try_from_invalid() {
    assert!(LedState::try_from("green").is_err());
    assert!(LedState::try_from("").is_err());
}

#[test]
fn test_led_state_next_cycle_returns_to_off() {
    let mut state = LedState::Off;
    for _ in 0..3 {
        state = state.next();
    }
    assert_eq!(state, LedState::Off);
}
