//! Gemeinsame Mocks für die Host-Tests

#![allow(dead_code)]

use core::convert::Infallible;

use embedded_io_async::{ErrorType, Read, Write};
use esp_core::{LedError, NotificationSink, SmartLedWriter, StateChangeMessage};
use rgb::RGB8;

// ============================================================================
// Mock LED Writer
// ============================================================================

#[derive(Default)]
pub struct MockLedWriter {
    pub last_color: Option<RGB8>,
    pub write_count: usize,
    pub fail_next_write: bool,
}

impl MockLedWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SmartLedWriter for MockLedWriter {
    fn write(&mut self, color: RGB8) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }

        self.last_color = Some(color);
        self.write_count += 1;
        Ok(())
    }
}

// ============================================================================
// Recording Notification Sink
// ============================================================================

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Vec<StateChangeMessage>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, msg: StateChangeMessage) {
        self.sent.push(msg);
    }
}

// ============================================================================
// Mock Stream (Server-Antwort rein, Client-Bytes raus)
// ============================================================================

/// In-Memory Verbindung: liefert vorbereitete Server-Bytes und zeichnet
/// alles auf, was der Client schreibt. Leerer Input = Verbindung zu.
#[derive(Default)]
pub struct MockStream {
    input: Vec<u8>,
    pos: usize,
    pub written: Vec<u8>,
}

impl MockStream {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.to_vec(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }
}

impl ErrorType for MockStream {
    type Error = Infallible;
}

impl Read for MockStream {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockStream {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Unmaskierter Server-Frame (FIN gesetzt) mit 7- oder 16-Bit Länge
pub fn server_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x80 | opcode];
    if payload.len() < 126 {
        frame.push(payload.len() as u8);
    } else {
        frame.push(126);
        frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    }
    frame.extend_from_slice(payload);
    frame
}
