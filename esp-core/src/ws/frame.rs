//! Empfang von WebSocket-Frames in einen festen Buffer
//!
//! Frames, deren Payload nicht in den Buffer passt, werden vom Stream
//! gelesen und verworfen. Die Verbindung bleibt dabei synchron und offen.

use edge_ws::FrameHeader;
use embedded_io_async::{Read, ReadExactError};

pub use edge_ws::FrameType;

/// Ergebnis von `recv_frame`
#[derive(Debug)]
pub enum Received<'a> {
    /// Kompletter Frame, Payload bereits demaskiert
    Frame {
        frame_type: FrameType,
        payload: &'a [u8],
    },
    /// Payload größer als der Buffer, vollständig übersprungen
    Oversized { frame_type: FrameType, len: u64 },
}

/// Fehler beim Frame-Empfang
///
/// Jeder Fehler bedeutet: Stream ist nicht mehr synchron, Verbindung beenden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecvError {
    /// Lesen vom Stream fehlgeschlagen
    Io,
    /// Stream endet mitten im Frame
    Closed,
    /// Ungültiger Frame-Header
    Protocol,
}

impl<E> From<edge_ws::Error<E>> for RecvError {
    fn from(err: edge_ws::Error<E>) -> Self {
        match err {
            edge_ws::Error::Io(_) => RecvError::Io,
            edge_ws::Error::Incomplete(_) => RecvError::Closed,
            _ => RecvError::Protocol,
        }
    }
}

impl<E> From<ReadExactError<E>> for RecvError {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => RecvError::Closed,
            ReadExactError::Other(_) => RecvError::Io,
        }
    }
}

/// Liest genau einen Frame
///
/// Passt die Payload nicht in `buf`, wird sie in `buf`-großen Stücken
/// gelesen und verworfen (`Received::Oversized`). `buf` darf nicht leer sein.
pub async fn recv_frame<'a, R: Read>(
    read: &mut R,
    buf: &'a mut [u8],
) -> Result<Received<'a>, RecvError> {
    let header = FrameHeader::recv(&mut *read).await?;

    if header.payload_len > buf.len() as u64 {
        discard(read, header.payload_len, buf).await?;
        return Ok(Received::Oversized {
            frame_type: header.frame_type,
            len: header.payload_len,
        });
    }

    header.recv_payload(&mut *read, buf).await?;
    let len = header.payload_len as usize;

    Ok(Received::Frame {
        frame_type: header.frame_type,
        payload: &buf[..len],
    })
}

async fn discard<R: Read>(read: &mut R, len: u64, scratch: &mut [u8]) -> Result<(), RecvError> {
    if scratch.is_empty() {
        return Err(RecvError::Protocol);
    }

    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(scratch.len() as u64) as usize;
        read.read_exact(&mut scratch[..chunk]).await?;
        remaining -= chunk as u64;
    }
    Ok(())
}
