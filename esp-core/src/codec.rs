//! JSON Message Codec
//!
//! Flaches JSON-Objekt mit zwei Feldern:
//!
//! ```text
//! { "type": "remote_change_state" | "device_change_state", "state": "red" | "blue" | "off" }
//! ```
//!
//! `remote_change_state` kommt vom Peer, `device_change_state` sendet das Gerät.
//! Der Diskriminator verhindert Echo-Schleifen: eine Geräte-Meldung wird
//! nie wieder als Kommando interpretiert.

use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::types::{LedState, StateChangeMessage};

/// Nachrichten-Diskriminator (`type`-Feld)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Peer → Gerät: Kommando
    RemoteChangeState,
    /// Gerät → Peer: Bestätigung bzw. Zustandsmeldung
    DeviceChangeState,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::RemoteChangeState => "remote_change_state",
            MessageType::DeviceChangeState => "device_change_state",
        }
    }
}

impl core::convert::TryFrom<&str> for MessageType {
    type Error = ();

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "remote_change_state" => Ok(Self::RemoteChangeState),
            "device_change_state" => Ok(Self::DeviceChangeState),
            _ => Err(()),
        }
    }
}

/// Dekodierte eingehende Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InboundMessage {
    /// Kommando vom Peer, wird angewendet
    RemoteChangeState(LedState),
    /// Eigene Meldung, vom Peer zurückgespiegelt (wird ignoriert)
    DeviceChangeState(LedState),
}

/// Fehler beim Dekodieren einer eingehenden Nachricht
///
/// Alle Varianten sind nicht-fatal: Nachricht verwerfen, loggen, weiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Kein gültiges JSON-Objekt
    MalformedJson,
    /// `type` fehlt oder ist unbekannt
    UnknownType,
    /// `state` fehlt oder ist `null`
    MissingState,
    /// `state` ist keiner von `red`, `blue`, `off`
    UnknownState,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::MalformedJson => f.write_str("malformed JSON"),
            DecodeError::UnknownType => f.write_str("missing or unknown message type"),
            DecodeError::MissingState => f.write_str("missing state"),
            DecodeError::UnknownState => f.write_str("unknown state value"),
        }
    }
}

/// Fehler beim Serialisieren
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    BufferTooSmall,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("buffer too small")
    }
}

/// Scratch-Buffer für Strings mit Escape-Sequenzen (`\u005f`, `\/`, ...)
///
/// Längster gültiger Wert ist `remote_change_state` (19 Zeichen).
const UNESCAPE_BUFFER_SIZE: usize = 32;

/// Roh-Form beim Parsen: beide Felder optional, damit fehlende Felder
/// von kaputtem JSON unterschieden werden können.
#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type", default)]
    msg_type: Option<Known<MessageType>>,
    #[serde(default)]
    state: Option<Known<LedState>>,
}

/// String-Feld mit festem Wertebereich: `None` für einen unbekannten Wert
struct Known<T>(Option<T>);

impl<'de, T> Deserialize<'de> for Known<T>
where
    T: for<'a> TryFrom<&'a str>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NameVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for NameVisitor<T>
        where
            T: for<'a> TryFrom<&'a str>,
        {
            type Value = Known<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Known(T::try_from(value).ok()))
            }
        }

        deserializer.deserialize_str(NameVisitor(PhantomData))
    }
}

#[derive(Serialize)]
struct WireMessage {
    #[serde(rename = "type")]
    msg_type: MessageType,
    state: LedState,
}

/// Dekodiert eine eingehende Nachricht
///
/// Unbekannte zusätzliche Felder werden ignoriert, Escape-Sequenzen in
/// Strings werden aufgelöst.
///
/// # Fehler
/// - `MalformedJson`: Parse-Fehler, auch wenn `type` oder `state` kein
///   String ist (z.B. `"type":5`) oder ein String mit Escapes länger als
///   der Scratch-Buffer ist
/// - `UnknownType`: `type` fehlt oder ist unbekannt
/// - `MissingState`: `state` fehlt oder ist `null`
/// - `UnknownState`: `state` hat einen unbekannten Wert
pub fn decode(bytes: &[u8]) -> Result<InboundMessage, DecodeError> {
    let mut scratch = [0u8; UNESCAPE_BUFFER_SIZE];
    let (raw, _) = serde_json_core::from_slice_escaped::<RawMessage>(bytes, &mut scratch)
        .map_err(|_| DecodeError::MalformedJson)?;

    let msg_type = raw
        .msg_type
        .and_then(|Known(msg_type)| msg_type)
        .ok_or(DecodeError::UnknownType)?;

    let state = match raw.state {
        None => return Err(DecodeError::MissingState),
        Some(Known(None)) => return Err(DecodeError::UnknownState),
        Some(Known(Some(state))) => state,
    };

    Ok(match msg_type {
        MessageType::RemoteChangeState => InboundMessage::RemoteChangeState(state),
        MessageType::DeviceChangeState => InboundMessage::DeviceChangeState(state),
    })
}

/// Serialisiert eine Nachricht mit beliebigem Diskriminator
///
/// Gibt die Anzahl geschriebener Bytes zurück.
pub fn encode_message(
    msg_type: MessageType,
    state: LedState,
    buf: &mut [u8],
) -> Result<usize, EncodeError> {
    serde_json_core::to_slice(&WireMessage { msg_type, state }, buf)
        .map_err(|_| EncodeError::BufferTooSmall)
}

/// Serialisiert eine ausgehende Geräte-Meldung
///
/// Ausgehend ist der Diskriminator immer `device_change_state`,
/// egal ob die Änderung lokal oder vom Peer ausgelöst wurde.
///
/// ```
/// # use esp_core::{LedState, StateChangeMessage, codec};
/// let mut buf = [0u8; 64];
/// let n = codec::encode(&StateChangeMessage::remote(LedState::Blue), &mut buf).unwrap();
/// assert_eq!(&buf[..n], br#"{"type":"device_change_state","state":"blue"}"#);
/// ```
pub fn encode(notification: &StateChangeMessage, buf: &mut [u8]) -> Result<usize, EncodeError> {
    encode_message(MessageType::DeviceChangeState, notification.state, buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_remote_red() {
        let msg = decode(br#"{"type":"remote_change_state","state":"red"}"#);
        assert_eq!(msg, Ok(InboundMessage::RemoteChangeState(LedState::Red)));
    }

    #[test]
    fn test_decode_field_order_and_whitespace() {
        let msg = decode(br#" { "state" : "off" , "type" : "remote_change_state" } "#);
        assert_eq!(msg, Ok(InboundMessage::RemoteChangeState(LedState::Off)));
    }

    #[test]
    fn test_decode_device_echo() {
        let msg = decode(br#"{"type":"device_change_state","state":"blue"}"#);
        assert_eq!(msg, Ok(InboundMessage::DeviceChangeState(LedState::Blue)));
    }

    #[test]
    fn test_decode_unknown_type() {
        assert_eq!(decode(br#"{"type":"bogus"}"#), Err(DecodeError::UnknownType));
        // Referenz-Diskriminator des alten Peers wird nicht mehr akzeptiert
        assert_eq!(
            decode(br#"{"type":"tg_change_state","state":"red"}"#),
            Err(DecodeError::UnknownType)
        );
    }

    #[test]
    fn test_decode_missing_type() {
        assert_eq!(decode(br#"{"state":"red"}"#), Err(DecodeError::UnknownType));
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(decode(b"{not json"), Err(DecodeError::MalformedJson));
        assert_eq!(decode(b""), Err(DecodeError::MalformedJson));
    }

    #[test]
    fn test_decode_missing_or_null_state() {
        assert_eq!(
            decode(br#"{"type":"remote_change_state"}"#),
            Err(DecodeError::MissingState)
        );
        assert_eq!(
            decode(br#"{"type":"remote_change_state","state":null}"#),
            Err(DecodeError::MissingState)
        );
    }

    #[test]
    fn test_decode_unknown_state() {
        assert_eq!(
            decode(br#"{"type":"remote_change_state","state":"green"}"#),
            Err(DecodeError::UnknownState)
        );
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        assert_eq!(
            decode(br#"{"type":"remote_change_state","state":"red","seq":1}"#),
            Ok(InboundMessage::RemoteChangeState(LedState::Red))
        );
        assert_eq!(
            decode(
                br#"{"type":"remote_change_state","state":"red","seq":1,"meta":{"a":[1,{"b":null}]}}"#
            ),
            Ok(InboundMessage::RemoteChangeState(LedState::Red))
        );
    }

    #[test]
    fn test_decode_escaped_strings() {
        assert_eq!(
            decode(br#"{"type":"remote\u005fchange_state","state":"r\u0065d"}"#),
            Ok(InboundMessage::RemoteChangeState(LedState::Red))
        );
        // `\/` ist ein Slash, kein Unterstrich
        assert_eq!(
            decode(br#"{"type":"remote\/change_state","state":"red"}"#),
            Err(DecodeError::UnknownType)
        );
    }

    #[test]
    fn test_decode_non_string_fields_are_malformed() {
        assert_eq!(
            decode(br#"{"type":5,"state":"red"}"#),
            Err(DecodeError::MalformedJson)
        );
        assert_eq!(
            decode(br#"{"type":"remote_change_state","state":5}"#),
            Err(DecodeError::MalformedJson)
        );
    }

    #[test]
    fn test_encode_remote_command() {
        let mut buf = [0u8; 64];
        let n = encode_message(MessageType::RemoteChangeState, LedState::Red, &mut buf).unwrap();
        assert_eq!(&buf[..n], br#"{"type":"remote_change_state","state":"red"}"#);
    }

    #[test]
    fn test_encode_local_uses_device_discriminator() {
        let mut buf = [0u8; 64];
        let n = encode(&StateChangeMessage::local(LedState::Off), &mut buf).unwrap();
        assert_eq!(&buf[..n], br#"{"type":"device_change_state","state":"off"}"#);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 8];
        let result = encode(&StateChangeMessage::local(LedState::Red), &mut buf);
        assert_eq!(result, Err(EncodeError::BufferTooSmall));
    }
}
