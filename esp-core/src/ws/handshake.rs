//! WebSocket Opening Handshake (RFC 6455, Abschnitt 4)
//!
//! Client-Seite: HTTP/1.1 Upgrade-Request senden, 101-Antwort lesen und
//! Sec-WebSocket-Accept gegen den eigenen Key prüfen.
//! Läuft über jeden `embedded-io-async` Stream (TCP oder TLS).

use core::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use embedded_io_async::{Read, Write};
use heapless::String;
use sha1::{Digest, Sha1};

/// Magic GUID aus RFC 6455
const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Base64 von 16 Byte Nonce
pub const SEC_KEY_LEN: usize = 24;

/// Base64 von 20 Byte SHA-1
pub const SEC_ACCEPT_LEN: usize = 28;

/// Maximale Länge des Upgrade-Requests
pub const REQUEST_LEN: usize = 256;

pub type SecKey = String<SEC_KEY_LEN>;
pub type SecAccept = String<SEC_ACCEPT_LEN>;

/// Handshake-Fehler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeError {
    /// Request passt nicht in den Buffer (Host/Pfad zu lang)
    RequestTooLong,
    /// Lesen/Schreiben auf dem Socket fehlgeschlagen
    Io,
    /// Server hat die Verbindung während des Handshakes geschlossen
    ConnectionClosed,
    /// Antwort-Header größer als der Buffer
    ResponseTooLarge,
    /// Antwort ist kein gültiges HTTP
    InvalidResponse,
    /// Statuscode ist nicht 101
    Rejected(u16),
    /// Sec-WebSocket-Accept fehlt oder passt nicht
    AcceptMismatch,
}

/// Erzeugt den Sec-WebSocket-Key aus 16 Zufallsbytes
pub fn sec_key(nonce: &[u8; 16]) -> SecKey {
    let mut out = [0u8; SEC_KEY_LEN];
    let mut key = SecKey::new();
    if let Ok(n) = STANDARD.encode_slice(nonce, &mut out) {
        // Base64 ist immer ASCII
        for &byte in &out[..n] {
            let _ = key.push(byte as char);
        }
    }
    key
}

/// Erwarteter Sec-WebSocket-Accept für einen Key
pub fn sec_accept(key: &str) -> SecAccept {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    let digest = hasher.finalize();

    let mut out = [0u8; SEC_ACCEPT_LEN];
    let mut accept = SecAccept::new();
    if let Ok(n) = STANDARD.encode_slice(digest, &mut out) {
        for &byte in &out[..n] {
            let _ = accept.push(byte as char);
        }
    }
    accept
}

/// Baut den HTTP Upgrade-Request
pub fn upgrade_request(
    host: &str,
    port: u16,
    path: &str,
    key: &str,
) -> Result<String<REQUEST_LEN>, HandshakeError> {
    let mut request = String::<REQUEST_LEN>::new();
    write!(
        request,
        "GET {path} HTTP/1.1\r\n\
         Host: {host}:{port}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {key}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n"
    )
    .map_err(|_| HandshakeError::RequestTooLong)?;
    Ok(request)
}

/// Prüft die Antwort-Header des Servers
///
/// `raw` muss die kompletten Header inkl. abschließendem `\r\n\r\n` enthalten.
pub fn validate_response(raw: &[u8], key: &str) -> Result<(), HandshakeError> {
    let mut headers = [httparse::EMPTY_HEADER; 16];
    let mut response = httparse::Response::new(&mut headers);

    match response.parse(raw) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) | Err(_) => return Err(HandshakeError::InvalidResponse),
    }

    match response.code {
        Some(101) => {}
        Some(code) => return Err(HandshakeError::Rejected(code)),
        None => return Err(HandshakeError::InvalidResponse),
    }

    let expected = sec_accept(key);
    let accepted = response.headers.iter().any(|header| {
        header.name.eq_ignore_ascii_case("sec-websocket-accept")
            && header.value.trim_ascii() == expected.as_bytes()
    });

    if accepted {
        Ok(())
    } else {
        Err(HandshakeError::AcceptMismatch)
    }
}

/// Führt den kompletten Handshake auf einer offenen TCP-Verbindung aus
///
/// Die Antwort wird byteweise gelesen, damit kein Byte eines direkt
/// folgenden WebSocket-Frames im Header-Buffer landet.
pub async fn perform<S: Read + Write>(
    socket: &mut S,
    host: &str,
    port: u16,
    path: &str,
    nonce: &[u8; 16],
    buf: &mut [u8],
) -> Result<(), HandshakeError> {
    let key = sec_key(nonce);
    let request = upgrade_request(host, port, path, &key)?;

    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|_| HandshakeError::Io)?;
    socket.flush().await.map_err(|_| HandshakeError::Io)?;

    let mut len = 0;
    loop {
        if len == buf.len() {
            return Err(HandshakeError::ResponseTooLarge);
        }

        let n = socket
            .read(&mut buf[len..len + 1])
            .await
            .map_err(|_| HandshakeError::Io)?;
        if n == 0 {
            return Err(HandshakeError::ConnectionClosed);
        }
        len += n;

        if buf[..len].ends_with(b"\r\n\r\n") {
            break;
        }
    }

    validate_response(&buf[..len], &key)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Beispiel aus RFC 6455, Abschnitt 1.3
    const RFC_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";
    const RFC_ACCEPT: &str = "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=";

    #[test]
    fn test_sec_key_from_rfc_nonce() {
        assert_eq!(sec_key(b"the sample nonce").as_str(), RFC_KEY);
    }

    #[test]
    fn test_sec_accept_rfc_example() {
        assert_eq!(sec_accept(RFC_KEY).as_str(), RFC_ACCEPT);
    }

    #[test]
    fn test_validate_switching_protocols() {
        let raw = b"HTTP/1.1 101 Switching Protocols\r\n\
                    Upgrade: websocket\r\n\
                    Connection: Upgrade\r\n\
                    Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\r\n";
        assert_eq!(validate_response(raw, RFC_KEY), Ok(()));
    }

    #[test]
    fn test_validate_rejected() {
        let raw = b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n";
        assert_eq!(
            validate_response(raw, RFC_KEY),
            Err(HandshakeError::Rejected(403))
        );
    }

    #[test]
    fn test_validate_wrong_accept() {
        let raw = b"HTTP/1.1 101 Switching Protocols\r\n\
                    Sec-WebSocket-Accept: AAAAAAAAAAAAAAAAAAAAAAAAAAA=\r\n\r\n";
        assert_eq!(
            validate_response(raw, RFC_KEY),
            Err(HandshakeError::AcceptMismatch)
        );
    }

    #[test]
    fn test_upgrade_request_lines() {
        let request = upgrade_request("led.example", 443, "/ws", RFC_KEY).unwrap();
        assert!(request.starts_with("GET /ws HTTP/1.1\r\n"));
        assert!(request.contains("Host: led.example:443\r\n"));
        assert!(request.contains("Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_upgrade_request_too_long() {
        let path = "/aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        assert_eq!(
            upgrade_request("led.example", 80, path, RFC_KEY),
            Err(HandshakeError::RequestTooLong)
        );
    }

    #[test]
    fn test_validate_accept_header_case_insensitive() {
        let raw = b"HTTP/1.1 101 Switching Protocols\r\n\
                    sec-websocket-accept:   s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\r\n";
        assert_eq!(validate_response(raw, RFC_KEY), Ok(()));
    }
}
