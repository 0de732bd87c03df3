// WebSocket Task - Verbindung zum Peer (Kommandos rein, Zustandsmeldungen raus)
use core::cell::RefCell;

use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either3, select3};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};
use embedded_io_async::{ErrorType, Read, Write};
use embedded_tls::{Aes128GcmSha256, TlsConfig, TlsConnection, TlsContext, UnsecureProvider};
use esp_core::codec;
use esp_core::ws::frame::FrameType;
use esp_core::ws::handshake::{self, HandshakeError};
use esp_core::ws::{Received, RecvError, recv_frame};
use rand_core::RngCore;
use static_cell::ConstStaticCell;

use crate::config::*;
use crate::hal::HardwareRng;
use crate::tasks::wifi::wait_for_network;
use crate::{InboundFrame, OutboundChannel, SyncEvent, SyncEventSender};

/// TLS Record-Buffer, zu groß für den Task-Stack
static TLS_READ_BUFFER: ConstStaticCell<[u8; TLS_READ_BUFFER_SIZE]> =
    ConstStaticCell::new([0; TLS_READ_BUFFER_SIZE]);
static TLS_WRITE_BUFFER: ConstStaticCell<[u8; TLS_WRITE_BUFFER_SIZE]> =
    ConstStaticCell::new([0; TLS_WRITE_BUFFER_SIZE]);

/// WebSocket Task - läuft parallel zu anderen Tasks
///
/// Dieser Task ist der Transport-Adapter:
/// - Wartet auf Netzwerk-Verbindung
/// - Verbindet sich mit dem WebSocket-Server (wss:// oder ws://, siehe `WS_TLS`)
/// - Leitet Text-Frames als `SyncEvent::Frame` an den Sync-Task weiter
/// - Sendet Meldungen der Sync-Engine als `device_change_state`
/// - Ping alle `WS_PING_INTERVAL_SECS` bei Ruhe (erkennt tote Verbindungen)
/// - Reconnect alle `WS_RECONNECT_INTERVAL_SECS` solange keine Verbindung besteht
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `events`: Sender für eingehende Frames an den Sync-Task
/// - `outbound`: Channel mit ausgehenden Meldungen (wird beim Connect geleert)
#[embassy_executor::task]
pub async fn websocket_task(
    stack: &'static Stack<'static>,
    events: SyncEventSender,
    outbound: &'static OutboundChannel,
) {
    let tls_read = TLS_READ_BUFFER.take();
    let tls_write = TLS_WRITE_BUFFER.take();

    info!(
        "WS: Task started ({}://{}:{}{}), waiting for network...",
        scheme(),
        WS_HOST,
        WS_PORT,
        WS_PATH
    );

    loop {
        wait_for_network(stack).await;

        match ws_connect_and_run(stack, events, outbound, &mut tls_read[..], &mut tls_write[..])
            .await
        {
            Ok(()) => warn!("WS: Connection closed by server"),
            Err(e) => error!("WS: Error: {}", e),
        }
        info!("WS: Disconnected, reconnecting in {}s...", WS_RECONNECT_INTERVAL_SECS);
        Timer::after(Duration::from_secs(WS_RECONNECT_INTERVAL_SECS)).await;
    }
}

/// Verbindet mit dem WebSocket-Server und betreibt die Session
///
/// 1. DNS-Auflösung von `WS_HOST`
/// 2. TCP-Verbindung aufbauen
/// 3. TLS-Session öffnen (nur mit `WS_TLS`)
/// 4. HTTP Upgrade Handshake, dann Frames bis Close oder Fehler
///
/// Bei jedem Fehler wird die Funktion beendet und der Haupt-Loop
/// startet nach dem Reconnect-Intervall einen neuen Versuch.
async fn ws_connect_and_run(
    stack: &'static Stack<'static>,
    events: SyncEventSender,
    outbound: &'static OutboundChannel,
    tls_read: &mut [u8],
    tls_write: &mut [u8],
) -> Result<(), WsError> {
    info!("WS: Resolving '{}'...", WS_HOST);
    let server_ip = resolve_hostname(stack, WS_HOST).await?;
    info!("WS: Resolved to {}", Debug2Format(&server_ip));

    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(WS_TCP_TIMEOUT_SECS)));
    socket.set_keep_alive(Some(Duration::from_secs(WS_TCP_KEEPALIVE_SECS)));

    socket
        .connect((server_ip, WS_PORT))
        .await
        .map_err(|_| WsError::ConnectionFailed)?;
    info!("WS: TCP connected");

    let socket = RefCell::new(socket);
    let mut rng = HardwareRng::new();

    if WS_TLS {
        // Zertifikat wird nicht geprüft (kein CA-Store auf dem Gerät)
        let config = TlsConfig::new().with_server_name(WS_HOST);
        let mut tls: TlsConnection<'_, _, Aes128GcmSha256> =
            TlsConnection::new(SharedSocket::new(&socket), tls_read, tls_write);

        tls.open(TlsContext::new(
            &config,
            UnsecureProvider::new::<Aes128GcmSha256>(HardwareRng::new()),
        ))
        .await
        .map_err(|e| {
            error!("WS: TLS handshake failed: {}", Debug2Format(&e));
            WsError::Tls
        })?;
        info!("WS: TLS session established");

        run_session(&socket, &mut tls, &mut rng, events, outbound).await
    } else {
        let mut plain = SharedSocket::new(&socket);
        run_session(&socket, &mut plain, &mut rng, events, outbound).await
    }
}

/// WebSocket-Session auf einem offenen Stream (TCP oder TLS)
///
/// `socket` ist der darunterliegende TCP-Socket, nur für das Warten auf
/// eingehende Daten. Gelesen und geschrieben wird ausschließlich über `stream`.
async fn run_session<S: Read + Write>(
    socket: &RefCell<TcpSocket<'_>>,
    stream: &mut S,
    rng: &mut HardwareRng,
    events: SyncEventSender,
    outbound: &'static OutboundChannel,
) -> Result<(), WsError> {
    let mut nonce = [0u8; 16];
    rng.fill_bytes(&mut nonce);

    let mut handshake_buffer = [0u8; HANDSHAKE_BUFFER_SIZE];
    handshake::perform(
        stream,
        WS_HOST,
        WS_PORT,
        WS_PATH,
        &nonce,
        &mut handshake_buffer,
    )
    .await
    .map_err(WsError::Handshake)?;
    info!("WS: Connected to {}://{}:{}{}", scheme(), WS_HOST, WS_PORT, WS_PATH);

    // Keine Meldungen aus einer früheren Session nachsenden
    outbound.clear();

    let mut frame_buffer = [0u8; WEBSOCKET_BUFFER_SIZE];
    let mut json_buffer = [0u8; JSON_BUFFER_SIZE];

    loop {
        let event = select3(
            wait_readable(socket),
            outbound.receive(),
            Timer::after(Duration::from_secs(WS_PING_INTERVAL_SECS)),
        )
        .await;

        match event {
            // Daten vom Server
            Either3::First(()) => match recv_frame(stream, &mut frame_buffer)
                .await
                .map_err(WsError::Frame)?
            {
                Received::Oversized { frame_type, len } => {
                    warn!(
                        "WS: Frame too large ({} bytes, {}), dropped",
                        len,
                        Debug2Format(&frame_type)
                    );
                }
                Received::Frame {
                    frame_type,
                    payload,
                } => match frame_type {
                    FrameType::Text(false) => {
                        match core::str::from_utf8(payload) {
                            Ok(text) => info!("WS: <<< {}", text),
                            Err(_) => info!("WS: <<< {} bytes (no UTF-8)", payload.len()),
                        }
                        // Passt immer: Frame-Buffer und InboundFrame sind gleich groß
                        let mut frame = InboundFrame::new();
                        let _ = frame.extend_from_slice(payload);
                        events.send(SyncEvent::Frame(frame)).await;
                    }
                    FrameType::Text(true) | FrameType::Continue(_) => {
                        warn!("WS: Fragmented message ignored");
                    }
                    FrameType::Binary(_) => {
                        info!(
                            "WS: Received binary message: {} bytes (ignored)",
                            payload.len()
                        );
                    }
                    FrameType::Ping => {
                        send_frame(stream, FrameType::Pong, rng, payload).await?;
                    }
                    FrameType::Pong => {}
                    FrameType::Close => {
                        info!("WS: Close received");
                        // Status-Code zurückspiegeln, Fehler sind hier egal
                        let code = &payload[..payload.len().min(2)];
                        let _ = send_frame(stream, FrameType::Close, rng, code).await;
                        return Ok(());
                    }
                },
            },
            // Meldung der Sync-Engine
            Either3::Second(msg) => {
                let n = match codec::encode(&msg, &mut json_buffer) {
                    Ok(n) => n,
                    Err(e) => {
                        error!("WS: Failed to encode {}: {}", msg, e);
                        continue;
                    }
                };
                send_frame(stream, FrameType::Text(false), rng, &json_buffer[..n]).await?;

                if let Ok(text) = core::str::from_utf8(&json_buffer[..n]) {
                    info!("WS: >>> {}", text);
                }
            }
            // Ruhe auf der Leitung: Ping als Liveness-Check
            Either3::Third(()) => {
                send_frame(stream, FrameType::Ping, rng, &[]).await?;
            }
        }
    }
}

/// Sendet einen maskierten Client-Frame und leert den Stream
///
/// Mit TLS wird erst beim `flush` ein Record verschickt.
async fn send_frame<S: Write>(
    stream: &mut S,
    frame_type: FrameType,
    rng: &mut HardwareRng,
    payload: &[u8],
) -> Result<(), WsError> {
    edge_ws::io::send(&mut *stream, frame_type, Some(rng.next_u32()), payload)
        .await
        .map_err(|_| WsError::ConnectionLost)?;
    stream.flush().await.map_err(|_| WsError::ConnectionLost)
}

/// Wartet bis der TCP-Socket lesbar ist
///
/// Mit TLS kann ein bereits entschlüsselter Rest im Record-Buffer liegen,
/// der erst mit den nächsten TCP-Daten (spätestens Ping/Pong) gelesen wird.
#[allow(
    clippy::await_holding_refcell_ref,
    reason = "the session is the only user of the socket and never reads or writes while waiting here"
)]
async fn wait_readable(socket: &RefCell<TcpSocket<'_>>) {
    socket.borrow().wait_read_ready().await
}

/// TCP-Socket hinter einem `RefCell`
///
/// Die TLS-Session besitzt ihren Stream, der Session-Loop muss aber trotzdem
/// auf Lesbarkeit des Sockets warten können.
struct SharedSocket<'s, 'b> {
    socket: &'s RefCell<TcpSocket<'b>>,
}

impl<'s, 'b> SharedSocket<'s, 'b> {
    fn new(socket: &'s RefCell<TcpSocket<'b>>) -> Self {
        Self { socket }
    }
}

impl ErrorType for SharedSocket<'_, '_> {
    type Error = embassy_net::tcp::Error;
}

#[allow(
    clippy::await_holding_refcell_ref,
    reason = "reads, writes and wait_readable run strictly one after another in one task"
)]
impl Read for SharedSocket<'_, '_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().read(buf).await
    }
}

#[allow(
    clippy::await_holding_refcell_ref,
    reason = "reads, writes and wait_readable run strictly one after another in one task"
)]
impl Write for SharedSocket<'_, '_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().write(buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.socket.borrow_mut().flush().await
    }
}

fn scheme() -> &'static str {
    if WS_TLS { "wss" } else { "ws" }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
/// IP-Literale werden von embassy-net direkt zurückgegeben.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, WsError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => addrs
            .iter()
            .find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
            })
            .ok_or(WsError::DnsResolutionFailed),
        Ok(Err(_)) => Err(WsError::DnsResolutionFailed),
        Err(_) => Err(WsError::DnsTimeout),
    }
}

/// WebSocket Fehler-Typen
///
/// Jeder Fehler beendet die aktuelle Session, danach Reconnect.
#[derive(Debug, defmt::Format)]
enum WsError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    Tls,
    Handshake(HandshakeError),
    Frame(RecvError),
    ConnectionLost,
}
