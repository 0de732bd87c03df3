// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

// ============================================================================
// LED Konfiguration
// ============================================================================

/// GPIO-Pin für die RGB LED (WS2812/Neopixel)
/// Informativ: der Pin wird in main.rs als `peripherals.GPIO8` übergeben
pub const LED_GPIO_PIN: u8 = 8;

/// Helligkeits-Level für die LED (0-255)
/// Wert ist gedimmt für Augenschonung
pub const LED_BRIGHTNESS: u8 = 10;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Auto-Off: LED geht so viele Sekunden nach jeder Änderung aus
pub const AUTO_OFF_SECS: u64 = 5;

// ============================================================================
// Taster Konfiguration
// ============================================================================

/// BOOT-Taster auf dem ESP32-C6 DevKit (active low)
/// Informativ: der Pin wird in main.rs als `peripherals.GPIO9` übergeben
pub const BUTTON_GPIO_PIN: u8 = 9;

/// Entprell-Zeit in Millisekunden
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Intervall für den WiFi Link-Check in Sekunden
/// Ist die Station nicht verbunden, wird neu verbunden
pub const WIFI_CHECK_INTERVAL_SECS: u64 = 60;

/// Wartezeit nach fehlgeschlagenem WiFi-Start/Connect in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// WebSocket Konfiguration
// ============================================================================

/// WebSocket Server Hostname oder IP-Adresse
/// Wird zur Build-Zeit aus der Environment Variable WS_HOST geladen
pub const WS_HOST: &str = env!(
    "WS_HOST",
    "WebSocket Host nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// TLS für die WebSocket-Verbindung (optional WS_TLS, Standard: an)
/// `true`: wss:// über TLS 1.3, `false`: ws:// über TCP
pub const WS_TLS: bool = match option_env!("WS_TLS") {
    Some(value) => parse_flag(value),
    None => true,
};

/// WebSocket Server Port (optional WS_PORT, Standard: 443 mit TLS, sonst 80)
pub const WS_PORT: u16 = match option_env!("WS_PORT") {
    Some(port) => parse_port(port),
    None if WS_TLS => 443,
    None => 80,
};

/// WebSocket Pfad (optional WS_PATH, Standard: "/")
pub const WS_PATH: &str = match option_env!("WS_PATH") {
    Some(path) => path,
    None => "/",
};

/// Reconnect-Intervall in Sekunden wenn die Verbindung weg ist
pub const WS_RECONNECT_INTERVAL_SECS: u64 = 30;

/// Ping-Intervall in Sekunden bei ruhender Verbindung
/// Ein fehlschlagender Ping beendet die Session → Reconnect
pub const WS_PING_INTERVAL_SECS: u64 = 30;

/// TCP Timeout in Sekunden (unbestätigte Daten → Verbindung tot)
pub const WS_TCP_TIMEOUT_SECS: u64 = 60;

/// TCP Keep-Alive in Sekunden
pub const WS_TCP_KEEPALIVE_SECS: u64 = 20;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// TCP RX/TX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// TLS Record-Buffer (lesen): ein kompletter Record mit 16 KB Klartext
/// plus Overhead, da der Server die Fragment-Länge nicht begrenzen muss
pub const TLS_READ_BUFFER_SIZE: usize = 16640;

/// TLS Record-Buffer (schreiben): Handshake und kleine JSON-Frames
pub const TLS_WRITE_BUFFER_SIZE: usize = 4096;

/// Buffer für die HTTP Upgrade-Antwort des Servers
pub const HANDSHAKE_BUFFER_SIZE: usize = 512;

/// WebSocket Frame-Buffer in Bytes
/// 512 Bytes reicht für JSON-Messages (< 64 Bytes), größere Frames werden
/// übersprungen
pub const WEBSOCKET_BUFFER_SIZE: usize = 512;

/// JSON Serialisierungs-Buffer für ausgehende Meldungen
/// Für {"type":"device_change_state","state":"blue"}
pub const JSON_BUFFER_SIZE: usize = 64;

// ============================================================================
// Channel-Kapazitäten
// ============================================================================

/// Eingehende Events an den Sync-Task (Frames + Taster)
pub const SYNC_EVENT_CAPACITY: usize = 2;

/// Ausgehende Meldungen an den WebSocket-Task
/// Volle Queue → Meldung wird verworfen (fire-and-forget)
pub const OUTBOUND_CAPACITY: usize = 4;

/// Parst WS_PORT zur Compile-Zeit
const fn parse_port(value: &str) -> u16 {
    let bytes = value.as_bytes();
    assert!(!bytes.is_empty(), "WS_PORT ist leer");

    let mut port: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii_digit(), "WS_PORT ist keine Zahl");
        port = port * 10 + (bytes[i] - b'0') as u32;
        assert!(port <= u16::MAX as u32, "WS_PORT ist größer als 65535");
        i += 1;
    }
    port as u16
}

/// Parst WS_TLS zur Compile-Zeit
const fn parse_flag(value: &str) -> bool {
    match value.as_bytes() {
        b"1" | b"true" => true,
        b"0" | b"false" => false,
        _ => panic!("WS_TLS muss true/false oder 1/0 sein"),
    }
}
