// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels
// (WebSocket/Taster → Sync, Sync → WebSocket).

pub mod button;
pub mod sync;
pub mod websocket;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use button::button_task;
pub use sync::sync_task;
pub use websocket::websocket_task;
pub use wifi::{connection_task, dhcp_task, net_task};
