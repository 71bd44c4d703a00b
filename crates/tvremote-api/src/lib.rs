// tvremote-api: Wire protocol, WebSocket transport and Wake-on-LAN for Samsung-style TV remote control

pub mod decoder;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod wake;
pub mod websocket;

pub use error::Error;
