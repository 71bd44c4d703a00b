// tvremote-core: Session lifecycle between tvremote-api and consumers (CLI).

pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod reconnect;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Scheme, SessionConfig};
pub use controller::SessionController;
pub use error::{CoreError, ErrorKind};
pub use event::SessionEvent;
pub use reconnect::{ReconnectPolicy, ReconnectState};
pub use state::{AuthStatus, SessionPhase, SessionState};

// Wire-level types callers build commands from.
pub use tvremote_api::protocol::{ControlKey, RemoteCommand};
pub use tvremote_api::transport::TlsMode;
pub use tvremote_api::wake::{MacAddress, WakeTarget};

/// Broadcast a Wake-on-LAN magic packet for `target`.
pub async fn wake(target: &WakeTarget) -> Result<(), CoreError> {
    tvremote_api::wake::send_magic_packet(target).await?;
    Ok(())
}
