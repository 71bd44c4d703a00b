// ── Session events ──
//
// The closed set of notifications a session emits. Every subscriber gets
// its own `broadcast` receiver and sees events in emission order.

use std::time::Duration;

use secrecy::SecretString;
use tvremote_api::protocol::RemoteCommand;

use crate::error::CoreError;
use crate::state::AuthStatus;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The socket to the device is open. `reconnect` is set when this
    /// connection was opened by the reconnection policy.
    Connected { reconnect: bool },
    /// The socket closed. `code` is the WebSocket close code when known.
    Disconnected { reason: String, code: Option<u16> },
    AuthorizationChanged { status: AuthStatus, reconnect: bool },
    /// The device issued a token to present on future connections.
    TokenRefreshed(SecretString),
    CommandWritten(RemoteCommand),
    Error(CoreError),
    /// Raw text of every inbound text frame.
    TextReceived(String),
    /// A reconnect is scheduled after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
}

impl SessionEvent {
    /// Short name for logs and the `watch` command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Disconnected { .. } => "disconnected",
            Self::AuthorizationChanged { .. } => "authorization_changed",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::CommandWritten(_) => "command_written",
            Self::Error(_) => "error",
            Self::TextReceived(_) => "text_received",
            Self::Reconnecting { .. } => "reconnecting",
        }
    }
}
