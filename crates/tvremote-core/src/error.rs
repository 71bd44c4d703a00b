// ── Core error types ──
//
// User-facing errors from tvremote-core. Consumers never see raw
// tungstenite or serde failures; the `From<tvremote_api::Error>` impl
// translates transport-layer errors into session-level variants.
//
// `CoreError` is `Clone` because it travels inside `SessionEvent`s that
// are broadcast to every subscriber.

use thiserror::Error;

use crate::state::AuthStatus;

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid target address, app name or policy. Raised before any I/O.
    Configuration,
    /// Connection refused, reset, closed or timed out. Drives reconnection.
    Transport,
    /// Malformed frame, unexpected event or missing token. Never closes the session.
    Protocol,
    /// A call made in the wrong state. Local to that call.
    Precondition,
    Internal,
}

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Connection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("No pairing answer from the device within {timeout_secs}s")]
    PairingTimedOut { timeout_secs: u64 },

    #[error("Connection lost (code {code}): {reason}")]
    ConnectionLost { code: u16, reason: String },

    #[error("Gave up reconnecting after {attempts} attempt(s)")]
    ReconnectExhausted { attempts: u32 },

    #[error("Command {command} was never delivered: the session ended")]
    CommandDropped { command: String },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Malformed frame from device: {message}")]
    MalformedFrame { message: String, body: String },

    #[error("Unexpected channel event: {event}")]
    UnexpectedEvent { event: String },

    #[error("Device authorized the session without issuing a token")]
    MissingToken,

    #[error("Device ended the pairing attempt before it was accepted")]
    PairingEnded,

    // ── Precondition errors ──────────────────────────────────────────
    #[error("Session is already connected")]
    AlreadyConnected,

    #[error("Session is not connected")]
    NotConnected,

    #[error("Session is not authorized (status: {status})")]
    NotAuthorized { status: AuthStatus },

    #[error("Command serialization failed: {message}")]
    Serialization { message: String },

    // ── Wake-on-LAN ──────────────────────────────────────────────────
    #[error("Wake-on-LAN failed: {message}")]
    WakeOnLan { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Configuration,
            Self::ConnectionFailed { .. }
            | Self::Timeout { .. }
            | Self::PairingTimedOut { .. }
            | Self::ConnectionLost { .. }
            | Self::ReconnectExhausted { .. }
            | Self::CommandDropped { .. }
            | Self::WakeOnLan { .. } => ErrorKind::Transport,
            Self::MalformedFrame { .. }
            | Self::UnexpectedEvent { .. }
            | Self::MissingToken
            | Self::PairingEnded => ErrorKind::Protocol,
            Self::AlreadyConnected
            | Self::NotConnected
            | Self::NotAuthorized { .. }
            | Self::Serialization { .. } => ErrorKind::Precondition,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tvremote_api::Error> for CoreError {
    fn from(err: tvremote_api::Error) -> Self {
        use tvremote_api::Error as Api;

        match err {
            Api::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            Api::ConnectTimeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::WebSocketClosed { code, reason } => CoreError::ConnectionLost { code, reason },
            Api::WebSocketRead(reason) => CoreError::ConnectionLost {
                code: 1006,
                reason: format!("read failed: {reason}"),
            },
            Api::WebSocketWrite(reason) => CoreError::ConnectionLost {
                code: 1006,
                reason: format!("write failed: {reason}"),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            Api::MalformedFrame { message, body } => CoreError::MalformedFrame { message, body },
            Api::Serialization(message) => CoreError::Serialization { message },
            Api::InvalidMacAddress(mac) => CoreError::Config {
                message: format!("Invalid MAC address: {mac}"),
            },
            Api::WakeOnLan(e) => CoreError::WakeOnLan {
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_kinds() {
        let lost: CoreError = tvremote_api::Error::WebSocketClosed {
            code: 1001,
            reason: "going away".into(),
        }
        .into();
        assert_eq!(
            lost,
            CoreError::ConnectionLost {
                code: 1001,
                reason: "going away".into()
            }
        );
        assert_eq!(lost.kind(), ErrorKind::Transport);

        let malformed: CoreError = tvremote_api::Error::MalformedFrame {
            message: "expected value".into(),
            body: "nope".into(),
        }
        .into();
        assert_eq!(malformed.kind(), ErrorKind::Protocol);

        let mac: CoreError = tvremote_api::Error::InvalidMacAddress("zz".into()).into();
        assert_eq!(mac.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn precondition_errors_render_status() {
        let err = CoreError::NotAuthorized {
            status: AuthStatus::Denied,
        };
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.to_string(), "Session is not authorized (status: denied)");
        assert_eq!(ErrorKind::Precondition.to_string(), "precondition");
    }
}
