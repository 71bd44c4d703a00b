// ── Observable session state ──
//
// Published through a `watch` channel owned by the controller. The
// controller is the only writer; every write is tagged with the session
// generation so a torn-down session can never overwrite a newer one.

use crate::error::CoreError;

/// Pairing outcome as reported by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Unauthorized,
    Allowed,
    Denied,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Disconnected,
    /// Opening the socket, or waiting out a reconnect back-off.
    Connecting,
    /// Socket open, waiting for the device's pairing frame.
    Authorizing,
    Allowed,
    Denied,
    /// Reconnect attempts exhausted or the session could not start.
    Failed,
}

impl SessionPhase {
    /// Phases in which no further progress happens without caller action.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            Self::Disconnected | Self::Allowed | Self::Denied | Self::Failed
        )
    }
}

/// Snapshot of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Not reset by a transport failure: a dropped socket does not revoke
    /// pairing, it only pauses dispatch until the next connection.
    pub auth: AuthStatus,
    /// True while an automatic reconnect is outstanding.
    pub reconnecting: bool,
    pub attempt: u32,
    pub generation: u64,
    /// Most recent error that ended a connection attempt.
    pub last_error: Option<CoreError>,
}

impl SessionState {
    pub fn is_authorized(&self) -> bool {
        self.auth == AuthStatus::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_phases() {
        assert!(SessionPhase::Allowed.is_settled());
        assert!(SessionPhase::Denied.is_settled());
        assert!(SessionPhase::Failed.is_settled());
        assert!(!SessionPhase::Connecting.is_settled());
        assert!(!SessionPhase::Authorizing.is_settled());
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(AuthStatus::Unauthorized.to_string(), "unauthorized");
        assert_eq!(SessionPhase::Authorizing.to_string(), "authorizing");
    }
}
