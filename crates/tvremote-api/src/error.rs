use thiserror::Error;

/// Top-level error type for the `tvremote-api` crate.
///
/// Covers every failure mode below the session layer: the WebSocket
/// transport, frame decoding, command serialization and Wake-on-LAN.
/// `tvremote-core` maps these into its session error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// WebSocket upgrade or TCP connect failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// The connect attempt did not complete in time.
    #[error("WebSocket connect timed out after {timeout_secs}s")]
    ConnectTimeout { timeout_secs: u64 },

    /// WebSocket closed by the device or the stream ended.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// Reading a frame failed.
    #[error("WebSocket read failed: {0}")]
    WebSocketRead(String),

    /// Writing a frame failed.
    #[error("WebSocket write failed: {0}")]
    WebSocketWrite(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// Inbound frame did not match the channel envelope, with the raw body for debugging.
    #[error("Malformed frame: {message}")]
    MalformedFrame { message: String, body: String },

    /// Outbound command could not be serialized.
    #[error("Command serialization failed: {0}")]
    Serialization(String),

    // ── Wake-on-LAN ─────────────────────────────────────────────────
    /// Hardware address could not be parsed.
    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    /// Broadcasting the magic packet failed.
    #[error("Wake-on-LAN failed: {0}")]
    WakeOnLan(#[source] std::io::Error),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::WebSocketConnect(_)
                | Self::ConnectTimeout { .. }
                | Self::WebSocketClosed { .. }
                | Self::WebSocketRead(_)
                | Self::WebSocketWrite(_)
        )
    }

    /// Returns `true` if this error came from a decoded (or undecodable) frame
    /// rather than from the socket itself.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::MalformedFrame { .. } | Self::Serialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_transient() {
        assert!(Error::WebSocketConnect("refused".into()).is_transient());
        assert!(Error::ConnectTimeout { timeout_secs: 5 }.is_transient());
        assert!(
            Error::WebSocketClosed {
                code: 1006,
                reason: "abnormal".into()
            }
            .is_transient()
        );
        assert!(!Error::InvalidMacAddress("zz".into()).is_transient());
    }

    #[test]
    fn malformed_frame_is_protocol() {
        let err = Error::MalformedFrame {
            message: "expected value".into(),
            body: "not json".into(),
        };
        assert!(err.is_protocol());
        assert!(!err.is_transient());
    }
}
