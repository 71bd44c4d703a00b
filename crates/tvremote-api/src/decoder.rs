//! Handshake frame decoding.
//!
//! The handshake is passive: after the socket opens the device emits a
//! `connect`, `unauthorized` or `timeOut` frame on its own. Any of them may
//! be the first message, so decoding is stateless and the caller applies
//! the resulting [`FrameOutcome`] to its own authorization state.

use crate::error::Error;
use crate::protocol::{AuthResponse, ChannelEvent};

/// What a decoded frame means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// `ms.channel.connect`: the client is allowed. `token` is `None` when
    /// the frame carried no credential at either location.
    Authorized { token: Option<String> },
    /// `ms.channel.unauthorized`: the user rejected the pairing prompt.
    Denied,
    /// `ms.channel.timeOut`: the device ended the pairing attempt. The
    /// channel should be closed.
    TimedOut,
    /// Any other channel event. Not fatal.
    Unexpected(ChannelEvent),
}

/// A frame decoded against the channel envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub response: AuthResponse,
    pub outcome: FrameOutcome,
}

/// Decode exactly one inbound message.
///
/// Text and binary frames are handed in as the same byte payload.
pub fn decode_frame(payload: &[u8]) -> Result<DecodedFrame, Error> {
    let response: AuthResponse =
        serde_json::from_slice(payload).map_err(|e| Error::MalformedFrame {
            message: e.to_string(),
            body: String::from_utf8_lossy(payload).into_owned(),
        })?;

    let outcome = match response.event {
        ChannelEvent::Connect => FrameOutcome::Authorized {
            token: response.refreshed_token().map(str::to_owned),
        },
        ChannelEvent::Unauthorized => FrameOutcome::Denied,
        ChannelEvent::TimeOut => FrameOutcome::TimedOut,
        other => FrameOutcome::Unexpected(other),
    };

    Ok(DecodedFrame { response, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_with_top_level_token() {
        let frame = decode_frame(br#"{"event":"ms.channel.connect","data":{"token":"T"}}"#).unwrap();
        assert_eq!(
            frame.outcome,
            FrameOutcome::Authorized {
                token: Some("T".into())
            }
        );
    }

    #[test]
    fn connect_with_client_token() {
        let frame = decode_frame(
            br#"{"event":"ms.channel.connect","data":{"clients":[{"attributes":{"token":"R"},"id":"x","isHost":true,"connectTime":1,"deviceName":"VA=="}]}}"#,
        )
        .unwrap();
        assert_eq!(
            frame.outcome,
            FrameOutcome::Authorized {
                token: Some("R".into())
            }
        );
    }

    #[test]
    fn connect_without_any_token() {
        let frame = decode_frame(br#"{"event":"ms.channel.connect"}"#).unwrap();
        assert_eq!(frame.outcome, FrameOutcome::Authorized { token: None });
    }

    #[test]
    fn unauthorized_and_timeout() {
        assert_eq!(
            decode_frame(br#"{"event":"ms.channel.unauthorized"}"#)
                .unwrap()
                .outcome,
            FrameOutcome::Denied
        );
        assert_eq!(
            decode_frame(br#"{"event":"ms.channel.timeOut"}"#)
                .unwrap()
                .outcome,
            FrameOutcome::TimedOut
        );
    }

    #[test]
    fn other_events_are_unexpected() {
        let frame = decode_frame(br#"{"event":"ms.channel.clientConnect","data":{}}"#).unwrap();
        assert_eq!(
            frame.outcome,
            FrameOutcome::Unexpected(ChannelEvent::ClientConnect)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_frame(b"not json").unwrap_err();
        match err {
            Error::MalformedFrame { body, .. } => assert_eq!(body, "not json"),
            other => panic!("expected MalformedFrame, got {other:?}"),
        }
    }

    #[test]
    fn unknown_event_string_is_malformed() {
        let err = decode_frame(br#"{"event":"ms.channel.bogus"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame { .. }));
    }
}
