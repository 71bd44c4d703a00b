//! The duplex channel to a single device.
//!
//! [`SessionTransport`] wraps one WebSocket stream. It never spawns tasks
//! and never retries: the owner awaits [`next_frame`](SessionTransport::next_frame)
//! once per inbound message, so exactly one read is outstanding at a time,
//! and decides on its own what a failure means.
//!
//! # Example
//!
//! ```rust,ignore
//! use tvremote_api::transport::TransportConfig;
//! use tvremote_api::websocket::{Inbound, SessionTransport};
//! use url::Url;
//!
//! let url = Url::parse("wss://192.168.1.20:8002/api/v2/channels/samsung.remote.control?name=dHZyZW1vdGU=")?;
//! let mut transport = SessionTransport::connect(&url, &TransportConfig::default()).await?;
//!
//! while let Inbound::Text(text) = transport.next_frame().await? {
//!     println!("{text}");
//! }
//! ```

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Close code reported when the stream ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;

/// One inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Binary(Vec<u8>),
    /// Close frame received or the stream ended.
    Closed { code: u16, reason: String },
}

impl Inbound {
    /// Payload bytes of a data frame.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Text(text) => Some(text.as_bytes()),
            Self::Binary(bytes) => Some(bytes),
            Self::Closed { .. } => None,
        }
    }
}

/// A live WebSocket connection to the device.
pub struct SessionTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl SessionTransport {
    /// Open the channel. Bounded by [`TransportConfig::connect_timeout`].
    pub async fn connect(url: &Url, config: &TransportConfig) -> Result<Self, Error> {
        tracing::info!(
            host = url.host_str().unwrap_or_default(),
            port = url.port_or_known_default(),
            path = url.path(),
            "Connecting to device WebSocket"
        );

        let connector = config.connector()?;
        let connecting =
            tokio_tungstenite::connect_async_tls_with_config(url.as_str(), None, true, connector);

        let (stream, _response) = tokio::time::timeout(config.connect_timeout, connecting)
            .await
            .map_err(|_| Error::ConnectTimeout {
                timeout_secs: config.connect_timeout.as_secs(),
            })?
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        tracing::info!("Device WebSocket connected");
        Ok(Self {
            stream,
            closed: false,
        })
    }

    /// Wait for the next data frame.
    ///
    /// Control frames are consumed here; pings are answered by tungstenite.
    /// Cancel-safe: dropping the future loses no frame.
    pub async fn next_frame(&mut self) -> Result<Inbound, Error> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Inbound::Text(text.as_str().to_owned())),
                Some(Ok(Message::Binary(bytes))) => return Ok(Inbound::Binary(bytes.to_vec())),
                Some(Ok(Message::Close(frame))) => {
                    self.closed = true;
                    let (code, reason) = frame.map_or_else(
                        || (ABNORMAL_CLOSURE, String::from("no close payload")),
                        |cf| (u16::from(cf.code), cf.reason.as_str().to_owned()),
                    );
                    tracing::info!(code, reason = %reason, "WebSocket close frame received");
                    return Ok(Inbound::Closed { code, reason });
                }
                Some(Ok(Message::Ping(_))) => tracing::trace!("WebSocket ping"),
                Some(Ok(_)) => {
                    // Pong, raw Frame -- ignore
                }
                Some(Err(e)) => return Err(Error::WebSocketRead(e.to_string())),
                None => {
                    self.closed = true;
                    tracing::info!("WebSocket stream ended");
                    return Ok(Inbound::Closed {
                        code: ABNORMAL_CLOSURE,
                        reason: "stream ended".into(),
                    });
                }
            }
        }
    }

    /// Write one text frame and wait until it is flushed.
    pub async fn send_text(&mut self, text: String) -> Result<(), Error> {
        if self.closed {
            return Err(Error::WebSocketWrite("channel already closed".into()));
        }
        self.stream
            .send(Message::text(text))
            .await
            .map_err(|e| Error::WebSocketWrite(e.to_string()))
    }

    /// Close the channel. Idempotent and best-effort.
    pub async fn close(&mut self) {
        if std::mem::replace(&mut self.closed, true) {
            return;
        }
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "WebSocket close failed (ignored)");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
