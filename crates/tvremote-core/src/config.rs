// ── Runtime session configuration ──
//
// Describes *which* device to talk to and how. Carries the credential
// but never touches disk: the CLI builds a `SessionConfig` from its
// profile and hands it in.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::SecretString;
use tvremote_api::transport::{TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;
use crate::reconnect::ReconnectPolicy;

pub const DEFAULT_PORT: u16 = 8002;
pub const DEFAULT_PATH: &str = "/api/v2/channels/samsung.remote.control";

/// WebSocket scheme. Devices serve `wss` on 8002 and plain `ws` on 8001.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Scheme {
    Ws,
    #[default]
    Wss,
}

/// Configuration for a session with a single device.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: IpAddr,
    pub port: u16,
    pub scheme: Scheme,
    pub path: String,
    /// Optional device identifier, informational only.
    pub device_id: Option<String>,
    /// Name shown in the device's pairing prompt.
    pub app_name: String,
    /// Token from an earlier pairing. Replaced in the controller as the
    /// device refreshes it.
    pub token: Option<SecretString>,
    pub tls: TlsMode,
    /// Bound on TCP connect + TLS + WebSocket upgrade.
    pub connect_timeout: Duration,
    /// How long the first connection may wait for the device's pairing
    /// answer before it is treated as failed.
    pub pairing_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl SessionConfig {
    /// Validated config with defaults for everything but the target.
    pub fn new(host: &str, app_name: impl Into<String>) -> Result<Self, CoreError> {
        let host: IpAddr = host.trim().parse().map_err(|_| CoreError::Config {
            message: format!("'{host}' is not a valid IP address"),
        })?;
        let config = Self {
            host,
            port: DEFAULT_PORT,
            scheme: Scheme::default(),
            path: DEFAULT_PATH.into(),
            device_id: None,
            app_name: app_name.into(),
            token: None,
            tls: TlsMode::default(),
            connect_timeout: Duration::from_secs(30),
            pairing_timeout: Duration::from_secs(30),
            reconnect: ReconnectPolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    /// Fail fast on anything that would only surface once I/O starts.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |message: String| Err(CoreError::Config { message });

        let name = self.app_name.trim();
        if name.is_empty() {
            return invalid("app name must not be empty".into());
        }
        if name.chars().any(char::is_control) {
            return invalid("app name must be printable text".into());
        }
        if self.port == 0 {
            return invalid("port must be non-zero".into());
        }
        if !self.path.starts_with('/') {
            return invalid(format!("path '{}' must start with '/'", self.path));
        }
        if !self.reconnect.multiplier.is_finite() || self.reconnect.multiplier < 1.0 {
            return invalid(format!(
                "reconnect multiplier must be at least 1.0 (got {})",
                self.reconnect.multiplier
            ));
        }
        if self.connect_timeout.is_zero() || self.pairing_timeout.is_zero() {
            return invalid("timeouts must be non-zero".into());
        }
        Ok(())
    }

    /// `scheme://host:port/path?name=<base64 app name>[&token=<token>]`
    pub fn session_url(&self, token: Option<&str>) -> Result<Url, CoreError> {
        let base = format!(
            "{}://{}{}",
            self.scheme,
            SocketAddr::new(self.host, self.port),
            self.path
        );
        let mut url = Url::parse(&base).map_err(tvremote_api::Error::from)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("name", &BASE64.encode(self.app_name.trim()));
            if let Some(token) = token.filter(|t| !t.is_empty()) {
                query.append_pair("token", token);
            }
        }
        Ok(url)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls,
            connect_timeout: self.connect_timeout,
        }
    }
}
