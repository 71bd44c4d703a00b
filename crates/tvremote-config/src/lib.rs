//! Shared configuration for the tvremote CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `tvremote_core::SessionConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tvremote_core::{
    CoreError, MacAddress, ReconnectPolicy, Scheme, SessionConfig, TlsMode, WakeTarget,
};

/// Environment variable that overrides any stored token.
pub const TOKEN_ENV: &str = "TVREMOTE_TOKEN";

const KEYRING_SERVICE: &str = "tvremote";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error(transparent)]
    Session(#[from] CoreError),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Connect timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds to wait for the pairing prompt to be answered.
    #[serde(default = "default_timeout")]
    pub pairing_timeout: u64,

    /// Seconds between automatic reconnects.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: u64,

    /// Cap on consecutive reconnects. Unset retries forever.
    #[serde(default)]
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            pairing_timeout: default_timeout(),
            reconnect_delay: default_reconnect_delay(),
            max_reconnect_attempts: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_reconnect_delay() -> u64 {
    5
}
fn default_app_name() -> String {
    "tvremote".into()
}

/// A named television.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// IP address of the device.
    pub host: String,

    /// Override the port (8002 for `wss`, 8001 for `ws`).
    pub port: Option<u16>,

    /// Name shown in the device's pairing prompt.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    pub device_id: Option<String>,

    /// "wss" (default) or "ws".
    pub scheme: Option<String>,

    /// Override the remote-control channel path.
    pub path: Option<String>,

    /// Pairing token (plaintext -- prefer keyring or env var).
    pub token: Option<String>,

    /// Hardware address for Wake-on-LAN.
    pub mac: Option<String>,

    /// Broadcast address for Wake-on-LAN.
    pub broadcast: Option<String>,

    /// Accept the device's self-signed certificate. Defaults to true.
    pub insecure: Option<bool>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            app_name: default_app_name(),
            device_id: None,
            scheme: None,
            path: None,
            token: None,
            mac: None,
            broadcast: None,
            insecure: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tvremote", "tvremote").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tvremote");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path. A missing file yields the defaults.
///
/// `TVREMOTE_` variables override file values; nested keys use a double
/// underscore (`TVREMOTE_DEFAULTS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TVREMOTE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Option<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token")).ok()
}

/// Resolve the pairing token. A missing token is not an error: the first
/// connection to a device pairs without one.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_token_from(profile, std::env::var(TOKEN_ENV).ok(), || {
        keyring_entry(profile_name).and_then(|entry| entry.get_password().ok())
    })
}

fn resolve_token_from(
    profile: &Profile,
    env: Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Option<SecretString> {
    // 1. Env var
    if let Some(token) = env.filter(|t| !t.is_empty()) {
        return Some(SecretString::from(token));
    }

    // 2. System keyring
    if let Some(token) = keyring() {
        return Some(SecretString::from(token));
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

/// Where [`store_token`] put the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStore {
    Keyring,
    /// Written into the profile; the caller must save the config.
    Plaintext,
}

/// Persist a refreshed token, preferring the system keyring.
pub fn store_token(profile_name: &str, profile: &mut Profile, token: &SecretString) -> TokenStore {
    let stored = keyring_entry(profile_name)
        .is_some_and(|entry| entry.set_password(token.expose_secret()).is_ok());

    if stored {
        profile.token = None;
        TokenStore::Keyring
    } else {
        tracing::debug!(profile = profile_name, "keyring unavailable, storing token in config");
        profile.token = Some(token.expose_secret().to_owned());
        TokenStore::Plaintext
    }
}

// ── Translation to core types ───────────────────────────────────────

fn validation(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Build a `SessionConfig` from a profile and the global defaults.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let token = resolve_token(profile, profile_name);
    build_session_config(profile, defaults, token)
}

fn build_session_config(
    profile: &Profile,
    defaults: &Defaults,
    token: Option<SecretString>,
) -> Result<SessionConfig, ConfigError> {
    let mut config = SessionConfig::new(&profile.host, profile.app_name.clone())?;

    if let Some(ref scheme) = profile.scheme {
        config.scheme = scheme
            .parse::<Scheme>()
            .map_err(|_| validation("scheme", format!("expected 'ws' or 'wss', got '{scheme}'")))?;
    }
    if let Some(port) = profile.port {
        config.port = port;
    }
    if let Some(ref path) = profile.path {
        config.path.clone_from(path);
    }
    config.device_id.clone_from(&profile.device_id);

    config.tls = if profile.insecure.unwrap_or(true) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::Verified
    };

    config.connect_timeout = Duration::from_secs(defaults.timeout);
    config.pairing_timeout = Duration::from_secs(defaults.pairing_timeout);
    config.reconnect = ReconnectPolicy {
        delay: Duration::from_secs(defaults.reconnect_delay),
        max_attempts: defaults.max_reconnect_attempts,
        ..ReconnectPolicy::default()
    };

    let config = config.with_token(token);
    config.validate()?;
    Ok(config)
}

/// Wake-on-LAN target for a profile, if it has a MAC address.
pub fn wake_target(profile: &Profile) -> Result<Option<WakeTarget>, ConfigError> {
    let Some(ref mac) = profile.mac else {
        return Ok(None);
    };
    let mac: MacAddress = mac
        .parse()
        .map_err(|_| validation("mac", format!("'{mac}' is not a MAC address")))?;

    let mut target = WakeTarget::new(mac);
    if let Some(ref broadcast) = profile.broadcast {
        target.broadcast.clone_from(broadcast);
    }
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    use pretty_assertions::assert_eq;

    fn living_room() -> Profile {
        Profile {
            mac: Some("aa:bb:cc:dd:ee:ff".into()),
            ..Profile::new("192.168.1.40")
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.reconnect_delay, 5);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "bedroom"

[defaults]
reconnect_delay = 2
max_reconnect_attempts = 4

[profiles.bedroom]
host = "10.0.0.7"
scheme = "ws"
port = 8001
mac = "AA-BB-CC-DD-EE-01"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("bedroom"));
        assert_eq!(cfg.defaults.max_reconnect_attempts, Some(4));

        let profile = cfg.profile("bedroom").unwrap();
        assert_eq!(profile.app_name, "tvremote");
        let session = build_session_config(profile, &cfg.defaults, None).unwrap();
        assert_eq!(session.scheme, Scheme::Ws);
        assert_eq!(session.port, 8001);
        assert_eq!(session.reconnect.delay, Duration::from_secs(2));
        assert_eq!(session.reconnect.max_attempts, Some(4));
        assert_eq!(session.tls, TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), living_room());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile_names(), vec!["default".to_string()]);
        assert_eq!(loaded.profile("default").unwrap().host, "192.168.1.40");
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("kitchen".into(), living_room());
        let err = cfg.profile("garage").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ProfileNotFound { ref available, .. } if available == &["kitchen".to_string()]
        ));
    }

    #[test]
    fn token_chain_prefers_env_then_keyring_then_plaintext() {
        let mut profile = living_room();
        profile.token = Some("plain".into());

        let token = resolve_token_from(&profile, Some("env".into()), || Some("ring".into()));
        assert_eq!(token.unwrap().expose_secret(), "env");

        let token = resolve_token_from(&profile, Some(String::new()), || Some("ring".into()));
        assert_eq!(token.unwrap().expose_secret(), "ring");

        let token = resolve_token_from(&profile, None, || None);
        assert_eq!(token.unwrap().expose_secret(), "plain");

        profile.token = None;
        assert!(resolve_token_from(&profile, None, || None).is_none());
    }

    #[test]
    fn rejects_bad_profile_values() {
        let defaults = Defaults::default();

        let mut profile = living_room();
        profile.scheme = Some("https".into());
        assert!(matches!(
            build_session_config(&profile, &defaults, None),
            Err(ConfigError::Validation { ref field, .. }) if field == "scheme"
        ));

        let profile = Profile::new("tv.local");
        assert!(matches!(
            build_session_config(&profile, &defaults, None),
            Err(ConfigError::Session(CoreError::Config { .. }))
        ));
    }

    #[test]
    fn verified_tls_is_opt_in() {
        let mut profile = living_room();
        profile.insecure = Some(false);
        let session = build_session_config(&profile, &Defaults::default(), None).unwrap();
        assert_eq!(session.tls, TlsMode::Verified);
    }

    #[test]
    fn wake_target_uses_profile_broadcast() {
        let mut profile = living_room();
        profile.broadcast = Some("192.168.1.255".into());
        let target = wake_target(&profile).unwrap().unwrap();
        assert_eq!(target.mac.to_string(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(target.broadcast, "192.168.1.255");
        assert_eq!(target.port, 9);

        profile.mac = Some("not-a-mac".into());
        assert!(wake_target(&profile).is_err());
        assert_eq!(wake_target(&Profile::new("10.0.0.1")).unwrap(), None);
    }
}
