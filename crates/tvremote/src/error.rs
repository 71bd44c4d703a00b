//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tvremote_config::ConfigError;
use tvremote_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the TV at {url}")]
    #[diagnostic(
        code(tvremote::connection_failed),
        help(
            "Check that the TV is powered on and on the same network.\n\
             Try: tvremote wake"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Connection to the TV was lost: {reason}")]
    #[diagnostic(code(tvremote::connection_lost))]
    ConnectionLost { reason: String },

    // ── Pairing ──────────────────────────────────────────────────────
    #[error("The TV denied access")]
    #[diagnostic(
        code(tvremote::pairing_denied),
        help(
            "Allow the app under Settings > General > External Device Manager\n\
             > Device Connection Manager, then run: tvremote pair"
        )
    )]
    PairingDenied,

    #[error("The TV ended the pairing attempt")]
    #[diagnostic(
        code(tvremote::pairing_ended),
        help("Accept the prompt on the TV screen when running: tvremote pair")
    )]
    PairingEnded,

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Unknown key '{key}'")]
    #[diagnostic(
        code(tvremote::unknown_key),
        help("Run: tvremote keys to see available keys")
    )]
    UnknownKey { key: String },

    #[error("No MAC address configured for profile '{profile}'")]
    #[diagnostic(
        code(tvremote::no_mac),
        help("Pass --mac or set `mac` in the profile.")
    )]
    NoMacAddress { profile: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tvremote::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(tvremote::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: tvremote config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(tvremote::no_config),
        help(
            "Create one with: tvremote config init\n\
             Or pass the TV address with --host.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(tvremote::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Timed out after {seconds}s")]
    #[diagnostic(
        code(tvremote::timeout),
        help("Increase the timeout with --timeout or check that the TV is awake.")
    )]
    Timeout { seconds: u64 },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Session error: {message}")]
    #[diagnostic(code(tvremote::session))]
    Session { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ConnectionLost { .. } => exit_code::CONNECTION,
            Self::PairingDenied | Self::PairingEnded => exit_code::AUTH,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::UnknownKey { .. } | Self::NoMacAddress { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { timeout_secs } | CoreError::PairingTimedOut { timeout_secs } => {
                CliError::Timeout {
                    seconds: timeout_secs,
                }
            }

            CoreError::ConnectionLost { code, reason } => CliError::ConnectionLost {
                reason: format!("{reason} (code {code})"),
            },

            CoreError::ReconnectExhausted { attempts } => CliError::ConnectionLost {
                reason: format!("gave up after {attempts} reconnect attempt(s)"),
            },

            CoreError::PairingEnded => CliError::PairingEnded,

            CoreError::NotAuthorized { .. } => CliError::PairingDenied,

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            other => CliError::Session {
                message: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Session(core) => core.into(),
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
