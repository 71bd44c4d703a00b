//! CLI configuration: a thin wrapper around the shared `tvremote_config` types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--host, --token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use tvremote_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use tvremote_config::{
    Config, ConfigError, Profile, TokenStore, config_path, load_config, load_config_or_default,
    save_config,
};

/// The device a command talks to, after applying flag overrides.
#[derive(Debug)]
pub struct Target {
    pub profile_name: String,
    pub profile: Profile,
    pub config: Config,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load the config and pick the profile, layering `--host`, `--port` and
/// `--app-name` on top. Without a profile, `--host` alone is enough.
pub fn resolve_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let config = load_config()?;
    let profile_name = active_profile_name(global, &config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None => match global.host {
            Some(ref host) => Profile::new(host.clone()),
            None if global.profile.is_some() => {
                return Err(ConfigError::ProfileNotFound {
                    name: profile_name,
                    available: config.profile_names(),
                }
                .into());
            }
            None => {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
        },
    };

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if let Some(ref app_name) = global.app_name {
        profile.app_name.clone_from(app_name);
    }

    Ok(Target {
        profile_name,
        profile,
        config,
    })
}

/// Translate a resolved target into a `SessionConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn session_config(target: &Target, global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let mut session = tvremote_config::profile_to_session_config(
        &target.profile,
        &target.profile_name,
        &target.config.defaults,
    )?;

    if let Some(ref token) = global.token {
        session.token = Some(SecretString::from(token.clone()));
    }
    if let Some(secs) = global.timeout {
        let timeout = Duration::from_secs(secs.max(1));
        session.connect_timeout = timeout;
        session.pairing_timeout = timeout;
    }
    Ok(session)
}

/// Persist a refreshed token into the target's profile.
///
/// Returns where it went; the config file is rewritten only when the
/// token had to be stored in plaintext or the profile is new.
pub fn persist_token(target: &mut Target, token: &SecretString) -> Result<TokenStore, CliError> {
    let is_new = !target.config.profiles.contains_key(&target.profile_name);
    let store = tvremote_config::store_token(&target.profile_name, &mut target.profile, token);

    if is_new || store == TokenStore::Plaintext {
        target
            .config
            .profiles
            .insert(target.profile_name.clone(), target.profile.clone());
        if target.config.default_profile.is_none() {
            target.config.default_profile = Some(target.profile_name.clone());
        }
        save_config(&target.config)?;
    }
    Ok(store)
}
