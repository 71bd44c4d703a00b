//! Config subcommand handlers.

use std::net::IpAddr;

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("tvremote configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let host: String = Input::new()
                .with_prompt("TV IP address")
                .validate_with(|input: &String| -> Result<(), String> {
                    input
                        .trim()
                        .parse::<IpAddr>()
                        .map(|_| ())
                        .map_err(|_| "enter an IPv4 or IPv6 address".into())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let app_name: String = Input::new()
                .with_prompt("Name shown on the TV")
                .default("tvremote".into())
                .interact_text()
                .map_err(prompt_err)?;

            let mac: String = Input::new()
                .with_prompt("MAC address for Wake-on-LAN (optional)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let make_default = cfg.profiles.is_empty()
                || Confirm::new()
                    .with_prompt("Use this profile by default?")
                    .default(true)
                    .interact()
                    .map_err(prompt_err)?;

            let profile = Profile {
                app_name,
                mac: Some(mac.trim().to_string()).filter(|m| !m.is_empty()),
                ..Profile::new(host.trim())
            };
            tvremote_config::wake_target(&profile)?;

            cfg.profiles.insert(profile_name.clone(), profile);
            if make_default {
                cfg.default_profile = Some(profile_name.clone());
            }

            let path = config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Profile: {profile_name}");
            eprintln!("\n  Pair it: tvremote pair --profile {profile_name}");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.token.is_some() {
                    profile.token = Some("********".into());
                }
            }

            let out = match global.output {
                OutputFormat::Json => output::render_json(&cfg),
                OutputFormat::Plain => cfg.profile_names().join("\n"),
                OutputFormat::Table => toml::to_string_pretty(&cfg).map_err(|e| {
                    CliError::Validation {
                        field: "config".into(),
                        reason: format!("failed to serialize config: {e}"),
                    }
                })?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
