//! `wake`: Wake-on-LAN for TVs that are in standby.

use tvremote_core::{MacAddress, WakeTarget};

use crate::cli::{GlobalOpts, WakeArgs};
use crate::config;
use crate::error::CliError;

/// `--mac` works without any config; otherwise the profile supplies it.
fn resolve_wake_target(args: WakeArgs, global: &GlobalOpts) -> Result<WakeTarget, CliError> {
    let mut target = match args.mac {
        Some(ref mac) => {
            let mac: MacAddress = mac.parse().map_err(|_| CliError::Validation {
                field: "mac".into(),
                reason: format!("'{mac}' is not a MAC address"),
            })?;
            WakeTarget::new(mac)
        }
        None => {
            let target = config::resolve_target(global)?;
            tvremote_config::wake_target(&target.profile)?.ok_or(CliError::NoMacAddress {
                profile: target.profile_name,
            })?
        }
    };

    if let Some(broadcast) = args.broadcast {
        target.broadcast = broadcast;
    }
    Ok(target)
}

pub async fn handle(args: WakeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let target = resolve_wake_target(args, global)?;
    tvremote_core::wake(&target).await?;

    if !global.quiet {
        eprintln!(
            "✓ Magic packet for {} sent to {}:{}",
            target.mac, target.broadcast, target.port
        );
    }
    Ok(())
}
