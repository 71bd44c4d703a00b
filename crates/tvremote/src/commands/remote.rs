//! Pairing and remote input: `pair`, `key`, `text`, `mouse`.

use tvremote_core::ControlKey;

use crate::cli::{GlobalOpts, KeyArgs, MouseArgs, MouseCommand, PairArgs, TextArgs};
use crate::config::TokenStore;
use crate::error::CliError;

use super::session;

pub async fn pair(args: PairArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = session::open(global, !args.no_save).await?;

    if !global.quiet {
        let host = &session.target.profile.host;
        match (session.controller.token().is_some(), session.stored) {
            (false, _) => eprintln!("✓ Paired with {host}, but the TV issued no token"),
            (true, Some(TokenStore::Keyring)) => {
                eprintln!("✓ Paired with {host}; token stored in system keyring");
            }
            (true, Some(TokenStore::Plaintext)) => {
                eprintln!("✓ Paired with {host}; token saved to config file");
            }
            (true, None) => eprintln!("✓ Paired with {host}"),
        }
    }

    session.close();
    Ok(())
}

/// Parse key names up front so a typo never opens a connection.
pub fn parse_keys(names: &[String]) -> Result<Vec<ControlKey>, CliError> {
    names
        .iter()
        .map(|name| {
            name.parse::<ControlKey>()
                .map_err(|_| CliError::UnknownKey { key: name.clone() })
        })
        .collect()
}

pub async fn key(args: KeyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let keys = parse_keys(&args.keys)?;
    let count = keys.len();

    let mut session = session::open(global, true).await?;
    session.controller.send_keys(keys)?;
    session.flush(count).await?;
    session.close();

    if !global.quiet {
        eprintln!("✓ Sent {count} key press(es)");
    }
    Ok(())
}

pub async fn text(args: TextArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.text.is_empty() {
        return Err(CliError::Validation {
            field: "text".into(),
            reason: "text cannot be empty".into(),
        });
    }

    let mut session = session::open(global, true).await?;
    session.controller.send_text(&args.text)?;
    session.flush(1).await?;
    session.close();
    Ok(())
}

pub async fn mouse(args: MouseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut session = session::open(global, true).await?;
    match args.command {
        MouseCommand::Move { dx, dy } => session.controller.move_mouse(dx, dy)?,
        MouseCommand::Click => session.controller.left_click()?,
    }
    session.flush(1).await?;
    session.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_bare_and_wire_key_names() {
        let keys = parse_keys(&["volup".into(), "KEY_HOME".into(), "Enter".into()]).unwrap();
        assert_eq!(
            keys,
            vec![ControlKey::VolumeUp, ControlKey::Home, ControlKey::Enter]
        );
    }

    #[test]
    fn unknown_key_is_a_usage_error() {
        let err = parse_keys(&["up".into(), "warp".into()]).unwrap_err();
        assert!(matches!(err, CliError::UnknownKey { ref key } if key == "warp"));
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
