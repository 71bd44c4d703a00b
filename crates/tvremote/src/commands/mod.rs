//! Command dispatch: bridges CLI args -> session operations -> output.

pub mod config_cmd;
pub mod keys;
pub mod remote;
pub mod session;
pub mod wake;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a TV-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Pair(args) => remote::pair(args, global).await,
        Command::Key(args) => remote::key(args, global).await,
        Command::Text(args) => remote::text(args, global).await,
        Command::Mouse(args) => remote::mouse(args, global).await,
        Command::Wake(args) => wake::handle(args, global).await,
        Command::Watch => watch::handle(global).await,
        Command::Keys => {
            keys::handle(global);
            Ok(())
        }
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions need the clap command tree and are handled in main
        Command::Completions(_) => Ok(()),
    }
}
