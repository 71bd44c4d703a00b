//! Clap derive structures for the `tvremote` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tvremote -- drive a Samsung TV over its remote-control channel
#[derive(Debug, Parser)]
#[command(
    name = "tvremote",
    version,
    about = "Control a Samsung TV from the command line",
    long_about = "Pairs with a Samsung television over its secure WebSocket\n\
        remote-control channel and sends key presses, text and pointer input.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "TVREMOTE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// TV IP address (overrides profile)
    #[arg(long, short = 'H', env = "TVREMOTE_HOST", global = true)]
    pub host: Option<String>,

    /// Remote-control port (overrides profile)
    #[arg(long, env = "TVREMOTE_PORT", global = true)]
    pub port: Option<u16>,

    /// Name shown in the TV's pairing prompt
    #[arg(long, env = "TVREMOTE_APP_NAME", global = true)]
    pub app_name: Option<String>,

    /// Pairing token
    #[arg(long, env = "TVREMOTE_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Connect and pairing timeout in seconds
    #[arg(long, env = "TVREMOTE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TVREMOTE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// JSON, one document per line for streams
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pair with the TV and store the token it issues
    Pair(PairArgs),

    /// Press one or more remote keys, in order
    #[command(alias = "k")]
    Key(KeyArgs),

    /// Type text into the focused input field
    Text(TextArgs),

    /// Move or click the on-screen pointer
    Mouse(MouseArgs),

    /// Power the TV on with a Wake-on-LAN packet
    Wake(WakeArgs),

    /// Stay connected and print session events until interrupted
    Watch,

    /// List the remote keys the TV understands
    Keys,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session commands ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Don't persist the token the TV issues
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Key names, with or without the KEY_ prefix (e.g. volup, KEY_HOME)
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, Args)]
pub struct TextArgs {
    /// Text to send
    pub text: String,
}

#[derive(Debug, Args)]
pub struct MouseArgs {
    #[command(subcommand)]
    pub command: MouseCommand,
}

#[derive(Debug, Subcommand)]
pub enum MouseCommand {
    /// Move the pointer by a relative offset
    Move {
        /// Horizontal offset
        #[arg(allow_negative_numbers = true)]
        dx: i32,

        /// Vertical offset
        #[arg(allow_negative_numbers = true)]
        dy: i32,
    },

    /// Left click at the pointer position
    Click,
}

#[derive(Debug, Args)]
pub struct WakeArgs {
    /// MAC address (overrides profile)
    #[arg(long)]
    pub mac: Option<String>,

    /// Broadcast address (overrides profile)
    #[arg(long)]
    pub broadcast: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
