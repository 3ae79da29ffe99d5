//! Clap derive structures for the `restconf` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// restconf -- manage RESTCONF configuration blocks as desired state
#[derive(Debug, Parser)]
#[command(
    name = "restconf",
    version,
    about = "Manage RESTCONF device configuration blocks from the command line",
    long_about = "Create, read, update, delete and import JSON configuration documents on\n\
        RESTCONF devices, tracking them in a local state file.\n\n\
        Reads detect drift order-insensitively and adopt the device's document\n\
        as the new known state.",
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
    #[arg(long, short = 'p', env = "RESTCONF_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device address, optionally with scheme, port and API root (overrides profile)
    #[arg(long, short = 'H', env = "RESTCONF_HOST", global = true)]
    pub host: Option<String>,

    /// Bare device host, combined with --device-port
    #[arg(long, env = "RESTCONF_DEVICE_HOST", global = true)]
    pub device_host: Option<String>,

    /// Device port used when the host does not name one
    #[arg(long, env = "RESTCONF_DEVICE_PORT", global = true)]
    pub device_port: Option<u16>,

    /// Basic auth username
    #[arg(long, short = 'u', env = "RESTCONF_USERNAME", global = true)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long, env = "RESTCONF_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Accept any TLS certificate (self-signed devices)
    #[arg(long, short = 'k', env = "RESTCONF_INSECURE", global = true)]
    pub insecure: bool,

    /// Trust this CA certificate (PEM) in addition to the system store
    #[arg(long, env = "RESTCONF_CA_CERT", global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "RESTCONF_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Connect timeout in seconds (must be below --timeout)
    #[arg(long, env = "RESTCONF_CONNECT_TIMEOUT", global = true)]
    pub connect_timeout: Option<u64>,

    /// Deadline in seconds for the whole operation, across all requests
    #[arg(long, env = "RESTCONF_DEADLINE", global = true)]
    pub deadline: Option<u64>,

    /// State file tracking managed blocks
    #[arg(
        long,
        short = 's',
        env = "RESTCONF_STATE",
        default_value = "restconf.state.json",
        global = true
    )]
    pub state: PathBuf,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RESTCONF_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
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
    /// Create a block on the device and start tracking it
    Create(ContentArgs),

    /// Refresh one tracked block from the device, adopting any drift
    Read(PathArg),

    /// Refresh every tracked block
    Refresh,

    /// Replace a tracked block's document on the device
    Update(ContentArgs),

    /// Delete a tracked block from the device
    #[command(alias = "rm")]
    Delete(PathArg),

    /// Adopt an existing device document without creating it
    Import(PathArg),

    /// Stop tracking a block without touching the device
    Forget(PathArg),

    /// Fetch a document from the device without touching state
    Get(PathArg),

    /// List tracked blocks
    #[command(alias = "ls")]
    List,

    /// Show the tracked content of one block
    Show(PathArg),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Block arguments ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PathArg {
    /// Resource path below the API root (e.g. "ietf-interfaces:interfaces/interface=eth0")
    pub path: String,
}

#[derive(Debug, Args)]
pub struct ContentArgs {
    /// Resource path below the API root
    pub path: String,

    /// JSON document inline
    #[arg(long, short = 'c', conflicts_with = "file", required_unless_present = "file")]
    pub content: Option<String>,

    /// Read the JSON document from a file ("-" for stdin)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
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

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
