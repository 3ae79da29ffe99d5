//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use restconf_config::ConfigError;
use restconf_core::{CoreError, TransportCause};

/// Process exit codes, one per error class.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the device: {reason}")]
    #[diagnostic(
        code(restconf::connection_failed),
        help(
            "Check that the device is running and RESTCONF is enabled.\n\
             Verify --host / RESTCONF_HOST and --device-port.\n\
             A self-signed device certificate needs --insecure (-k) or ca_cert."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out: {reason}")]
    #[diagnostic(
        code(restconf::timeout),
        help("Increase --timeout / --deadline or check device responsiveness.")
    )]
    Timeout { reason: String },

    #[error("Operation cancelled")]
    #[diagnostic(code(restconf::cancelled))]
    Cancelled,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(restconf::auth_failed),
        help(
            "Verify the username and password for this device.\n\
             Run: restconf config set-password"
        )
    )]
    AuthFailed { status: u16 },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(restconf::no_credentials),
        help(
            "Configure credentials with: restconf config init\n\
             Or set RESTCONF_USERNAME and RESTCONF_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Blocks ───────────────────────────────────────────────────────
    #[error("Config block '{path}' no longer exists on the device")]
    #[diagnostic(
        code(restconf::vanished),
        help(
            "It was removed outside of restconf.\n\
             Recreate it, or stop tracking it with: restconf forget {path}"
        )
    )]
    Vanished { path: String },

    #[error("Nothing to import: no document at '{path}'")]
    #[diagnostic(
        code(restconf::nothing_to_import),
        help("Create it instead with: restconf create {path} --content <json>")
    )]
    NothingToImport { path: String },

    #[error("Config block '{path}' is not tracked")]
    #[diagnostic(
        code(restconf::not_tracked),
        help("Run: restconf list to see tracked blocks, or restconf import {path}")
    )]
    NotTracked { path: String },

    #[error("Configuration already exists at '{path}'")]
    #[diagnostic(
        code(restconf::conflict),
        help("Import the existing resource instead: restconf import {path}")
    )]
    Conflict { path: String },

    #[error("Config block '{path}' is already tracked")]
    #[diagnostic(
        code(restconf::already_tracked),
        help("Use restconf update {path} to change it, or restconf read {path} to refresh it.")
    )]
    AlreadyTracked { path: String },

    #[error("{message}")]
    #[diagnostic(code(restconf::invalid_state))]
    InvalidState { message: String },

    #[error("{failed} of {total} blocks failed to refresh")]
    #[diagnostic(
        code(restconf::refresh_failed),
        help("Rerun with -v for details on each failure.")
    )]
    RefreshFailed { failed: usize, total: usize },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device returned HTTP {status} for '{path}'")]
    #[diagnostic(code(restconf::unexpected_status))]
    UnexpectedStatus { path: String, status: u16 },

    #[error("Invalid JSON document: {message}")]
    #[diagnostic(
        code(restconf::invalid_document),
        help("Check the JSON content and try again.")
    )]
    InvalidDocument { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(restconf::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(restconf::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: restconf config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(restconf::no_config),
        help(
            "Pass --host (or set RESTCONF_HOST), or create a profile with: restconf config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(restconf::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {reason}")]
    #[diagnostic(code(restconf::keyring))]
    Keyring { reason: String },

    // ── State file ───────────────────────────────────────────────────
    #[error("State file '{path}' is unreadable: {reason}")]
    #[diagnostic(
        code(restconf::state),
        help("Fix or remove the file. Tracked blocks can be re-adopted with restconf import.")
    )]
    State { path: String, reason: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(restconf::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(restconf::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::Keyring { .. } => {
                exit_code::AUTH
            }
            Self::Vanished { .. } | Self::NothingToImport { .. } | Self::NotTracked { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Conflict { .. } | Self::AlreadyTracked { .. } => exit_code::CONFLICT,
            Self::InvalidState { .. }
            | Self::InvalidDocument { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config(_)
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TransportFailure { cause, reason } => match cause {
                TransportCause::Timeout => CliError::Timeout { reason },
                TransportCause::Cancelled => CliError::Cancelled,
                TransportCause::Connect | TransportCause::Other => {
                    CliError::ConnectionFailed { reason }
                }
            },

            CoreError::UnexpectedStatus { status, .. } if status == 401 || status == 403 => {
                CliError::AuthFailed { status }
            }
            CoreError::UnexpectedStatus { path, status } => {
                CliError::UnexpectedStatus { path, status }
            }

            CoreError::NotFound { path } => CliError::Vanished { path },
            CoreError::NothingToImport { path } => CliError::NothingToImport { path },
            CoreError::Conflict { path } => CliError::Conflict { path },

            err @ CoreError::InvalidState { .. } => CliError::InvalidState {
                message: err.to_string(),
            },

            CoreError::Serialization { message } => CliError::InvalidDocument { message },

            CoreError::Config { message } => CliError::Validation {
                field: "connection".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, .. } if field == "host" => CliError::NoConfig {
                path: restconf_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Keyring(e) => CliError::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Core(e) => e.into(),
        }
    }
}
