// ── Core error types ──
//
// Reconciliation-level errors. Consumers never match on HTTP details
// directly: the `From<restconf_api::Error>` impl folds transport errors into
// the outcome taxonomy, keeping "not found" a distinguished variant.

use std::fmt;

use thiserror::Error;

use crate::block::BlockState;

/// Why no response was obtained from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCause {
    Connect,
    Timeout,
    Cancelled,
    Other,
}

impl fmt::Display for TransportCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connection failed",
            Self::Timeout => "timed out",
            Self::Cancelled => "cancelled",
            Self::Other => "transport error",
        })
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    #[error("Transport failure ({cause}): {reason}")]
    TransportFailure {
        cause: TransportCause,
        reason: String,
    },

    #[error("Device returned unexpected status {status} for '{path}'")]
    UnexpectedStatus { path: String, status: u16 },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Config block '{path}' no longer exists on the device")]
    NotFound { path: String },

    #[error(
        "Configuration already exists at '{path}'. Import the existing resource instead of creating it"
    )]
    Conflict { path: String },

    #[error("Nothing to import: no document at '{path}'")]
    NothingToImport { path: String },

    #[error("Cannot {operation} config block '{path}' while it is {state}")]
    InvalidState {
        path: String,
        operation: &'static str,
        state: BlockState,
    },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Invalid JSON document: {message}")]
    Serialization { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<restconf_api::Error> for CoreError {
    fn from(err: restconf_api::Error) -> Self {
        use restconf_api::Error as Api;

        match err {
            Api::Transport(ref e) => {
                let cause = if e.is_timeout() {
                    TransportCause::Timeout
                } else if e.is_connect() {
                    TransportCause::Connect
                } else {
                    TransportCause::Other
                };
                CoreError::TransportFailure {
                    cause,
                    reason: e.to_string(),
                }
            }
            Api::DeadlineExceeded => CoreError::TransportFailure {
                cause: TransportCause::Timeout,
                reason: err.to_string(),
            },
            Api::Cancelled => CoreError::TransportFailure {
                cause: TransportCause::Cancelled,
                reason: err.to_string(),
            },
            Api::Tls(_)
            | Api::InvalidUrl(_)
            | Api::InvalidEndpoint { .. }
            | Api::InvalidTransport(_) => {
                CoreError::Config {
                    message: err.to_string(),
                }
            }
            Api::NotFound { path } => CoreError::NotFound { path },
            Api::UnexpectedStatus { path, status, .. } => {
                CoreError::UnexpectedStatus { path, status }
            }
        }
    }
}

// ── Outcome taxonomy ─────────────────────────────────────────────────

/// Coarse classification of an operation's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NotFound,
    Conflict,
    TransportFailure,
    UnexpectedStatus(u16),
    SerializationError,
    /// Rejected locally before any network call (bad state or config).
    Rejected,
}

impl Outcome {
    pub fn of<T>(result: &Result<T, CoreError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => e.outcome(),
        }
    }
}

impl CoreError {
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::TransportFailure { .. } => Outcome::TransportFailure,
            Self::UnexpectedStatus { status, .. } => Outcome::UnexpectedStatus(*status),
            Self::NotFound { .. } | Self::NothingToImport { .. } => Outcome::NotFound,
            Self::Conflict { .. } => Outcome::Conflict,
            Self::Serialization { .. } => Outcome::SerializationError,
            Self::InvalidState { .. } | Self::Config { .. } => Outcome::Rejected,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.outcome() == Outcome::NotFound
    }
}
