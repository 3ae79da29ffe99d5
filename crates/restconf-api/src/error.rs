use thiserror::Error;

/// Top-level error type for the `restconf-api` crate.
///
/// Two families: transport failures (no usable response was obtained) and
/// protocol outcomes (a response arrived but did not meet the call's success
/// contract). `restconf-core` maps these into reconciliation errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS handshake,
    /// request timeout, body read failure).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's deadline elapsed before a response was obtained.
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,

    /// TLS trust material could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Configuration ───────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Host string could not be normalized into an endpoint.
    #[error("Invalid endpoint '{input}': {reason}")]
    InvalidEndpoint { input: String, reason: String },

    /// Transport settings are inconsistent (e.g. connect timeout too long).
    #[error("Invalid transport settings: {0}")]
    InvalidTransport(String),

    // ── Protocol outcomes ───────────────────────────────────────────
    /// The device answered `404 Not Found` to a read.
    #[error("No document at '{path}'")]
    NotFound { path: String },

    /// A response arrived but its status does not match the call's contract.
    #[error("Unexpected status {status} for {method} '{path}'")]
    UnexpectedStatus {
        method: &'static str,
        path: String,
        status: u16,
    },
}

impl Error {
    /// Returns `true` for the distinguished "object absent" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if no response was obtained from the device.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::DeadlineExceeded | Self::Cancelled | Self::Tls(_)
        )
    }

    /// Returns `true` if the call ran out of time, either through the
    /// transport's own timeouts or the caller's deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::DeadlineExceeded => true,
            _ => false,
        }
    }

    /// The HTTP status carried by this error, if a response was obtained.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished_from_unexpected_status() {
        let missing = Error::NotFound {
            path: "interfaces/eth9".into(),
        };
        let broken = Error::UnexpectedStatus {
            method: "GET",
            path: "interfaces/eth9".into(),
            status: 500,
        };

        assert!(missing.is_not_found());
        assert!(!broken.is_not_found());
        assert_eq!(missing.status(), Some(404));
        assert_eq!(broken.status(), Some(500));
    }

    #[test]
    fn cancellation_and_deadline_are_transport_failures() {
        assert!(Error::Cancelled.is_transport_failure());
        assert!(Error::DeadlineExceeded.is_transport_failure());
        assert!(Error::DeadlineExceeded.is_timeout());
        assert!(!Error::Cancelled.is_timeout());
        assert!(
            !Error::NotFound {
                path: "x".into()
            }
            .is_transport_failure()
        );
    }
}
