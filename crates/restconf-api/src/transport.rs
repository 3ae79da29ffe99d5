// Shared transport configuration for building reqwest::Client instances.
//
// Carries TLS trust policy plus the two independent time budgets: the
// connect (dial) timeout and the overall per-request timeout.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::error::Error;

/// Default TCP/TLS connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default overall request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS verification mode (api-level mirror of core's `TlsVerification`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Trust the CA certificate(s) in the given PEM file in addition to the
    /// system store (device-specific or lab CAs).
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed devices). Explicit opt-in only.
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Bound on establishing the connection. Must be shorter than `timeout`
    /// so a hung handshake fails on its own budget.
    pub connect_timeout: Duration,
    /// Bound on the whole request, body included.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Check that the timeouts are usable and correctly ordered.
    pub fn validate(&self) -> Result<(), Error> {
        if self.connect_timeout.is_zero() || self.timeout.is_zero() {
            return Err(Error::InvalidTransport(
                "timeouts must be greater than zero".into(),
            ));
        }
        if self.connect_timeout >= self.timeout {
            return Err(Error::InvalidTransport(format!(
                "connect timeout ({:?}) must be shorter than request timeout ({:?})",
                self.connect_timeout, self.timeout
            )));
        }
        Ok(())
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.validate()?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .user_agent(concat!("restconf-blocks/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let certs = reqwest::Certificate::from_pem_bundle(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                if certs.is_empty() {
                    return Err(Error::Tls(format!(
                        "no certificates found in {}",
                        path.display()
                    )));
                }
                for cert in certs {
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsMode::DangerAcceptInvalid => {
                warn!("TLS certificate verification is disabled for this device connection");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
