// ── Runtime connection configuration ──
//
// These types describe *how* to reach one RESTCONF device. They carry
// credentials and transport tuning but never touch disk or the process
// environment: the config layer resolves everything once and hands a
// finished `DeviceConnection` in.

use std::path::PathBuf;
use std::time::Duration;

use restconf_api::transport::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use restconf_api::{Credentials, Endpoint, RestconfClient, TlsMode, TransportConfig};
use secrecy::SecretString;

use crate::error::CoreError;

/// TLS verification strategy.
///
/// There is no implicit insecure default: accepting any certificate must be
/// requested with [`DangerAcceptInvalid`](Self::DangerAcceptInvalid).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file (device or lab CA).
    CustomCa(PathBuf),
    /// Skip verification (self-signed device certificates).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Everything needed to talk to one device.
#[derive(Debug, Clone)]
pub struct DeviceConnection {
    /// Normalized base address (e.g. `https://10.0.0.1:443/restconf/data`).
    pub endpoint: Endpoint,
    pub username: String,
    pub password: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Dial timeout; must be shorter than `timeout`.
    pub connect_timeout: Duration,
    /// Overall per-request timeout.
    pub timeout: Duration,
}

impl DeviceConnection {
    /// A connection with default TLS and timeout settings.
    pub fn new(endpoint: Endpoint, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Normalize a host string (and optional device port) into a connection.
    pub fn from_host(
        host: &str,
        device_port: Option<u16>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, CoreError> {
        let endpoint = Endpoint::parse_with_port(host, device_port)?;
        Ok(Self::new(endpoint, username, password))
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            connect_timeout: self.connect_timeout,
            timeout: self.timeout,
        }
    }

    /// Build the transport client bound to this connection.
    pub fn connect(&self) -> Result<RestconfClient, CoreError> {
        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        Ok(RestconfClient::new(
            self.endpoint.clone(),
            credentials,
            &self.transport_config(),
        )?)
    }
}
