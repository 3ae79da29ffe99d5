// Device endpoint normalization.
//
// Operators hand us anything from `10.0.0.1` to
// `https://router.lab:8443/restconf/data`. Normalization fills in the scheme
// (https) and port (device port if configured, else 443) and keeps any path
// component as the fixed API root that every resource path hangs off.

use std::borrow::Cow;
use std::fmt;

use url::Url;

use crate::error::Error;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_PORT: u16 = 443;

/// A normalized device base address: `<scheme>://<host>:<port>[/<root>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
    root: Option<String>,
}

impl Endpoint {
    /// Normalize a host string, defaulting the port to 443.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Self::parse_with_port(raw, None)
    }

    /// Normalize a host string. A port written in `raw` always wins;
    /// otherwise `device_port`, otherwise [`DEFAULT_PORT`].
    pub fn parse_with_port(raw: &str, device_port: Option<u16>) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "host is empty"));
        }

        let candidate: Cow<'_, str> = if trimmed.contains("://") {
            Cow::Borrowed(trimmed)
        } else {
            Cow::Owned(format!("{DEFAULT_SCHEME}://{trimmed}"))
        };

        let url = Url::parse(&candidate).map_err(|e| invalid(raw, &e.to_string()))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid(raw, "no host component"))?
            .to_owned();

        let port = if has_explicit_port(&candidate) {
            url.port_or_known_default()
                .ok_or_else(|| invalid(raw, "unknown port"))?
        } else {
            device_port.unwrap_or(DEFAULT_PORT)
        };

        let root = Some(url.path().trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        Ok(Self {
            scheme: url.scheme().to_owned(),
            host,
            port,
            root,
        })
    }

    /// Replace the API root segment (e.g. `restconf/data`).
    pub fn with_root(mut self, root: &str) -> Self {
        let root = root.trim_matches('/');
        self.root = (!root.is_empty()).then(|| root.to_owned());
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Full URL for a resource path: `<base>/<path>`.
    ///
    /// Paths are appended textually rather than via `Url::join`: RESTCONF
    /// paths such as `ietf-interfaces:interfaces` would otherwise be read as
    /// a URL scheme.
    pub fn resource_url(&self, path: &str) -> Result<Url, Error> {
        let raw = format!("{self}/{}", path.trim_start_matches('/'));
        Ok(Url::parse(&raw)?)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)?;
        if let Some(root) = &self.root {
            write!(f, "/{root}")?;
        }
        Ok(())
    }
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidEndpoint {
        input: input.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Whether the authority section of `url` spells out a port. `Url` drops
/// ports equal to the scheme default, so this looks at the raw text.
fn has_explicit_port(url: &str) -> bool {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let tail = host_port.rsplit_once(']').map_or(host_port, |(_, t)| t);
    tail.rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}
