//! Shared configuration for the RESTCONF tooling.
//!
//! TOML profiles, credential resolution (flag + env + keyring + plaintext),
//! and translation to `restconf_core::DeviceConnection`. The core never
//! reads files or the process environment; everything is resolved here once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use restconf_core::{CoreError, DeviceConnection, TlsVerification};

/// Keyring service name and config directory name.
pub const SERVICE: &str = "restconf";

/// Prefix for environment overrides of config keys.
pub const ENV_PREFIX: &str = "RESTCONF_";

const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Names of all configured profiles, comma separated.
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
fn default_connect_timeout() -> u64 {
    5
}

/// A named device profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Device address, optionally with scheme, port and API root
    /// (e.g. "https://10.0.0.1:8443/restconf/data").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Bare device host, combined with `device_port`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or `password_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", SERVICE, SERVICE).map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push(SERVICE);
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
/// Nested keys in the environment are separated by `__`, e.g.
/// `RESTCONF_PROFILES__LAB__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(SERVICE, &format!("{profile_name}/password"))?)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

/// Values supplied outside the config file (CLI flags and their env
/// defaults). Anything set here wins over the profile.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub host: Option<String>,
    pub device_host: Option<String>,
    pub device_port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub insecure: bool,
    pub ca_cert: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub connect_timeout: Option<u64>,
}

/// Resolve the active profile name from overrides and config.
pub fn active_profile_name(overrides: &Overrides, config: &Config) -> String {
    overrides
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.into())
}

/// Resolve the password from the credential chain.
///
/// Order: explicit override, the profile's `password_env` variable, the
/// system keyring, plaintext in the profile.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    overrides: &Overrides,
) -> Result<SecretString, ConfigError> {
    // 1. Flag / RESTCONF_PASSWORD
    if let Some(ref pw) = overrides.password {
        return Ok(pw.clone());
    }

    // 2. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            debug!(profile = profile_name, "password resolved from keyring");
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve a validated `DeviceConnection` from config and overrides.
///
/// This is the single boundary where config types cross into core types.
pub fn resolve_connection(
    config: &Config,
    overrides: &Overrides,
) -> Result<DeviceConnection, ConfigError> {
    let profile_name = active_profile_name(overrides, config);

    let fallback = Profile::default();
    let profile = match config.profiles.get(&profile_name) {
        Some(p) => p,
        // An explicitly requested profile must exist; the implicit default
        // may be absent when everything comes from flags and env.
        None if overrides.profile.is_some() => {
            return Err(ConfigError::ProfileNotFound {
                name: profile_name,
                available: config.available_profiles(),
            });
        }
        None => &fallback,
    };

    build_connection(profile, &profile_name, &config.defaults, overrides)
}

/// Translate one profile + overrides into a `DeviceConnection`.
pub fn build_connection(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    overrides: &Overrides,
) -> Result<DeviceConnection, ConfigError> {
    // 1. Address (flag > env > profile)
    let host = overrides
        .host
        .as_deref()
        .or(overrides.device_host.as_deref())
        .or(profile.host.as_deref())
        .or(profile.device_host.as_deref())
        .ok_or_else(|| ConfigError::Validation {
            field: "host".into(),
            reason: format!("no device host configured for profile '{profile_name}'"),
        })?;
    let device_port = overrides.device_port.or(profile.device_port);

    // 2. Credentials
    let username = overrides
        .username
        .clone()
        .or_else(|| profile.username.clone())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name, overrides)?;

    let mut conn = DeviceConnection::from_host(host, device_port, username, password)?;

    // 3. TLS verification
    conn.tls = if overrides.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ca_path) = overrides.ca_cert.as_ref().or(profile.ca_cert.as_ref()) {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 4. Timeouts
    let timeout = overrides
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);
    let connect_timeout = overrides
        .connect_timeout
        .or(profile.connect_timeout)
        .unwrap_or(defaults.connect_timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be greater than zero".into(),
        });
    }
    if connect_timeout == 0 || connect_timeout >= timeout {
        return Err(ConfigError::Validation {
            field: "connect_timeout".into(),
            reason: format!("must be between 1 and {} seconds (below timeout)", timeout - 1),
        });
    }
    conn.timeout = Duration::from_secs(timeout);
    conn.connect_timeout = Duration::from_secs(connect_timeout);

    debug!(
        profile = profile_name,
        endpoint = %conn.endpoint,
        "resolved device connection"
    );
    Ok(conn)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    fn lab_profile() -> Profile {
        Profile {
            host: Some("10.0.0.1".into()),
            username: Some("admin".into()),
            password: Some("plain".into()),
            ..Profile::default()
        }
    }

    fn with_password(pw: &str) -> Overrides {
        Overrides {
            password: Some(SecretString::from(pw.to_string())),
            ..Overrides::default()
        }
    }

    #[test]
    fn load_reads_profiles_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "lab"

                [defaults]
                timeout = 20

                [profiles.lab]
                device_host = "router.lab"
                device_port = 8443
                username = "admin"
                password_env = "LAB_PW"
                "#,
            )?;

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
            assert_eq!(cfg.defaults.timeout, 20);
            assert_eq!(cfg.defaults.connect_timeout, 5);
            let lab = &cfg.profiles["lab"];
            assert_eq!(lab.device_host.as_deref(), Some("router.lab"));
            assert_eq!(lab.device_port, Some(8443));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("nope.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[profiles.lab]\nhost = \"a\"\n")?;
            jail.set_env("RESTCONF_PROFILES__LAB__HOST", "b");
            jail.set_env("RESTCONF_DEFAULTS__INSECURE", "true");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.profiles["lab"].host.as_deref(), Some("b"));
            assert!(cfg.defaults.insecure);
            Ok(())
        });
    }

    #[test]
    fn save_round_trips_through_load() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested/config.toml");
            let mut cfg = Config::default();
            cfg.profiles.insert("lab".into(), lab_profile());

            save_config_to(&cfg, &path).unwrap();
            let text = std::fs::read_to_string(&path).unwrap();
            assert!(!text.contains("password_env"), "unset keys are omitted");

            assert_eq!(load_config_from(&path).unwrap(), cfg);
            Ok(())
        });
    }

    #[test]
    fn override_password_wins() {
        let pw = resolve_password(&lab_profile(), "lab", &with_password("flag")).unwrap();
        assert_eq!(pw.expose_secret(), "flag");
    }

    #[test]
    fn password_env_beats_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("LAB_PW", "from-env");
            let profile = Profile {
                password_env: Some("LAB_PW".into()),
                ..lab_profile()
            };
            let pw = resolve_password(&profile, "lab", &Overrides::default()).unwrap();
            assert_eq!(pw.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn no_password_anywhere_is_no_credentials() {
        let profile = Profile {
            password: None,
            ..lab_profile()
        };
        let err = resolve_password(&profile, "restconf-test-nonexistent", &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn build_connection_applies_defaults() {
        let conn = build_connection(
            &lab_profile(),
            "lab",
            &Defaults::default(),
            &with_password("pw"),
        )
        .unwrap();

        assert_eq!(conn.endpoint.to_string(), "https://10.0.0.1:443");
        assert_eq!(conn.username, "admin");
        assert_eq!(conn.tls, TlsVerification::SystemDefaults);
        assert_eq!(conn.timeout, Duration::from_secs(10));
        assert_eq!(conn.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn device_host_and_port_combine() {
        let profile = Profile {
            host: None,
            device_host: Some("router.lab".into()),
            device_port: Some(8443),
            ..lab_profile()
        };
        let conn =
            build_connection(&profile, "lab", &Defaults::default(), &with_password("pw")).unwrap();
        assert_eq!(conn.endpoint.to_string(), "https://router.lab:8443");
    }

    #[test]
    fn flags_override_profile() {
        let overrides = Overrides {
            host: Some("http://127.0.0.1:8080/restconf/data".into()),
            username: Some("ops".into()),
            insecure: true,
            timeout: Some(30),
            ..with_password("pw")
        };
        let conn =
            build_connection(&lab_profile(), "lab", &Defaults::default(), &overrides).unwrap();

        assert_eq!(conn.endpoint.to_string(), "http://127.0.0.1:8080/restconf/data");
        assert_eq!(conn.username, "ops");
        assert_eq!(conn.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(conn.timeout, Duration::from_secs(30));
    }

    #[test]
    fn ca_cert_selects_custom_ca() {
        let profile = Profile {
            ca_cert: Some("/etc/lab-ca.pem".into()),
            ..lab_profile()
        };
        let conn =
            build_connection(&profile, "lab", &Defaults::default(), &with_password("pw")).unwrap();
        assert_eq!(conn.tls, TlsVerification::CustomCa("/etc/lab-ca.pem".into()));
    }

    #[test]
    fn missing_host_is_validation_error() {
        let profile = Profile {
            host: None,
            ..lab_profile()
        };
        let err = build_connection(&profile, "lab", &Defaults::default(), &with_password("pw"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
    }

    #[test]
    fn missing_username_is_no_credentials() {
        let profile = Profile {
            username: None,
            ..lab_profile()
        };
        let err = build_connection(&profile, "lab", &Defaults::default(), &with_password("pw"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn connect_timeout_must_be_shorter() {
        let overrides = Overrides {
            timeout: Some(5),
            connect_timeout: Some(5),
            ..with_password("pw")
        };
        let err = build_connection(&lab_profile(), "lab", &Defaults::default(), &overrides)
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "connect_timeout")
        );
    }

    #[test]
    fn explicit_unknown_profile_is_rejected() {
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), lab_profile());
        let overrides = Overrides {
            profile: Some("prod".into()),
            ..with_password("pw")
        };

        let err = resolve_connection(&cfg, &overrides).unwrap_err();
        assert!(
            matches!(err, ConfigError::ProfileNotFound { ref available, .. } if available == "lab")
        );
    }

    #[test]
    fn implicit_default_profile_may_be_absent() {
        let overrides = Overrides {
            host: Some("10.9.9.9".into()),
            username: Some("admin".into()),
            ..with_password("pw")
        };
        let conn = resolve_connection(&Config::default(), &overrides).unwrap();
        assert_eq!(conn.endpoint.host(), "10.9.9.9");
    }
}
