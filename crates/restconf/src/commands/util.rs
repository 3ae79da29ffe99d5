//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};
use std::time::Duration;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use restconf_config::Overrides;
use restconf_core::{Reconciler, RequestContext};

use crate::cli::{ContentArgs, GlobalOpts};
use crate::error::CliError;

/// Translate global flags (and their env defaults) into config overrides.
pub fn overrides(global: &GlobalOpts) -> Overrides {
    Overrides {
        profile: global.profile.clone(),
        host: global.host.clone(),
        device_host: global.device_host.clone(),
        device_port: global.device_port,
        username: global.username.clone(),
        password: global.password.clone().map(SecretString::from),
        insecure: global.insecure,
        ca_cert: global.ca_cert.clone(),
        timeout: global.timeout,
        connect_timeout: global.connect_timeout,
    }
}

/// Resolve the device connection from config + flags and build a reconciler.
pub fn connect(global: &GlobalOpts) -> Result<Reconciler, CliError> {
    let cfg = restconf_config::load_config()?;
    let conn = restconf_config::resolve_connection(&cfg, &overrides(global))?;
    tracing::debug!(endpoint = %conn.endpoint, "connecting");
    Ok(Reconciler::connect(&conn)?)
}

/// Request context bound to the process-wide cancellation token, with the
/// optional `--deadline` applied.
pub fn request_context(global: &GlobalOpts, cancel: &CancellationToken) -> RequestContext {
    let ctx = RequestContext::with_token(cancel.clone());
    match global.deadline {
        Some(secs) => ctx.timeout(Duration::from_secs(secs)),
        None => ctx,
    }
}

/// Read the desired document from `--content` or `--file`.
pub fn read_content(args: &ContentArgs) -> Result<String, CliError> {
    if let Some(ref content) = args.content {
        return Ok(content.clone());
    }
    match args.file.as_deref() {
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Err(CliError::Validation {
            field: "content".into(),
            reason: "pass --content or --file".into(),
        }),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}
