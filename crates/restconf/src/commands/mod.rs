//! Command dispatch: bridges CLI args -> reconciler operations -> output formatting.

pub mod blocks;
pub mod config_cmd;
pub mod util;

use tokio_util::sync::CancellationToken;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a block command to its handler.
pub async fn dispatch(
    cmd: Command,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    tracing::debug!(command = ?cmd, "dispatching command");
    blocks::handle(cmd, global, cancel).await
}
