//! Config block command handlers.

use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use restconf_core::{ConfigBlock, Reconciler, Refresh, RequestContext};

use crate::cli::{Command, ContentArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;
use crate::state::StateFile;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct BlockRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Content")]
    content: String,
}

impl From<&ConfigBlock> for BlockRow {
    fn from(b: &ConfigBlock) -> Self {
        Self {
            path: b.path().to_owned(),
            state: b.state().to_string(),
            content: output::truncate(b.content(), 60),
        }
    }
}

#[derive(Debug, Serialize)]
struct RefreshReport {
    path: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct RefreshRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn detail(b: &ConfigBlock) -> String {
    [
        format!("Path:    {}", b.path()),
        format!("Id:      {}", b.id().unwrap_or("-")),
        format!("State:   {}", b.state()),
        "Content:".to_owned(),
        output::render_document(&crate::cli::OutputFormat::Table, b.content()),
    ]
    .join("\n")
}

// ── Session ─────────────────────────────────────────────────────────

/// Everything a device-bound handler needs.
struct Session<'a> {
    global: &'a GlobalOpts,
    reconciler: Reconciler,
    ctx: RequestContext,
    state: StateFile,
    color: bool,
}

impl<'a> Session<'a> {
    fn open(global: &'a GlobalOpts, cancel: &CancellationToken) -> Result<Self, CliError> {
        let state = StateFile::load(&global.state)?;
        let reconciler = util::connect(global)?;
        Ok(Self {
            global,
            reconciler,
            ctx: util::request_context(global, cancel),
            state,
            color: output::should_color(&global.color),
        })
    }

    fn print_block(&self, block: &ConfigBlock) -> Result<(), CliError> {
        let out = output::render_single(&self.global.output, block, detail, |b| {
            b.path().to_owned()
        })?;
        output::print_output(&out, self.global.quiet);
        Ok(())
    }

    fn report_drift(&self, path: &str, refresh: &Refresh) {
        if refresh.drifted() {
            output::warning(
                &format!("'{path}' drifted on the device; tracked content now follows the device"),
                self.color,
            );
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    cmd: Command,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        // Local-only commands
        Command::List => list(global),
        Command::Show(arg) => show(global, &arg.path),
        Command::Forget(arg) => forget(global, &arg.path),

        // Device-bound commands
        Command::Create(args) => create(Session::open(global, cancel)?, &args).await,
        Command::Read(arg) => read(Session::open(global, cancel)?, &arg.path).await,
        Command::Refresh => refresh(Session::open(global, cancel)?).await,
        Command::Update(args) => update(Session::open(global, cancel)?, &args).await,
        Command::Delete(arg) => delete(Session::open(global, cancel)?, &arg.path).await,
        Command::Import(arg) => import(Session::open(global, cancel)?, &arg.path).await,
        Command::Get(arg) => get(global, cancel, &arg.path).await,

        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

// ── Local ───────────────────────────────────────────────────────────

fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let state = StateFile::load(&global.state)?;
    let blocks: Vec<ConfigBlock> = state.blocks().cloned().collect();
    let out = output::render_list(&global.output, &blocks, |b| BlockRow::from(b), |b| {
        b.path().to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn show(global: &GlobalOpts, path: &str) -> Result<(), CliError> {
    let state = StateFile::load(&global.state)?;
    let block = state.tracked(path)?;
    let out = match global.output {
        crate::cli::OutputFormat::Plain => block.content().to_owned(),
        _ => output::render_single(&global.output, &block, detail, |b| b.path().to_owned())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn forget(global: &GlobalOpts, path: &str) -> Result<(), CliError> {
    let mut state = StateFile::load(&global.state)?;
    state.tracked(path)?;
    state.remove(path);
    state.save()?;
    output::notice(
        &format!("Stopped tracking '{path}' (device untouched)"),
        global.quiet,
        output::should_color(&global.color),
    );
    Ok(())
}

// ── Device-bound ────────────────────────────────────────────────────

async fn create(mut s: Session<'_>, args: &ContentArgs) -> Result<(), CliError> {
    if s.state.get(&args.path).is_some() {
        return Err(CliError::AlreadyTracked {
            path: args.path.clone(),
        });
    }

    let content = util::read_content(args)?;
    let mut block = ConfigBlock::new(args.path.clone(), content);
    let refresh = s.reconciler.create(&s.ctx, &mut block).await?;

    s.state.put(block.clone());
    s.state.save()?;

    output::notice(&format!("Created '{}'", block.path()), s.global.quiet, s.color);
    s.report_drift(block.path(), &refresh);
    s.print_block(&block)
}

async fn read(mut s: Session<'_>, path: &str) -> Result<(), CliError> {
    let mut block = s.state.tracked(path)?;
    let refresh = s.reconciler.read(&s.ctx, &mut block).await?;

    if refresh.drifted() {
        s.state.put(block.clone());
        s.state.save()?;
    }

    s.report_drift(path, &refresh);
    s.print_block(&block)
}

async fn refresh(mut s: Session<'_>) -> Result<(), CliError> {
    let mut reports = Vec::new();
    let mut changed = false;

    for path in s.state.paths() {
        let mut block = s.state.tracked(&path)?;
        let report = match s.reconciler.read(&s.ctx, &mut block).await {
            Ok(refresh) => {
                if refresh.drifted() {
                    s.state.put(block);
                    changed = true;
                }
                RefreshReport {
                    path,
                    status: if refresh.drifted() { "drifted" } else { "in-sync" },
                    error: None,
                }
            }
            Err(e) => {
                warn!(%path, error = %e, "refresh failed");
                RefreshReport {
                    path,
                    status: "error",
                    error: Some(e.to_string()),
                }
            }
        };
        reports.push(report);
    }

    if changed {
        s.state.save()?;
    }

    let color = s.color;
    let out = output::render_list(
        &s.global.output,
        &reports,
        |r| RefreshRow {
            path: r.path.clone(),
            status: match (&r.error, r.status) {
                (Some(e), _) => format!("error: {e}"),
                (None, status) => output::status_label(status == "drifted", color),
            },
        },
        |r| format!("{}\t{}", r.path, r.status),
    )?;
    output::print_output(&out, s.global.quiet);

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        return Err(CliError::RefreshFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

async fn update(mut s: Session<'_>, args: &ContentArgs) -> Result<(), CliError> {
    let mut block = s.state.tracked(&args.path)?;
    let desired = util::read_content(args)?;

    let refresh = s.reconciler.update(&s.ctx, &mut block, desired).await?;

    s.state.put(block.clone());
    s.state.save()?;

    output::notice(&format!("Updated '{}'", block.path()), s.global.quiet, s.color);
    s.report_drift(block.path(), &refresh);
    s.print_block(&block)
}

async fn delete(mut s: Session<'_>, path: &str) -> Result<(), CliError> {
    let mut block = s.state.tracked(path)?;
    if !util::confirm(&format!("Delete '{path}' from the device?"), s.global.yes)? {
        return Ok(());
    }

    s.reconciler.delete(&s.ctx, &mut block).await?;

    s.state.remove(path);
    s.state.save()?;

    output::notice(&format!("Deleted '{path}'"), s.global.quiet, s.color);
    Ok(())
}

async fn import(mut s: Session<'_>, path: &str) -> Result<(), CliError> {
    if s.state.get(path).is_some() {
        return Err(CliError::AlreadyTracked { path: path.into() });
    }

    let block = s.reconciler.import(&s.ctx, path).await?;

    s.state.put(block.clone());
    s.state.save()?;

    output::notice(&format!("Imported '{path}'"), s.global.quiet, s.color);
    s.print_block(&block)
}

async fn get(global: &GlobalOpts, cancel: &CancellationToken, path: &str) -> Result<(), CliError> {
    let reconciler = util::connect(global)?;
    let ctx = util::request_context(global, cancel);

    let text = reconciler
        .client()
        .read(&ctx, path)
        .await
        .map_err(restconf_core::CoreError::from)?;

    output::print_output(&output::render_document(&global.output, &text), global.quiet);
    Ok(())
}
