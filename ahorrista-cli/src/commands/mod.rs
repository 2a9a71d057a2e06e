//! CLI command implementations

pub mod auth;
pub mod config;
pub mod expenses;
pub mod goals;
pub mod logs;
pub mod menu;

use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use ahorrista_core::services::Route;
use ahorrista_core::{AhorristaContext, EntryPoint, LogEvent, LoggingService, OperationResult};

use crate::notifier::TerminalNotifier;

/// Event log shared by a command and its context; None when it cannot start
pub type Logger = Option<Arc<LoggingService>>;

/// Get the logging service, or None if it cannot start
/// (logging never blocks an operation)
pub fn get_logger(entry_point: EntryPoint) -> Logger {
    let app_dir = get_app_dir().ok()?;
    LoggingService::new(&app_dir, entry_point, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Logger, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log that a command ran, ignoring any errors
pub fn log_command(logger: &Logger, command: &str) {
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }
}

/// Log that a view was shown, ignoring any errors
pub fn log_route(logger: &Logger, route: Route) {
    if let Some(l) = logger {
        let _ = l.log_route(route.path());
    }
}

/// App directory from `AHORRISTA_DIR`, else `~/.ahorrista`
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("AHORRISTA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".ahorrista"))
}

/// Build the context for a one-shot command
pub fn get_context(logger: &Logger) -> Result<AhorristaContext> {
    build_context(TerminalNotifier::printing(), logger)
}

/// Build the context for the interactive menu
pub fn get_interactive_context(logger: &Logger) -> Result<AhorristaContext> {
    build_context(TerminalNotifier::interactive(), logger)
}

fn build_context(notifier: TerminalNotifier, logger: &Logger) -> Result<AhorristaContext> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;

    AhorristaContext::with_logger(&app_dir, Arc::new(notifier), logger.clone())
        .context("Failed to initialize ahorrista context")
}

/// Context for commands that need a logged-in user
pub fn get_workspace_context(logger: &Logger) -> Result<AhorristaContext> {
    let ctx = get_context(logger)?;
    require_login(&ctx)?;
    Ok(ctx)
}

/// Route guard for one-shot commands
pub fn require_login(ctx: &AhorristaContext) -> Result<()> {
    if ctx.open(Route::Workspace) != Route::Workspace {
        anyhow::bail!("Not logged in. Run 'ahorrista login' first.");
    }
    Ok(())
}

/// Print a core result in the `--json` envelope
///
/// Failures exit with status 1 after printing.
pub fn print_json<T: Serialize>(result: ahorrista_core::domain::result::Result<T>) -> Result<()> {
    let failed = result.is_err();
    let output = OperationResult::from(result);
    println!("{}", serde_json::to_string_pretty(&output)?);
    if failed {
        exit(1);
    }
    Ok(())
}
