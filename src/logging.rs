use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sends tracing output to a daily log file under `dir`; the terminal
/// belongs to the board UI. Keep the guard alive until exit so buffered
/// lines are flushed.
pub fn init(filter: &str, dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    let appender = tracing_appender::rolling::daily(dir, "taskboard.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log filter {:?}", filter))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("installing log subscriber")?;
    Ok(guard)
}
