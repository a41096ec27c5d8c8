use anyhow::Context;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

const LOG_FILES_KEPT: usize = 5;

/// Daily rolling file under `cfg.dir`, keeping the last few files.
pub fn file_appender(cfg: &LogConfig) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(&cfg.dir)
        .with_context(|| format!("create log directory {}", cfg.dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&cfg.file)
        .max_log_files(LOG_FILES_KEPT)
        .build(&cfg.dir)
        .context("open log file")
}

/// Logs to stdout and to the rolling file. Keep the guard alive until exit so
/// buffered lines reach the file.
pub fn init_tracing(cfg: &LogConfig) -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fintrack={},axum=info,tower_http=info",
            cfg.level
        ))
    });

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(cfg)?);
    let json = cfg.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_target(false)))
        .with((!json).then(fmt::layer))
        .with(json.then(|| {
            fmt::layer()
                .json()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer.clone())
        }))
        .with((!json).then(|| fmt::layer().with_ansi(false).with_writer(file_writer.clone())))
        .try_init()
        .context("install tracing subscriber")?;

    Ok(guard)
}
