//! Tracing subscriber setup for the command-line tool

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Default filter directive; `RUST_LOG` takes precedence when set
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "mcpack_versions=debug"
    } else {
        "mcpack_versions=warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Opens `path` for appending, creating its parent directory if needed
fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mcpack-versions.log".to_string());

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
}

/// Installs the global subscriber.
///
/// Without a log file, human-readable output goes to stderr so stdout stays clean for results.
/// With one, JSON lines are appended to it through a non-blocking writer; keep the returned
/// guard alive until exit or buffered lines are lost. Fails without installing anything when
/// the log file cannot be opened.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>, InitError> {
    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbose))
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let appender = file_appender(path)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(verbose))
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}
