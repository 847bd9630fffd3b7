// ============================================================================
// ttempsmooth-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: console and optional file logging for the CLI
//
// Console-only runs use env_logger with a timestamped, colored format.
// When a log file is requested the same format is dispatched through fern
// to stderr and to the file (without colors). RUST_LOG still narrows or
// widens the level in both cases.
//
// USAGE:
// - default: Info
// - --verbose: Debug
// - RUST_LOG=trace: per-plane dispatch details from the core

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use console::style;
use log::{Level, LevelFilter};
use ttempsmooth_core::CoreError;

use crate::error::{CliErrorContext, CliResult};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// Used to name log files when `--log-file` points at a directory.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn colored_label(level: Level) -> String {
    let label = level_label(level);
    match level {
        Level::Error => style(label).red().bold().to_string(),
        Level::Warn => style(label).yellow().to_string(),
        Level::Info => style(label).green().to_string(),
        Level::Debug => style(label).blue().to_string(),
        Level::Trace => style(label).magenta().to_string(),
    }
}

fn line_timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

/// Level from the verbose flag, overridden by `RUST_LOG` when it parses as
/// a plain level.
fn resolve_level(verbose: bool) -> LevelFilter {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(default)
}

/// Resolves the file to log into. A directory gets a timestamped file name.
pub fn resolve_log_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(format!("ttempsmooth_{}.log", get_timestamp()))
    } else {
        path.to_path_buf()
    }
}

/// Initializes logging. Must be called once, before any command runs.
pub fn init(verbose: bool, log_file: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = resolve_level(verbose);

    let Some(path) = log_file else {
        env_logger::Builder::new()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} {} {}",
                    style(line_timestamp()).dim(),
                    colored_label(record.level()),
                    record.args()
                )
            })
            .filter(None, level)
            .parse_default_env()
            .init();
        log::debug!("Logger initialized with level: {}", level);
        return Ok(None);
    };

    let path = resolve_log_path(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .cli_with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = fern::log_file(&path)
        .cli_with_context(|| format!("Failed to open log file {}", path.display()))?;

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {} {}",
                style(line_timestamp()).dim(),
                colored_label(record.level()),
                message
            ))
        })
        .chain(std::io::stderr());

    let plain = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level_label(record.level()),
                record.target(),
                message
            ))
        })
        .chain(file);

    fern::Dispatch::new()
        .level(level)
        .chain(console)
        .chain(plain)
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to install logger: {}", e)))?;

    log::debug!("Logger initialized with level: {}, file: {}", level, path.display());
    Ok(Some(path))
}
