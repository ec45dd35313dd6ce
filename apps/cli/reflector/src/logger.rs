//! Logging for the reflector command-line host.
//!
//! Log lines go to stderr (colored) and to `reflector.log`. Stdout is left to
//! command output so `reflector list | ...` pipes only the table.

use crate::error::CliError;

use common::ErrorLocation;

use std::io::stderr;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

const LOG_FILE_NAME: &str = "reflector.log";

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// HTTP stack crates that log every connection at debug level.
const QUIET_DEPENDENCIES: [&str; 3] = ["hyper_util", "reqwest", "rustls"];

/// Where log lines go and how much of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerSettings {
    pub level: LevelFilter,
    /// Mirror log lines to stderr. The log file is always written.
    pub console: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: LOG_LEVEL,
            console: true,
        }
    }
}

impl LoggerSettings {
    /// `--verbose` raises the level to Debug; `--quiet` keeps the console
    /// silent but still writes the log file.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        Self {
            level: if verbose { LevelFilter::Debug } else { LOG_LEVEL },
            console: !quiet,
        }
    }
}

/// Install the global logger once.
///
/// Safe to call more than once: later calls log a warning and return Ok.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or another global
/// logger is already installed.
pub fn initialize(log_dir: &Path, settings: LoggerSettings) -> Result<(), CliError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = build_dispatch(log_dir, settings).and_then(|dispatch| {
            dispatch.apply().map_err(|e| CliError::Reflector {
                message: format!("Failed to initialize logger: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
        });
        if result.is_ok() {
            info!(
                "Logger initialized with level {:?}, console {}",
                settings.level,
                if settings.console { "on" } else { "off" }
            );
        }
    });

    result
}

/// Build the dispatch tree without installing it.
#[track_caller]
pub(crate) fn build_dispatch(
    log_dir: &Path,
    settings: LoggerSettings,
) -> Result<Dispatch, CliError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let log_file = fern::log_file(&log_file_path).map_err(|e| CliError::Reflector {
        message: format!("Failed to create log file {}: {e}", log_file_path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0)
            ))
        })
        .chain(log_file);

    let mut base_dispatch = QUIET_DEPENDENCIES
        .iter()
        .fold(Dispatch::new().level(settings.level), |dispatch, module| {
            dispatch.level_for(*module, LevelFilter::Info)
        })
        .chain(file_dispatch);

    if settings.console {
        let color_configuration = ColoredLevelConfig::new()
            .debug(Blue)
            .info(Green)
            .warn(Yellow)
            .error(Red)
            .trace(Magenta);

        // Console lines skip the call site; the file keeps it
        base_dispatch = base_dispatch.chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{level}] {message}",
                        level = color_configuration.color(record.level()),
                        message = message,
                    ))
                })
                .chain(stderr()),
        );
    }

    Ok(base_dispatch)
}
