//! Process-wide logging: colored lines on stdout and plain lines in
//! `realsense-bridge.log`, both as `[<rfc3339> - <LEVEL>] <message> [<file>:<line>]`.

use crate::error::BridgeError;

use common::ErrorLocation;
use tracker_core::LOG_FILE_NAME;

use std::fmt::{Arguments, Display};
use std::fs::File;
use std::panic::Location;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339_millis;
use log::{LevelFilter, Record, info, warn};

/// Level the global logger was installed with. `None` until the first
/// successful [`initialize`].
static INSTALLED_LEVEL: Mutex<Option<LevelFilter>> = Mutex::new(None);

/// Install the global logger writing to stdout and `log_dir/realsense-bridge.log`.
///
/// The log file is opened on every call, so an unusable directory is always an
/// error. Once a logger is installed, later calls keep it and return Ok.
///
/// # Errors
///
/// Returns [`BridgeError::Bridge`] if the log file cannot be created or another
/// global logger is already set.
pub fn initialize(log_dir: &Path, level: LevelFilter) -> Result<(), BridgeError> {
    let log_file = open_log_file(log_dir)?;

    let mut installed = INSTALLED_LEVEL
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(current) = *installed {
        warn!("Logger already initialized at {current:?}, ignoring {level:?}");
        return Ok(());
    }

    dispatch(log_file, level)
        .apply()
        .map_err(|e| BridgeError::Bridge {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
    *installed = Some(level);
    drop(installed);

    info!(
        "Logging at {level:?} to stdout and {}",
        log_dir.join(LOG_FILE_NAME).display()
    );
    Ok(())
}

/// Level of the installed logger, if any.
pub fn installed_level() -> Option<LevelFilter> {
    *INSTALLED_LEVEL
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

#[track_caller]
fn open_log_file(log_dir: &Path) -> Result<File, BridgeError> {
    let path = log_dir.join(LOG_FILE_NAME);

    fern::log_file(&path).map_err(|e| BridgeError::Bridge {
        message: format!("Failed to create log file {}: {e}", path.display()),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn dispatch(log_file: File, level: LevelFilter) -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let console = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, colors.color(record.level()), message, record)
        })
        .chain(std::io::stdout());

    let file = Dispatch::new()
        .format(|out, message, record| write_line(out, record.level(), message, record))
        .chain(log_file);

    Dispatch::new().level(level).chain(console).chain(file)
}

fn write_line(
    out: FormatCallback<'_>,
    level: impl Display,
    message: &Arguments<'_>,
    record: &Record<'_>,
) {
    out.finish(format_args!(
        "[{} - {level}] {message} [{}:{}]",
        format_rfc3339_millis(SystemTime::now()),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
    ));
}
