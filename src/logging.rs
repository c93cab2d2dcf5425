//! File-backed `tracing` setup.
//!
//! The terminal is in raw mode while the app runs, so log lines go to a file
//! in the data directory instead of stderr.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "lat-prep.log";

/// Filter override, in `EnvFilter` syntax.
pub const LOG_ENV_VAR: &str = "LAT_PREP_LOG";

/// Installs the global subscriber. Returns the log file path.
///
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init(data_dir: &Path, default_filter: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(path)
}
