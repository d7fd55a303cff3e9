//! Filesystem helpers: output directory naming and creation, file checks.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Prefix of the per-run output directory.
pub const OUTPUT_DIR_PREFIX: &str = "out_";

/// Name of the output directory for a run started at `now`,
/// e.g. `out_2024_03_09_14_05_59`.
pub fn output_dir_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}{}", OUTPUT_DIR_PREFIX, now.format("%Y_%m_%d_%H_%M_%S"))
}

/// Whether `path` exists. Errors other than "not found" are returned.
pub fn has_dir(path: impl AsRef<Path>) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Outcome of [`create_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    AlreadyExists,
    Failed(String),
}

/// Create `path` if it does not exist yet.
///
/// Never fails: the outcome is logged and returned. Writes into a directory
/// that could not be created fail later, per job.
pub fn create_dir(path: impl AsRef<Path>) -> DirStatus {
    let path = path.as_ref();
    match has_dir(path) {
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not inspect output directory");
            DirStatus::Failed(e.to_string())
        }
        Ok(true) => {
            info!(path = %path.display(), "output directory already exists");
            DirStatus::AlreadyExists
        }
        Ok(false) => match std::fs::create_dir(path) {
            Ok(()) => {
                info!(path = %path.display(), "created output directory");
                DirStatus::Created
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to create output directory");
                DirStatus::Failed(e.to_string())
            }
        },
    }
}

/// True if `path` exists and is not a directory.
pub fn is_file(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path)
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}
