//! Error types for the logging facility.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Names a logging destination in failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    File,
    JsonFile,
    Syslog,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkKind::Console => "console",
            SinkKind::File => "file",
            SinkKind::JsonFile => "json-file",
            SinkKind::Syslog => "syslog",
        };
        write!(f, "{}", name)
    }
}

/// Failure conditions of the logging engine.
///
/// Only `InvalidUsage` is ever returned to the caller; the other conditions
/// are degraded or reported through the forced console notice so a logging
/// failure never aborts the calling program.
#[derive(Debug, Error)]
pub enum LogError {
    /// Too few arguments for the argv-style call: nothing is emitted.
    #[error("usage: log <level> <message> [key value]... (got {got} argument(s))")]
    InvalidUsage { got: usize },

    /// Unrecognized level name: the record is degraded to ERROR and emitted.
    #[error("unknown log level: {name}")]
    InvalidLevel { name: String },

    /// A sink write (or the JSON encode feeding it) failed.
    #[error("{sink} sink write failed: {source}")]
    SinkWrite {
        sink: SinkKind,
        #[source]
        source: std::io::Error,
    },

    /// Renaming an oversized log file aside failed; the write continues
    /// against the file still at the original path.
    #[error("rotation of {} failed: {source}", path.display())]
    Rotation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
