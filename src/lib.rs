/*
 * Main library entry point that exposes the public API
 *
 * liblogfan fans one log call out to up to four sinks: console (colored,
 * stream-selected by severity), rotating plain-text file, rotating JSON
 * file, and the system log. The public surface is the Logger type plus the
 * configuration and collaborator contracts needed to construct one:
 * - Logger, with per-level convenience methods and the argv-style call
 * - LogConfig / SinkFlags / Facility for configuration
 * - Level and LogRecord for typed callers and hooks
 * - ConsoleStyle, SyslogTransport, JsonEncode for injected collaborators
 */

mod config;
mod errors;
mod json;
mod level;
mod logger;
mod outputs;
mod record;
mod rotation;

pub use config::{Facility, LogConfig, SinkFlags};
pub use errors::{LogError, SinkKind};
pub use json::{encoder_for, JsonEncode, LibraryEncoder, ManualEncoder, ManualEscaping};
pub use level::Level;
pub use logger::Logger;
pub use outputs::{
    level_color, AnsiStyle, Color, ConsoleStream, ConsoleStyle, NullSyslog, PlainStyle,
    ProcessStreams, RecordingStreams, RecordingSyslog, SyslogMessage, SyslogTransport,
};
#[cfg(unix)]
pub use outputs::UnixDatagramSyslog;
pub use record::{Fields, LogRecord};
pub use rotation::{maybe_rotate, RotationOutcome};
