/*
 * Sink writers and collaborator contracts
 *
 * This module defines the four logging destinations and the injectable
 * contracts for the external collaborators:
 * - ConsoleStyle: the terminal rendering helper (ANSI by default)
 * - ConsoleStream: the stdout/stderr pair (process streams by default)
 * - append_line: plain-text and JSON file appends with directory creation
 * - SyslogTransport: the system log daemon (Unix datagram by default)
 *
 * Every writer reports failures through LogError instead of panicking; the
 * dispatcher decides what to do with them.
 */

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::errors::{LogError, SinkKind};
use crate::level::Level;

/// The eight console colors the level table maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    fn ansi_code(self) -> u8 {
        match self {
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
            Color::White => 37,
        }
    }
}

/// The fixed level-to-color table. CRIT/ALERT/EMERG look counter-intuitive
/// but the mapping is inherited behavior and is preserved exactly.
pub fn level_color(level: Level) -> Color {
    match level {
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Notice => Color::Cyan,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
        Level::Crit => Color::White,
        Level::Alert => Color::Magenta,
        Level::Emerg => Color::Black,
    }
}

/// Terminal rendering contract for the console sink.
pub trait ConsoleStyle: Send + Sync {
    fn render(&self, text: &str, color: Color) -> String;
}

/// Default style: plain ANSI escape sequences.
pub struct AnsiStyle;

impl ConsoleStyle for AnsiStyle {
    fn render(&self, text: &str, color: Color) -> String {
        format!("\x1b[{}m{}\x1b[0m", color.ansi_code(), text)
    }
}

/// No-color style for dumb terminals and captured output.
pub struct PlainStyle;

impl ConsoleStyle for PlainStyle {
    fn render(&self, text: &str, _color: Color) -> String {
        text.to_string()
    }
}

/// Destination streams for the console sink. The default pair is the
/// process stdout/stderr; tests inject a recording pair instead. Writes
/// return the error rather than panicking, so a closed stream (a caller
/// piped to `head`) never aborts the calling program.
pub trait ConsoleStream: Send + Sync {
    fn write_out(&self, line: &str) -> io::Result<()>;
    fn write_err(&self, line: &str) -> io::Result<()>;
}

/// The process stdout/stderr pair.
pub struct ProcessStreams;

impl ConsoleStream for ProcessStreams {
    fn write_out(&self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", line)
    }

    fn write_err(&self, line: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", line)
    }
}

/// Records console lines in memory, split by stream. Clone the pair before
/// handing it to the logger and read the captured lines from the clone.
#[derive(Clone, Default)]
pub struct RecordingStreams {
    out: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    err: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl RecordingStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.out.lock().unwrap().clone()
    }

    pub fn stderr_lines(&self) -> Vec<String> {
        self.err.lock().unwrap().clone()
    }
}

impl ConsoleStream for RecordingStreams {
    fn write_out(&self, line: &str) -> io::Result<()> {
        self.out.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn write_err(&self, line: &str) -> io::Result<()> {
        self.err.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

/// Appends one line to `path`, creating the parent directory first.
pub fn append_line(path: &Path, line: &str, sink: SinkKind) -> Result<(), LogError> {
    let to_sink_error = |source: io::Error| LogError::SinkWrite { sink, source };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(to_sink_error)?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_sink_error)?;
    writeln!(file, "{}", line).map_err(to_sink_error)
}

/// One message handed to a syslog transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogMessage {
    pub priority: u8,
    pub tag: String,
    pub pid: u32,
    pub body: String,
}

impl SyslogMessage {
    /// RFC 3164 framing: `<priority>tag[pid]: body`.
    pub fn frame(&self) -> String {
        format!("<{}>{}[{}]: {}", self.priority, self.tag, self.pid, self.body)
    }
}

/// System log contract. The default implementation speaks to the local
/// daemon; tests inject a recording implementation instead.
pub trait SyslogTransport: Send + Sync {
    fn send(&self, message: &SyslogMessage) -> io::Result<()>;
}

/// Sends datagrams to the local syslog socket. A fresh unbound socket per
/// send keeps the call bounded and avoids holding a descriptor open for the
/// life of the logger.
#[cfg(unix)]
pub struct UnixDatagramSyslog;

#[cfg(unix)]
impl SyslogTransport for UnixDatagramSyslog {
    fn send(&self, message: &SyslogMessage) -> io::Result<()> {
        use std::os::unix::net::UnixDatagram;

        let socket = UnixDatagram::unbound()?;
        let frame = message.frame();
        let payload = frame.as_bytes();
        match socket.send_to(payload, "/dev/log") {
            Ok(_) => Ok(()),
            Err(_) => socket.send_to(payload, "/var/run/syslog").map(|_| ()),
        }
    }
}

/// Discards every message; the non-Unix default.
pub struct NullSyslog;

impl SyslogTransport for NullSyslog {
    fn send(&self, _message: &SyslogMessage) -> io::Result<()> {
        Ok(())
    }
}

/// Records every message in memory. Clone the transport before handing it to
/// the logger and read the captured messages from the clone.
#[derive(Clone, Default)]
pub struct RecordingSyslog {
    messages: std::sync::Arc<std::sync::Mutex<Vec<SyslogMessage>>>,
}

impl RecordingSyslog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SyslogMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl SyslogTransport for RecordingSyslog {
    fn send(&self, message: &SyslogMessage) -> io::Result<()> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}
