/*
 * The Logger: dispatcher over the configured sinks
 *
 * One call runs one pass: resolve the level, build the record, gate the
 * backends on the global debug flag, rotate before file writes, encode for
 * the JSON sink, and fan out. Each sink is independent; one sink's failure
 * is reported through the forced console notice and never prevents the
 * remaining sinks from being attempted, and never aborts the caller.
 *
 * Configuration is held per instance behind an RwLock; several
 * independently configured Loggers can coexist in one process.
 */

use std::path::Path;
use std::sync::RwLock;

use crate::config::{LogConfig, SinkFlags};
use crate::errors::{LogError, SinkKind};
use crate::json::{encoder_for, JsonEncode, ManualEscaping};
use crate::level::Level;
use crate::outputs::{
    append_line, level_color, AnsiStyle, Color, ConsoleStream, ConsoleStyle, ProcessStreams,
    SyslogMessage, SyslogTransport,
};
use crate::record::{Fields, LogRecord};
use crate::rotation::{maybe_rotate, RotationOutcome};

type FatalHook = Box<dyn Fn(&LogRecord) + Send + Sync>;
type TraceHook = Box<dyn Fn(&str) + Send + Sync>;

/// A multi-sink logger.
pub struct Logger {
    config: RwLock<LogConfig>,
    style: Box<dyn ConsoleStyle>,
    streams: Box<dyn ConsoleStream>,
    syslog: Box<dyn SyslogTransport>,
    encoder: Box<dyn JsonEncode>,
    on_fatal: RwLock<Option<FatalHook>>,
    trace_hook: RwLock<Option<TraceHook>>,
}

impl Logger {
    /// Creates a logger with the default collaborators: ANSI console
    /// rendering, the platform syslog transport, and the serde_json encoder.
    pub fn new(config: LogConfig) -> Self {
        #[cfg(unix)]
        let syslog: Box<dyn SyslogTransport> = Box::new(crate::outputs::UnixDatagramSyslog);
        #[cfg(not(unix))]
        let syslog: Box<dyn SyslogTransport> = Box::new(crate::outputs::NullSyslog);

        Self::with_collaborators(
            config,
            Box::new(AnsiStyle),
            Box::new(ProcessStreams),
            syslog,
            encoder_for(true, ManualEscaping::default()),
        )
    }

    /// Creates a logger with explicitly injected collaborators.
    pub fn with_collaborators(
        config: LogConfig,
        style: Box<dyn ConsoleStyle>,
        streams: Box<dyn ConsoleStream>,
        syslog: Box<dyn SyslogTransport>,
        encoder: Box<dyn JsonEncode>,
    ) -> Self {
        Logger {
            config: RwLock::new(config),
            style,
            streams,
            syslog,
            encoder,
            on_fatal: RwLock::new(None),
            trace_hook: RwLock::new(None),
        }
    }

    /// Logs one message. An unrecognized level name is reported and degraded
    /// to ERROR; the record is still emitted.
    pub fn log(&self, level: &str, message: &str) {
        self.log_with(level, message, &[]);
    }

    /// Logs one message with structured key/value data. The pairs are
    /// attached to the JSON representation only; the text, console, and
    /// syslog forms are identical to the plain call.
    pub fn log_with(&self, level: &str, message: &str, pairs: &[(&str, &str)]) {
        let (resolved, invalid) = Level::resolve(level);
        if invalid {
            self.report_failure(&LogError::InvalidLevel {
                name: level.to_string(),
            });
        }
        self.dispatch(resolved, message, Fields::from_pairs(pairs));
    }

    /// Typed fast path for callers that already hold a `Level`.
    pub fn log_at(&self, level: Level, message: &str) {
        self.dispatch(level, message, Fields::new());
    }

    /// Argv-style entry point: `[level, message, k1, v1, ...]`. The only
    /// call that can fail: fewer than two elements is `InvalidUsage`,
    /// reported and returned, with no sink touched. An odd trailing key is
    /// paired with an empty value.
    pub fn log_argv(&self, args: &[&str]) -> Result<(), LogError> {
        if args.len() < 2 {
            let err = LogError::InvalidUsage { got: args.len() };
            self.report_failure(&err);
            return Err(err);
        }
        let mut fields = Fields::new();
        let mut rest = args[2..].iter();
        while let Some(key) = rest.next() {
            let value = rest.next().copied().unwrap_or("");
            fields.push(key, value);
        }
        let (resolved, invalid) = Level::resolve(args[0]);
        if invalid {
            self.report_failure(&LogError::InvalidLevel {
                name: args[0].to_string(),
            });
        }
        self.dispatch(resolved, args[1], fields);
        Ok(())
    }

    pub fn emerg(&self, message: &str) {
        self.log_at(Level::Emerg, message);
    }

    pub fn alert(&self, message: &str) {
        self.log_at(Level::Alert, message);
    }

    pub fn crit(&self, message: &str) {
        self.log_at(Level::Crit, message);
    }

    pub fn error(&self, message: &str) {
        self.log_at(Level::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log_at(Level::Warn, message);
    }

    pub fn notice(&self, message: &str) {
        self.log_at(Level::Notice, message);
    }

    pub fn info(&self, message: &str) {
        self.log_at(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log_at(Level::Debug, message);
    }

    pub fn emerg_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Emerg, message, Fields::from_pairs(pairs));
    }

    pub fn alert_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Alert, message, Fields::from_pairs(pairs));
    }

    pub fn crit_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Crit, message, Fields::from_pairs(pairs));
    }

    pub fn error_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Error, message, Fields::from_pairs(pairs));
    }

    pub fn warn_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Warn, message, Fields::from_pairs(pairs));
    }

    pub fn notice_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Notice, message, Fields::from_pairs(pairs));
    }

    pub fn info_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Info, message, Fields::from_pairs(pairs));
    }

    pub fn debug_with(&self, message: &str, pairs: &[(&str, &str)]) {
        self.dispatch(Level::Debug, message, Fields::from_pairs(pairs));
    }

    /// Flips the four per-sink enabled flags at runtime, leaving the rest of
    /// the configuration alone.
    pub fn reconfigure(&self, flags: SinkFlags) {
        let mut config = self.config.write().unwrap();
        config.apply_sink_flags(flags);
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> LogConfig {
        self.config.read().unwrap().clone()
    }

    /// Installs the callback invoked after console emission when a record
    /// resolves to ERROR while the debug flag is set.
    pub fn set_on_fatal<F>(&self, hook: F)
    where
        F: Fn(&LogRecord) + Send + Sync + 'static,
    {
        *self.on_fatal.write().unwrap() = Some(Box::new(hook));
    }

    /// Installs the host-driven instrumentation hook. It only fires through
    /// [`trace`](Self::trace) when the debug flag is 2 or higher.
    pub fn set_trace_hook<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.trace_hook.write().unwrap() = Some(Box::new(hook));
    }

    /// Reports an operation to the trace hook, if armed (debug >= 2).
    pub fn trace(&self, op: &str) {
        if self.config.read().unwrap().debug < 2 {
            return;
        }
        if let Some(hook) = self.trace_hook.read().unwrap().as_ref() {
            hook(op);
        }
    }

    /// One pass over the sinks for one record.
    fn dispatch(&self, level: Level, message: &str, data: Fields) {
        let config = self.config.read().unwrap().clone();
        let record = LogRecord::new(
            level,
            message,
            data,
            &config.date_format,
            &config.application,
        );
        let severity = level.severity();

        // DEBUG records stay off the backends unless the debug flag is set;
        // the console is gated separately below.
        let emit_backends = config.debug > 0 || severity < Level::Debug.severity();
        if emit_backends {
            if config.syslog_enabled {
                let message = SyslogMessage {
                    priority: config.facility.code() * 8 + severity,
                    tag: config.syslog_tag.clone(),
                    pid: record.pid,
                    body: record.syslog_line(),
                };
                if let Err(source) = self.syslog.send(&message) {
                    self.report_failure(&LogError::SinkWrite {
                        sink: SinkKind::Syslog,
                        source,
                    });
                }
            }
            if config.file_enabled {
                self.rotate_before_write(&config.file_path, config.rotate_bytes);
                if let Err(err) = append_line(&config.file_path, &record.text_line(), SinkKind::File)
                {
                    self.report_failure(&err);
                }
            }
            if config.json_enabled {
                self.rotate_before_write(&config.json_path, config.rotate_bytes);
                match self.encoder.encode(&record) {
                    Ok(json) => {
                        if let Err(err) = append_line(&config.json_path, &json, SinkKind::JsonFile) {
                            self.report_failure(&err);
                        }
                    }
                    Err(source) => self.report_failure(&LogError::SinkWrite {
                        sink: SinkKind::JsonFile,
                        source,
                    }),
                }
            }
        }

        if config.console_enabled
            && (severity <= config.console_level.severity()
                || (config.debug > 0 && level == Level::Debug))
        {
            let line = self.style.render(&record.text_line(), level_color(level));
            // ERROR and above go to the error stream.
            let result = if severity <= Level::Error.severity() {
                self.streams.write_err(&line)
            } else {
                self.streams.write_out(&line)
            };
            if let Err(source) = result {
                self.report_failure(&LogError::SinkWrite {
                    sink: SinkKind::Console,
                    source,
                });
            }
        }

        if level == Level::Error && config.debug > 0 {
            if let Some(hook) = self.on_fatal.read().unwrap().as_ref() {
                hook(&record);
            }
        }
    }

    /// Runs the rotation check for one file sink. A rotation emits an
    /// informational record back through the dispatcher; a rename failure is
    /// reported and the write continues against the file still in place.
    fn rotate_before_write(&self, path: &Path, threshold_bytes: u64) {
        match maybe_rotate(path, threshold_bytes) {
            Ok(RotationOutcome::NotNeeded) => {}
            Ok(RotationOutcome::Rotated(rotated)) => {
                self.dispatch(
                    Level::Info,
                    &format!("rotated {} to {}", path.display(), rotated.display()),
                    Fields::new(),
                );
            }
            Err(err) => self.report_failure(&err),
        }
    }

    /// The forced exception notice: rendered in red straight to the error
    /// stream, ignoring the console enabled flag and threshold. A failing
    /// notice has nowhere left to go and is discarded; logging failures must
    /// never abort the caller.
    fn report_failure(&self, err: &LogError) {
        let line = self.style.render(&format!("logfan: {}", err), Color::Red);
        let _ = self.streams.write_err(&line);
    }
}
