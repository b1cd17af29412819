/*
 * Configuration for the logging engine
 *
 * This module handles:
 * - The LogConfig struct holding per-sink enabled flags and parameters
 * - Defaults derived from the invoking program's name under the temp dir
 * - Construction from environment variables (through an injectable lookup)
 * - Construction from a TOML file with a [logging] section
 * - The SinkFlags struct used by the runtime reconfiguration call
 * - The syslog Facility enum with its RFC 3164 codes
 */

use std::env;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Name of the invoking program, used for default paths and the syslog tag.
static PROGRAM_NAME: Lazy<String> = Lazy::new(|| {
    env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "logfan".to_string())
});

/// Syslog facilities with their RFC 3164 codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Facility {
    Kern,
    User,
    Mail,
    Daemon,
    Auth,
    Syslog,
    Lpr,
    News,
    Uucp,
    Cron,
    AuthPriv,
    Ftp,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl Facility {
    pub fn code(self) -> u8 {
        match self {
            Facility::Kern => 0,
            Facility::User => 1,
            Facility::Mail => 2,
            Facility::Daemon => 3,
            Facility::Auth => 4,
            Facility::Syslog => 5,
            Facility::Lpr => 6,
            Facility::News => 7,
            Facility::Uucp => 8,
            Facility::Cron => 9,
            Facility::AuthPriv => 10,
            Facility::Ftp => 11,
            Facility::Local0 => 16,
            Facility::Local1 => 17,
            Facility::Local2 => 18,
            Facility::Local3 => 19,
            Facility::Local4 => 20,
            Facility::Local5 => 21,
            Facility::Local6 => 22,
            Facility::Local7 => 23,
        }
    }

    /// Parses a facility name, case-insensitively. Unknown names yield `None`
    /// so the caller can fall back to the default rather than abort.
    pub fn from_name(name: &str) -> Option<Facility> {
        match name.to_lowercase().as_str() {
            "kern" => Some(Facility::Kern),
            "user" => Some(Facility::User),
            "mail" => Some(Facility::Mail),
            "daemon" => Some(Facility::Daemon),
            "auth" => Some(Facility::Auth),
            "syslog" => Some(Facility::Syslog),
            "lpr" => Some(Facility::Lpr),
            "news" => Some(Facility::News),
            "uucp" => Some(Facility::Uucp),
            "cron" => Some(Facility::Cron),
            "authpriv" => Some(Facility::AuthPriv),
            "ftp" => Some(Facility::Ftp),
            "local0" => Some(Facility::Local0),
            "local1" => Some(Facility::Local1),
            "local2" => Some(Facility::Local2),
            "local3" => Some(Facility::Local3),
            "local4" => Some(Facility::Local4),
            "local5" => Some(Facility::Local5),
            "local6" => Some(Facility::Local6),
            "local7" => Some(Facility::Local7),
            _ => None,
        }
    }
}

// Separate implementation of Deserialize to handle case-insensitive values
impl<'de> Deserialize<'de> for Facility {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Facility::from_name(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown syslog facility: {}", s))
        })
    }
}

/// The four per-sink enabled flags, for the reconfiguration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkFlags {
    pub console: bool,
    pub file: bool,
    pub json: bool,
    pub syslog: bool,
}

impl Default for SinkFlags {
    fn default() -> Self {
        SinkFlags {
            console: true,
            file: false,
            json: false,
            syslog: false,
        }
    }
}

/// Configuration for one `Logger` instance.
///
/// Read once at construction; updated only through
/// [`reconfigure`](crate::Logger::reconfigure); read on every log call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// strftime format for the record timestamp
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Console sink enabled (default on)
    #[serde(default = "default_console_enabled")]
    pub console_enabled: bool,

    /// Plain-text file sink enabled
    #[serde(default)]
    pub file_enabled: bool,

    /// JSON file sink enabled
    #[serde(default)]
    pub json_enabled: bool,

    /// Syslog sink enabled
    #[serde(default)]
    pub syslog_enabled: bool,

    /// Path of the plain-text log file
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,

    /// Path of the JSON log file
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,

    /// Minimum level for console emission
    #[serde(default = "default_console_level")]
    pub console_level: Level,

    /// Syslog tag (default: program name)
    #[serde(default = "default_syslog_tag")]
    pub syslog_tag: String,

    /// Syslog facility
    #[serde(default = "default_facility")]
    pub facility: Facility,

    /// Rotation size threshold in bytes
    #[serde(default = "default_rotate_bytes")]
    pub rotate_bytes: u64,

    /// Debug flag: 0 = normal, 1 = DEBUG records reach the backends and the
    /// on-fatal hook is armed, >= 2 = the trace hook fires as well
    #[serde(default)]
    pub debug: u8,

    /// Application name stamped into every record (default: program name)
    #[serde(default = "default_application")]
    pub application: String,
}

fn default_date_format() -> String {
    "%F %T".to_string()
}

fn default_console_enabled() -> bool {
    true
}

fn default_file_path() -> PathBuf {
    env::temp_dir().join(format!("{}.log", PROGRAM_NAME.as_str()))
}

fn default_json_path() -> PathBuf {
    env::temp_dir().join(format!("{}.json", PROGRAM_NAME.as_str()))
}

fn default_console_level() -> Level {
    Level::Info
}

fn default_syslog_tag() -> String {
    PROGRAM_NAME.clone()
}

fn default_facility() -> Facility {
    Facility::Local0
}

fn default_rotate_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_application() -> String {
    PROGRAM_NAME.clone()
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            date_format: default_date_format(),
            console_enabled: default_console_enabled(),
            file_enabled: false,
            json_enabled: false,
            syslog_enabled: false,
            file_path: default_file_path(),
            json_path: default_json_path(),
            console_level: default_console_level(),
            syslog_tag: default_syslog_tag(),
            facility: default_facility(),
            rotate_bytes: default_rotate_bytes(),
            debug: 0,
            application: default_application(),
        }
    }
}

/// Configuration wrapper to handle the [logging] section in TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigWrapper {
    logging: LogConfig,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl LogConfig {
    /// Create configuration from the process environment (`LOGFAN_*`
    /// variables). Unset variables keep their defaults; malformed values
    /// fall back to the default rather than abort.
    pub fn from_env() -> Self {
        Self::from_env_with(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading through the supplied
    /// lookup, so tests can provide a synthetic environment.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LogConfig::default();
        if let Some(v) = lookup("LOGFAN_DATE_FORMAT") {
            config.date_format = v;
        }
        if let Some(v) = lookup("LOGFAN_CONSOLE") {
            config.console_enabled = parse_bool(&v);
        }
        if let Some(v) = lookup("LOGFAN_FILE") {
            config.file_enabled = parse_bool(&v);
        }
        if let Some(v) = lookup("LOGFAN_JSON") {
            config.json_enabled = parse_bool(&v);
        }
        if let Some(v) = lookup("LOGFAN_SYSLOG") {
            config.syslog_enabled = parse_bool(&v);
        }
        if let Some(v) = lookup("LOGFAN_LOGFILE") {
            config.file_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOGFAN_JSONFILE") {
            config.json_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOGFAN_LEVEL") {
            if let Ok(level) = Level::from_name(&v) {
                config.console_level = level;
            }
        }
        if let Some(v) = lookup("LOGFAN_TAG") {
            config.syslog_tag = v;
        }
        if let Some(v) = lookup("LOGFAN_FACILITY") {
            if let Some(facility) = Facility::from_name(&v) {
                config.facility = facility;
            }
        }
        if let Some(v) = lookup("LOGFAN_ROTATE_BYTES") {
            if let Ok(bytes) = v.parse() {
                config.rotate_bytes = bytes;
            }
        }
        if let Some(v) = lookup("LOGFAN_DEBUG") {
            if let Ok(flag) = v.parse() {
                config.debug = flag;
            }
        }
        config
    }

    /// Create configuration from a TOML file with a `[logging]` section.
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn from_file(file_path: &str) -> Result<Self, String> {
        let config_str = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(_) => return Ok(LogConfig::default()),
        };

        // Try the [logging] section wrapper first, then a bare LogConfig
        match toml::from_str::<ConfigWrapper>(&config_str) {
            Ok(wrapper) => Ok(wrapper.logging),
            Err(e) => match toml::from_str::<LogConfig>(&config_str) {
                Ok(config) => Ok(config),
                Err(_) => Err(format!("Failed to parse config file: {}", e)),
            },
        }
    }

    /// Applies the four sink-enabled flags, leaving everything else alone.
    pub fn apply_sink_flags(&mut self, flags: SinkFlags) {
        self.console_enabled = flags.console;
        self.file_enabled = flags.file;
        self.json_enabled = flags.json;
        self.syslog_enabled = flags.syslog;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = LogConfig::default();
        assert!(config.console_enabled);
        assert!(!config.file_enabled);
        assert!(!config.json_enabled);
        assert!(!config.syslog_enabled);
        assert_eq!(config.console_level, Level::Info);
        assert_eq!(config.facility, Facility::Local0);
        assert_eq!(config.rotate_bytes, 5 * 1024 * 1024);
        assert_eq!(config.debug, 0);
        assert_eq!(config.date_format, "%F %T");
    }

    #[test]
    fn env_lookup_overrides_defaults() {
        let mut vars = HashMap::new();
        vars.insert("LOGFAN_FILE", "yes");
        vars.insert("LOGFAN_CONSOLE", "0");
        vars.insert("LOGFAN_LOGFILE", "/var/log/app.log");
        vars.insert("LOGFAN_LEVEL", "debug");
        vars.insert("LOGFAN_FACILITY", "daemon");
        vars.insert("LOGFAN_ROTATE_BYTES", "1024");
        vars.insert("LOGFAN_DEBUG", "2");
        let config = LogConfig::from_env_with(|name| vars.get(name).map(|v| v.to_string()));
        assert!(config.file_enabled);
        assert!(!config.console_enabled);
        assert_eq!(config.file_path, PathBuf::from("/var/log/app.log"));
        assert_eq!(config.console_level, Level::Debug);
        assert_eq!(config.facility, Facility::Daemon);
        assert_eq!(config.rotate_bytes, 1024);
        assert_eq!(config.debug, 2);
    }

    #[test]
    fn malformed_env_values_keep_defaults() {
        let mut vars = HashMap::new();
        vars.insert("LOGFAN_LEVEL", "loud");
        vars.insert("LOGFAN_FACILITY", "local9");
        vars.insert("LOGFAN_ROTATE_BYTES", "lots");
        let config = LogConfig::from_env_with(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.console_level, Level::Info);
        assert_eq!(config.facility, Facility::Local0);
        assert_eq!(config.rotate_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn from_file_reads_the_logging_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[logging]\nfile_enabled = true\nconsole_level = \"warn\"\nfacility = \"local3\"\nrotate_bytes = 2048"
        )
        .unwrap();
        let config = LogConfig::from_file(path.to_str().unwrap()).unwrap();
        assert!(config.file_enabled);
        assert_eq!(config.console_level, Level::Warn);
        assert_eq!(config.facility, Facility::Local3);
        assert_eq!(config.rotate_bytes, 2048);
    }

    #[test]
    fn from_file_tolerates_a_missing_file() {
        let config = LogConfig::from_file("/no/such/config.toml").unwrap();
        assert!(config.console_enabled);
    }

    #[test]
    fn sink_flags_touch_only_the_four_flags() {
        let mut config = LogConfig::default();
        config.rotate_bytes = 99;
        config.apply_sink_flags(SinkFlags {
            console: false,
            file: true,
            json: true,
            syslog: false,
        });
        assert!(!config.console_enabled);
        assert!(config.file_enabled);
        assert!(config.json_enabled);
        assert_eq!(config.rotate_bytes, 99);
    }

    #[test]
    fn facility_codes() {
        assert_eq!(Facility::Kern.code(), 0);
        assert_eq!(Facility::Local0.code(), 16);
        assert_eq!(Facility::Local7.code(), 23);
        assert_eq!(Facility::from_name("LOCAL5"), Some(Facility::Local5));
        assert_eq!(Facility::from_name("bogus"), None);
    }
}
