//! The log record built once per dispatch.
//!
//! A record is immutable after construction and is never persisted as an
//! object; only its serialized forms (text line, JSON line, syslog message)
//! leave the process.

use chrono::Local;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::level::Level;

/// Ordered key/value pairs attached by a structured-data call.
///
/// A plain `Vec` rather than a map: insertion order must survive into the
/// JSON output, and duplicate keys are all emitted (a map type would
/// silently deduplicate).
#[derive(Debug, Clone, Default)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn push(&mut self, key: &str, value: &str) {
        self.0.push((key.to_string(), value.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for Fields {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One log record. Field order here is the order of the JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub timestamp_epoch: i64,
    pub level: Level,
    pub message: String,
    pub pid: u32,
    pub application: String,
    #[serde(skip_serializing_if = "Fields::is_empty")]
    pub data: Fields,
}

impl LogRecord {
    /// Builds a record stamped with the current local time.
    pub fn new(
        level: Level,
        message: &str,
        data: Fields,
        date_format: &str,
        application: &str,
    ) -> Self {
        let now = Local::now();
        LogRecord {
            timestamp: now.format(date_format).to_string(),
            timestamp_epoch: now.timestamp(),
            level,
            message: message.to_string(),
            pid: std::process::id(),
            application: application.to_string(),
            data,
        }
    }

    /// The plain-text representation shared by the console and file sinks.
    pub fn text_line(&self) -> String {
        format!("{} [{}] {}", self.timestamp, self.level, self.message)
    }

    /// The syslog body.
    pub fn syslog_line(&self) -> String {
        format!("{}: {}", self.level, self.message)
    }
}
