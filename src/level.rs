//! Severity levels per RFC 5424: 0 (most severe) through 7 (least severe).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LogError;

/// The eight log levels, ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Emerg,
    Alert,
    Crit,
    Error,
    Warn,
    Notice,
    Info,
    Debug,
}

// Serialized as the canonical upper-case name, matching the sink formats
impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

// Separate implementation of Deserialize to handle case-insensitive values
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Level::from_name(&s).map_err(|_| {
            serde::de::Error::unknown_variant(
                &s,
                &[
                    "emerg", "alert", "crit", "error", "warn", "notice", "info", "debug",
                ],
            )
        })
    }
}

impl Level {
    /// Numeric severity, 0 = EMERG through 7 = DEBUG.
    pub fn severity(self) -> u8 {
        match self {
            Level::Emerg => 0,
            Level::Alert => 1,
            Level::Crit => 2,
            Level::Error => 3,
            Level::Warn => 4,
            Level::Notice => 5,
            Level::Info => 6,
            Level::Debug => 7,
        }
    }

    /// Upper-case canonical name, as it appears in every sink format.
    pub fn name(self) -> &'static str {
        match self {
            Level::Emerg => "EMERG",
            Level::Alert => "ALERT",
            Level::Crit => "CRIT",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Notice => "NOTICE",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Level, LogError> {
        match name.to_lowercase().as_str() {
            "emerg" => Ok(Level::Emerg),
            "alert" => Ok(Level::Alert),
            "crit" => Ok(Level::Crit),
            "error" => Ok(Level::Error),
            "warn" => Ok(Level::Warn),
            "notice" => Ok(Level::Notice),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            _ => Err(LogError::InvalidLevel {
                name: name.to_string(),
            }),
        }
    }

    /// Lossy resolution for the dispatcher: an unrecognized name degrades to
    /// ERROR rather than aborting, so malformed call sites still produce a
    /// visible log line. The flag marks whether the input was invalid.
    pub fn resolve(name: &str) -> (Level, bool) {
        match Level::from_name(name) {
            Ok(level) => (level, false),
            Err(_) => (Level::Error, true),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_table_is_fixed() {
        let table = [
            ("emerg", 0, "EMERG"),
            ("alert", 1, "ALERT"),
            ("crit", 2, "CRIT"),
            ("error", 3, "ERROR"),
            ("warn", 4, "WARN"),
            ("notice", 5, "NOTICE"),
            ("info", 6, "INFO"),
            ("debug", 7, "DEBUG"),
        ];
        for (name, severity, canonical) in table {
            let level = Level::from_name(name).unwrap();
            assert_eq!(level.severity(), severity);
            assert_eq!(level.name(), canonical);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(Level::from_name("WARN").unwrap(), Level::Warn);
        assert_eq!(Level::from_name("Notice").unwrap(), Level::Notice);
        assert_eq!(Level::from_name("dEbUg").unwrap(), Level::Debug);
    }

    #[test]
    fn unknown_name_resolves_to_error() {
        let (level, invalid) = Level::resolve("verbose");
        assert_eq!(level, Level::Error);
        assert_eq!(level.severity(), 3);
        assert!(invalid);

        let (level, invalid) = Level::resolve("warn");
        assert_eq!(level, Level::Warn);
        assert!(!invalid);
    }

    #[test]
    fn deserializes_from_config_strings() {
        let level: Level = serde_json::from_str("\"NOTICE\"").unwrap();
        assert_eq!(level, Level::Notice);
        assert!(serde_json::from_str::<Level>("\"loud\"").is_err());
    }

    #[test]
    fn serializes_as_canonical_name() {
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"WARN\"");
    }
}
