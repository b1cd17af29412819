/*
 * JSON record encoding
 *
 * Two interchangeable strategies behind the JsonEncode trait:
 * - LibraryEncoder: serde_json, full escaping, numbers as numbers
 * - ManualEncoder: hand-assembled object for when the JSON library is not
 *   part of the deployment; historically it only escaped double quotes
 *
 * The strategy is chosen once at Logger construction from an injected
 * capability flag; there is no per-call re-probing.
 */

use std::io;

use crate::record::LogRecord;

/// Encodes one record as a single JSON object (no trailing newline).
pub trait JsonEncode: Send + Sync {
    fn encode(&self, record: &LogRecord) -> io::Result<String>;
}

/// serde_json-backed strategy.
pub struct LibraryEncoder;

impl JsonEncode for LibraryEncoder {
    fn encode(&self, record: &LogRecord) -> io::Result<String> {
        serde_json::to_string(record).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

/// How much the manual strategy escapes.
///
/// `QuotesOnly` reproduces the historical behavior: `"` becomes `\"` in the
/// message and in each data value, and nothing else — embedded newlines,
/// control characters, and backslashes pass through unescaped, which can
/// produce invalid JSON. `Full` closes that gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManualEscaping {
    #[default]
    QuotesOnly,
    Full,
}

/// Hand-assembled strategy for when serde_json is unavailable.
pub struct ManualEncoder {
    escaping: ManualEscaping,
}

impl ManualEncoder {
    pub fn new(escaping: ManualEscaping) -> Self {
        ManualEncoder { escaping }
    }

    fn escape(&self, text: &str) -> String {
        match self.escaping {
            ManualEscaping::QuotesOnly => text.replace('"', "\\\""),
            ManualEscaping::Full => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        c if (c as u32) < 0x20 => {
                            out.push_str(&format!("\\u{:04x}", c as u32));
                        }
                        c => out.push(c),
                    }
                }
                out
            }
        }
    }
}

impl JsonEncode for ManualEncoder {
    fn encode(&self, record: &LogRecord) -> io::Result<String> {
        let mut json = format!(
            "{{\"timestamp\":\"{}\",\"timestamp_epoch\":{},\"level\":\"{}\",\"message\":\"{}\",\"pid\":{},\"application\":\"{}\"",
            record.timestamp,
            record.timestamp_epoch,
            record.level,
            self.escape(&record.message),
            record.pid,
            record.application,
        );
        if !record.data.is_empty() {
            json.push_str(",\"data\":{");
            let mut first = true;
            for (key, value) in record.data.iter() {
                if !first {
                    json.push(',');
                }
                first = false;
                // Historically only values were escaped; Full covers the
                // keys as well.
                let key = match self.escaping {
                    ManualEscaping::QuotesOnly => key.to_string(),
                    ManualEscaping::Full => self.escape(key),
                };
                json.push_str(&format!("\"{}\":\"{}\"", key, self.escape(value)));
            }
            json.push('}');
        }
        json.push('}');
        Ok(json)
    }
}

/// Selects the strategy from the capability flag, once at construction.
pub fn encoder_for(json_library_available: bool, escaping: ManualEscaping) -> Box<dyn JsonEncode> {
    if json_library_available {
        Box::new(LibraryEncoder)
    } else {
        Box::new(ManualEncoder::new(escaping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::Fields;
    use serde_json::Value;

    fn record(message: &str, data: Fields) -> LogRecord {
        LogRecord::new(Level::Warn, message, data, "%F %T", "testapp")
    }

    #[test]
    fn both_strategies_escape_quotes() {
        let rec = record("He said \"hi\"", Fields::new());
        for encoder in [
            Box::new(LibraryEncoder) as Box<dyn JsonEncode>,
            Box::new(ManualEncoder::new(ManualEscaping::QuotesOnly)),
        ] {
            let json = encoder.encode(&rec).unwrap();
            let parsed: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed["message"], "He said \"hi\"");
        }
    }

    #[test]
    fn numeric_fields_are_bare_numbers() {
        let rec = record("x", Fields::new());
        for encoder in [
            Box::new(LibraryEncoder) as Box<dyn JsonEncode>,
            Box::new(ManualEncoder::new(ManualEscaping::QuotesOnly)),
        ] {
            let json = encoder.encode(&rec).unwrap();
            let parsed: Value = serde_json::from_str(&json).unwrap();
            assert!(parsed["timestamp_epoch"].is_i64());
            assert!(parsed["pid"].is_u64());
            assert_eq!(parsed["level"], "WARN");
            assert_eq!(parsed["application"], "testapp");
        }
    }

    #[test]
    fn data_object_preserves_order() {
        let rec = record("x", Fields::from_pairs(&[("user", "alice"), ("ip", "1.2.3.4")]));
        for encoder in [
            Box::new(LibraryEncoder) as Box<dyn JsonEncode>,
            Box::new(ManualEncoder::new(ManualEscaping::QuotesOnly)),
        ] {
            let json = encoder.encode(&rec).unwrap();
            let user = json.find("\"user\":\"alice\"").unwrap();
            let ip = json.find("\"ip\":\"1.2.3.4\"").unwrap();
            assert!(user < ip);
        }
    }

    #[test]
    fn quotes_only_mode_leaves_newlines_unescaped() {
        // The historical fidelity gap: the output is not valid JSON.
        let rec = record("line one\nline two", Fields::new());
        let json = ManualEncoder::new(ManualEscaping::QuotesOnly)
            .encode(&rec)
            .unwrap();
        assert!(json.contains("line one\nline two"));
        assert!(serde_json::from_str::<Value>(&json).is_err());
    }

    #[test]
    fn full_mode_escapes_data_keys_too() {
        let rec = record("x", Fields::from_pairs(&[("qu\"ote", "v1")]));
        let json = ManualEncoder::new(ManualEscaping::Full).encode(&rec).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["data"]["qu\"ote"], "v1");
        // The historical mode leaves keys raw, which is not valid JSON.
        let json = ManualEncoder::new(ManualEscaping::QuotesOnly)
            .encode(&rec)
            .unwrap();
        assert!(serde_json::from_str::<Value>(&json).is_err());
    }

    #[test]
    fn full_mode_closes_the_escaping_gap() {
        let rec = record("line one\nback\\slash\t\"q\"", Fields::new());
        let json = ManualEncoder::new(ManualEscaping::Full).encode(&rec).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["message"], "line one\nback\\slash\t\"q\"");
    }

    #[test]
    fn encoder_for_selects_by_capability() {
        let rec = record("plain", Fields::new());
        let library = encoder_for(true, ManualEscaping::QuotesOnly);
        let manual = encoder_for(false, ManualEscaping::QuotesOnly);
        let a: Value = serde_json::from_str(&library.encode(&rec).unwrap()).unwrap();
        let b: Value = serde_json::from_str(&manual.encode(&rec).unwrap()).unwrap();
        assert_eq!(a["message"], b["message"]);
        assert_eq!(a["level"], b["level"]);
    }
}
