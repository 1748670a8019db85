//! JSON formatter emitting one object per record.
//!
//! The serialisable view borrows from the record so only the output string
//! is allocated. Structured fields are flattened into the top-level object
//! after the fixed keys.

use std::collections::BTreeMap;
use std::thread::ThreadId;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::FemtoFormatter;
use crate::log_record::FemtoLogRecord;

/// Formatter rendering records as single-line JSON objects.
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonFormatter;

struct JsonRecord<'a> {
    name: &'a str,
    levelname: &'static str,
    msg: &'a str,
    timestamp: SystemTime,
    filename: &'a str,
    lineno: u32,
    module: &'a str,
    thread_id: ThreadId,
    thread_name: Option<&'a str>,
    key_values: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a FemtoLogRecord> for JsonRecord<'a> {
    fn from(record: &'a FemtoLogRecord) -> Self {
        let metadata = record.metadata();
        Self {
            name: record.logger(),
            levelname: record.level_str(),
            msg: record.message(),
            timestamp: metadata.timestamp,
            filename: &metadata.filename,
            lineno: metadata.line_number,
            module: &metadata.module_path,
            thread_id: metadata.thread_id,
            thread_name: metadata.thread_name.as_deref(),
            key_values: &metadata.key_values,
        }
    }
}

impl JsonRecord<'_> {
    fn count_fields(&self) -> usize {
        9 + usize::from(self.thread_name.is_some()) + self.key_values.len()
    }
}

impl Serialize for JsonRecord<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let created = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map(|dur| dur.as_secs_f64())
            .unwrap_or_default();
        let asctime = DateTime::<Utc>::from(self.timestamp)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut map = serializer.serialize_map(Some(self.count_fields()))?;
        map.serialize_entry("name", self.name)?;
        map.serialize_entry("levelname", self.levelname)?;
        map.serialize_entry("msg", self.msg)?;
        map.serialize_entry("created", &created)?;
        map.serialize_entry("asctime", &asctime)?;
        map.serialize_entry("filename", self.filename)?;
        map.serialize_entry("lineno", &self.lineno)?;
        map.serialize_entry("module", self.module)?;
        map.serialize_entry("thread", &format_args!("{:?}", self.thread_id))?;
        if let Some(name) = self.thread_name {
            map.serialize_entry("threadName", name)?;
        }
        for (k, v) in self.key_values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl FemtoFormatter for JsonFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        match serde_json::to_string(&JsonRecord::from(record)) {
            Ok(json) => json,
            Err(err) => {
                warn!("JsonFormatter: failed to serialise record: {err}");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::FemtoLevel;
    use serde_json::Value;

    #[test]
    fn json_formatter_flattens_fields() {
        let record = FemtoLogRecord::new("api", FemtoLevel::Info, "served")
            .with_key_value("caller", "handler.rs:12(serve)");

        let value: Value =
            serde_json::from_str(&JsonFormatter.format(&record)).expect("valid JSON");

        assert_eq!(value["name"], "api");
        assert_eq!(value["levelname"], "INFO");
        assert_eq!(value["msg"], "served");
        assert_eq!(value["caller"], "handler.rs:12(serve)");
        assert!(value["created"].as_f64().is_some_and(|c| c > 0.0));
        assert!(value["asctime"].as_str().is_some_and(|t| t.ends_with('Z')));
    }
}
