//! Log record representation for the femtologging core.
//!
//! This module defines the `FemtoLogRecord` struct that captures log events
//! along with their contextual metadata such as timestamps, source location,
//! thread information and structured key-value fields. Hooks receive a
//! mutable record and may add fields before the record is formatted.

use crate::level::FemtoLevel;
use std::collections::BTreeMap;
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the record.
    pub thread_id: ThreadId,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
    /// Structured key-value pairs attached to the record.
    pub key_values: BTreeMap<String, String>,
}

impl RecordMetadata {
    /// Capture timestamp and thread info from the current execution context.
    fn capture_runtime() -> (SystemTime, ThreadId, Option<String>) {
        let current = thread::current();
        (
            SystemTime::now(),
            current.id(),
            current.name().map(ToString::to_string),
        )
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let (timestamp, thread_id, thread_name) = Self::capture_runtime();
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp,
            thread_id,
            thread_name,
            key_values: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FemtoLogRecord {
    logger: String,
    level: FemtoLevel,
    message: String,
    metadata: RecordMetadata,
}

impl FemtoLogRecord {
    /// Construct a new log record from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: FemtoLevel, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata: RecordMetadata::default(),
        }
    }

    /// Construct a log record with explicit source location and key-values.
    ///
    /// Timestamp and thread information are always refreshed from the
    /// calling thread.
    pub fn with_metadata(
        logger: &str,
        level: FemtoLevel,
        message: &str,
        mut metadata: RecordMetadata,
    ) -> Self {
        let (timestamp, thread_id, thread_name) = RecordMetadata::capture_runtime();
        metadata.timestamp = timestamp;
        metadata.thread_id = thread_id;
        metadata.thread_name = thread_name;
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata,
        }
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> FemtoLevel {
        self.level
    }

    pub fn level_str(&self) -> &'static str {
        self.level.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    /// Structured fields attached by the caller or by hooks.
    pub fn key_values(&self) -> &BTreeMap<String, String> {
        &self.metadata.key_values
    }

    /// Look up a single structured field.
    pub fn key_value(&self, key: &str) -> Option<&str> {
        self.metadata.key_values.get(key).map(String::as_str)
    }

    /// Insert a structured field, returning the value it replaced.
    pub fn insert_key_value(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.metadata.key_values.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`insert_key_value`](Self::insert_key_value).
    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_key_value(key, value);
        self
    }
}

impl fmt::Display for FemtoLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
