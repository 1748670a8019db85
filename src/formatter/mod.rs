//! Formatter implementations.
//!
//! Provides the core [`FemtoFormatter`] trait alongside helpers for
//! dynamically dispatched trait objects. Formatters run after hooks, so
//! structured fields such as `caller` are visible to them.

use std::{fmt, sync::Arc};

use crate::log_record::FemtoLogRecord;

mod json;

pub use json::JsonFormatter;

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared across threads in a logging system.
pub trait FemtoFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &FemtoLogRecord) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn FemtoFormatter + Send + Sync>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: FemtoFormatter + Send + Sync + 'static,
    {
        let inner: Arc<dyn FemtoFormatter + Send + Sync> = Arc::new(formatter);
        Self { inner }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn FemtoFormatter + Send + Sync>) -> Self {
        Self { inner }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &FemtoLogRecord) -> String {
        self.inner.format(record)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn FemtoFormatter>)")
    }
}

/// `name [LEVEL] message`, followed by ` key=value` for every structured
/// field in key order.
#[derive(Copy, Clone, Debug)]
pub struct DefaultFormatter;

impl FemtoFormatter for DefaultFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        let mut output = format!(
            "{} [{}] {}",
            record.logger(),
            record.level_str(),
            record.message()
        );
        for (key, value) in record.key_values() {
            output.push(' ');
            output.push_str(key);
            output.push('=');
            output.push_str(value);
        }
        output
    }
}

impl FemtoFormatter for Arc<dyn FemtoFormatter + Send + Sync> {
    fn format(&self, record: &FemtoLogRecord) -> String {
        (**self).format(record)
    }
}

impl FemtoFormatter for SharedFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        self.inner.format(record)
    }
}
