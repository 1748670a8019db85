//! Compatibility bridge for the Rust `log` crate.
//!
//! [`FemtoLogAdapter`] implements `log::Log` and forwards records from the
//! `log` macros into a [`FemtoLogger`]. Hooks registered on the logger fire
//! on the emitting thread as usual, so a [`CallerAnnotator`] attached to it
//! reports the call site of the `log::info!` invocation, not the adapter.
//!
//! This crate reports its own diagnostics through `log`. Records targeting
//! this crate are therefore ignored by the adapter so a failing handler
//! cannot feed back into itself.
//!
//! [`CallerAnnotator`]: crate::CallerAnnotator

use std::sync::Arc;

use log::{Metadata, Record};

use crate::level::FemtoLevel;
use crate::log_record::{FemtoLogRecord, RecordMetadata};
use crate::logger::FemtoLogger;

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

impl From<log::Level> for FemtoLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => FemtoLevel::Trace,
            log::Level::Debug => FemtoLevel::Debug,
            log::Level::Info => FemtoLevel::Info,
            log::Level::Warn => FemtoLevel::Warn,
            log::Level::Error => FemtoLevel::Error,
        }
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Adapter implementing the Rust `log::Log` trait on top of a
/// [`FemtoLogger`].
pub struct FemtoLogAdapter {
    logger: Arc<FemtoLogger>,
}

impl FemtoLogAdapter {
    pub fn new(logger: Arc<FemtoLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<FemtoLogger> {
        &self.logger
    }
}

impl log::Log for FemtoLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !is_own_target(metadata.target())
            && self
                .logger
                .is_enabled_for(FemtoLevel::from(metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_string(),
            filename: record.file().unwrap_or_default().to_string(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };

        self.logger.dispatch_record(FemtoLogRecord::with_metadata(
            self.logger.name(),
            FemtoLevel::from(record.level()),
            &record.args().to_string(),
            metadata,
        ));
    }

    fn flush(&self) {
        self.logger.flush_handlers();
    }
}

/// Install `logger` as the destination of the global `log` facade.
///
/// Fails when another global logger is already set.
pub fn install_global_logger(logger: Arc<FemtoLogger>) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(FemtoLogAdapter::new(logger)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
