//! Bridge from `tracing` events to a [`FemtoLogger`].
//!
//! [`FemtoTracingLayer`] is a `tracing_subscriber` layer. Each event becomes
//! a [`FemtoLogRecord`]: the `message` field is the record message and every
//! other field is stored as a structured key-value pair. Spans are ignored.
//! Events are dispatched synchronously on the emitting thread, so hooks on
//! the logger see the stack of the `tracing` macro call site.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::level::FemtoLevel;
use crate::log_record::{FemtoLogRecord, RecordMetadata};
use crate::logger::FemtoLogger;

const MESSAGE_FIELD: &str = "message";

impl From<Level> for FemtoLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => FemtoLevel::Trace,
            Level::DEBUG => FemtoLevel::Debug,
            Level::INFO => FemtoLevel::Info,
            Level::WARN => FemtoLevel::Warn,
            Level::ERROR => FemtoLevel::Error,
        }
    }
}

/// Collects an event's fields into a message and key-value pairs.
#[derive(Default)]
struct EventVisitor {
    message: String,
    metadata: RecordMetadata,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE_FIELD {
            self.message = value.to_owned();
        } else {
            self.metadata
                .key_values
                .insert(field.name().to_owned(), value.to_owned());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            self.message = format!("{value:?}");
        } else {
            self.metadata
                .key_values
                .insert(field.name().to_owned(), format!("{value:?}"));
        }
    }
}

/// Layer forwarding `tracing` events to a [`FemtoLogger`].
pub struct FemtoTracingLayer {
    logger: Arc<FemtoLogger>,
}

impl FemtoTracingLayer {
    pub fn new(logger: Arc<FemtoLogger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for FemtoTracingLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = FemtoLevel::from(*meta.level());
        if !self.logger.is_enabled_for(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        let EventVisitor {
            message,
            mut metadata,
        } = visitor;
        metadata.module_path = meta.module_path().unwrap_or_default().to_owned();
        metadata.filename = meta.file().unwrap_or_default().to_owned();
        metadata.line_number = meta.line().unwrap_or(0);

        self.logger.dispatch_record(FemtoLogRecord::with_metadata(
            self.logger.name(),
            level,
            &message,
            metadata,
        ));
    }
}
