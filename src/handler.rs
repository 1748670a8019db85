//! Handler trait implemented by every record sink.

use std::any::Any;

use thiserror::Error;

use crate::log_record::FemtoLogRecord;

/// Errors a handler may report back to the logger's worker thread.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler's queue is full or its worker has stopped.
    #[error("handler queue unavailable: {0}")]
    QueueUnavailable(String),
    /// Writing the formatted record failed.
    #[error("handler I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait implemented by all log handlers.
///
/// Handlers are shared between the logger and its worker thread, so they
/// must be `Send + Sync`.
pub trait FemtoHandlerTrait: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError>;

    /// Flush pending output. Returns `true` on success.
    fn flush(&self) -> bool {
        true
    }

    /// Expose the concrete handler for downcasting in tests and removal.
    fn as_any(&self) -> &dyn Any;
}
