//! Core logger implementation.
//!
//! This module provides the [`FemtoLogger`] struct which handles level
//! filtering, hook firing, formatting, and asynchronous output via a
//! background thread.
//!
//! Emission is split between two threads. On the emitting thread the logger
//! checks its threshold, fires the [`LevelHooks`] registered for the
//! record's level with mutable access to the record, and formats it. The
//! finished record is then queued for the worker thread, which hands it to
//! every handler.

mod convenience_methods;
mod worker;

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded};
use log::warn;
use parking_lot::{Mutex, RwLock};

use crate::handler::{FemtoHandlerTrait, HandlerError};
use crate::hooks::{FemtoHook, LevelHooks};
use crate::rate_limited_warner::RateLimitedWarner;
use crate::{
    formatter::{DefaultFormatter, FemtoFormatter, SharedFormatter},
    level::FemtoLevel,
    log_record::{FemtoLogRecord, RecordMetadata},
};

pub use worker::QueuedRecord;
use worker::{DEFAULT_CHANNEL_CAPACITY, WorkerParts, spawn_worker};

const LOGGER_FLUSH_TIMEOUT_MS: u64 = 2_000;

/// Handler used internally to acknowledge logger flush operations.
struct FlushAckHandler {
    ack: Sender<()>,
}

impl FemtoHandlerTrait for FlushAckHandler {
    fn handle(&self, _record: FemtoLogRecord) -> Result<(), HandlerError> {
        let _ = self.ack.send(());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Named logger dispatching records to hooks and handlers.
pub struct FemtoLogger {
    /// Identifier used to distinguish log messages from different loggers.
    name: String,
    formatter: RwLock<SharedFormatter>,
    level: AtomicU8,
    /// Copy-on-write so hooks run without holding the registry lock.
    hooks: RwLock<Arc<LevelHooks>>,
    handlers: RwLock<Vec<Arc<dyn FemtoHandlerTrait>>>,
    dropped_records: AtomicU64,
    drop_warner: RateLimitedWarner,
    tx: Option<Sender<QueuedRecord>>,
    shutdown_tx: Option<Sender<()>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl FemtoLogger {
    /// Create a new logger with the given name and the default queue size.
    pub fn new(name: String) -> Self {
        Self::with_capacity(name, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a logger whose handler queue holds at most `capacity` records.
    pub fn with_capacity(name: String, capacity: usize) -> Self {
        let WorkerParts {
            tx,
            shutdown_tx,
            handle,
        } = spawn_worker(capacity);

        Self {
            name,
            formatter: RwLock::new(SharedFormatter::new(DefaultFormatter)),
            level: AtomicU8::new(u8::from(FemtoLevel::Info)),
            hooks: RwLock::new(Arc::new(LevelHooks::new())),
            handlers: RwLock::new(Vec::new()),
            dropped_records: AtomicU64::new(0),
            drop_warner: RateLimitedWarner::default(),
            tx: Some(tx),
            shutdown_tx: Some(shutdown_tx),
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Log a message at the given level.
    ///
    /// Returns `Some(formatted_message)` if the record passed the level
    /// threshold, or `None` if it was filtered out.
    pub fn log(&self, level: FemtoLevel, message: &str) -> Option<String> {
        if !self.is_enabled_for(level) {
            return None;
        }
        self.log_record(FemtoLogRecord::new(&self.name, level, message))
    }

    /// Log a message with explicit source location and structured fields.
    pub fn log_with_metadata(
        &self,
        level: FemtoLevel,
        message: &str,
        metadata: RecordMetadata,
    ) -> Option<String> {
        if !self.is_enabled_for(level) {
            return None;
        }
        self.log_record(FemtoLogRecord::with_metadata(
            &self.name, level, message, metadata,
        ))
    }

    /// Dispatch an already-constructed record through this logger.
    ///
    /// The record is checked against the logger's threshold, passed through
    /// the hooks and enqueued for handler processing.
    pub fn dispatch_record(&self, record: FemtoLogRecord) {
        let _ = self.log_record(record);
    }

    /// Core logging path shared by every entry point.
    fn log_record(&self, mut record: FemtoLogRecord) -> Option<String> {
        if !self.is_enabled_for(record.level()) {
            return None;
        }
        let hooks = Arc::clone(&self.hooks.read());
        hooks.fire(&mut record);
        let msg = self.formatter.read().format(&record);
        self.send_to_handlers(record);
        Some(msg)
    }

    /// Return whether `level` passes this logger's threshold.
    pub fn is_enabled_for(&self, level: FemtoLevel) -> bool {
        u8::from(level) >= self.level.load(Ordering::Relaxed)
    }

    /// Update the logger's minimum level.
    pub fn set_level(&self, level: FemtoLevel) {
        self.level.store(u8::from(level), Ordering::Relaxed);
    }

    /// Return the logger's current minimum level.
    pub fn get_level(&self) -> FemtoLevel {
        FemtoLevel::from(self.level.load(Ordering::Relaxed))
    }

    /// Replace the formatter used for the value returned by [`log`](Self::log).
    pub fn set_formatter<F>(&self, formatter: F)
    where
        F: FemtoFormatter + Send + Sync + 'static,
    {
        *self.formatter.write() = SharedFormatter::new(formatter);
    }

    /// Register a hook for the levels it advertises.
    pub fn add_hook(&self, hook: Arc<dyn FemtoHook>) {
        Arc::make_mut(&mut self.hooks.write()).add(hook);
    }

    /// Unregister a hook previously added with [`add_hook`](Self::add_hook).
    pub fn remove_hook(&self, hook: &Arc<dyn FemtoHook>) -> bool {
        Arc::make_mut(&mut self.hooks.write()).remove(hook)
    }

    pub fn clear_hooks(&self) {
        *self.hooks.write() = Arc::new(LevelHooks::new());
    }

    /// Attach a handler to this logger.
    pub fn add_handler(&self, handler: Arc<dyn FemtoHandlerTrait>) {
        self.handlers.write().push(handler);
    }

    /// Detach a handler previously added to this logger.
    pub fn remove_handler(&self, handler: &Arc<dyn FemtoHandlerTrait>) -> bool {
        let mut handlers = self.handlers.write();
        if let Some(pos) = handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            handlers.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove all handlers from this logger.
    ///
    /// Records already queued keep the handler set captured when they were
    /// enqueued.
    pub fn clear_handlers(&self) {
        self.handlers.write().clear();
    }

    /// Return the number of records dropped due to a full queue.
    pub fn get_dropped(&self) -> u64 {
        self.dropped_records.load(Ordering::Relaxed)
    }

    /// Wait up to two seconds for the worker to drain its queue, then flush
    /// every handler. Returns `true` when both steps succeed.
    pub fn flush_handlers(&self) -> bool {
        self.wait_for_worker_idle() && self.handlers.read().iter().all(|h| h.flush())
    }

    fn send_to_handlers(&self, record: FemtoLogRecord) {
        let Some(tx) = &self.tx else {
            return;
        };
        let handlers = self.handlers.read().clone();
        if handlers.is_empty() {
            return;
        }
        if tx.try_send(QueuedRecord { record, handlers }).is_ok() {
            return;
        }
        self.dropped_records.fetch_add(1, Ordering::Relaxed);
        self.drop_warner.record_drop();
        self.drop_warner.warn_if_due(|count| {
            warn!("FemtoLogger: dropped {count} records; queue full or shutting down");
        });
    }

    fn wait_for_worker_idle(&self) -> bool {
        let Some(tx) = &self.tx else {
            return true;
        };
        let (ack_tx, ack_rx) = bounded(1);
        let ack_handler: Arc<dyn FemtoHandlerTrait> = Arc::new(FlushAckHandler { ack: ack_tx });
        let record = FemtoLogRecord::new("__femtologging__", FemtoLevel::Info, "__flush__");
        if tx
            .send(QueuedRecord {
                record,
                handlers: vec![ack_handler],
            })
            .is_err()
        {
            return false;
        }
        ack_rx
            .recv_timeout(Duration::from_millis(LOGGER_FLUSH_TIMEOUT_MS))
            .is_ok()
    }

    #[cfg(test)]
    fn handler_ptrs_for_test(&self) -> Vec<usize> {
        self.handlers
            .read()
            .iter()
            .map(|h| Arc::as_ptr(h) as *const () as usize)
            .collect()
    }
}

impl Drop for FemtoLogger {
    fn drop(&mut self) {
        self.drop_warner.flush(|count| {
            warn!("FemtoLogger: dropped {count} records; queue full or shutting down");
        });
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        self.tx.take();
        // Drop the lock before joining the worker thread.
        let handle = { self.handle.lock().take() };
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            warn!("FemtoLogger: worker thread panicked");
        }
    }
}
