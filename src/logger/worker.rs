//! Background worker thread and queue management for the FemtoLogger.
//!
//! The worker accepts queued log records, dispatches them to handlers, and
//! coordinates graceful shutdown when the logger drops. Hooks have already
//! run on the emitting thread by the time a record reaches this queue.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use log::warn;

use crate::handler::FemtoHandlerTrait;
use crate::log_record::FemtoLogRecord;

/// Default capacity for the bounded channel feeding the worker thread.
pub(crate) const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Record queued for processing by the worker thread.
pub struct QueuedRecord {
    pub record: FemtoLogRecord,
    pub handlers: Vec<Arc<dyn FemtoHandlerTrait>>,
}

/// Handle to the worker thread and its communication channels.
pub(crate) struct WorkerParts {
    pub(crate) tx: Sender<QueuedRecord>,
    pub(crate) shutdown_tx: Sender<()>,
    pub(crate) handle: JoinHandle<()>,
}

/// Spawn the worker thread and return its communication primitives.
pub(crate) fn spawn_worker(capacity: usize) -> WorkerParts {
    let (tx, rx) = bounded::<QueuedRecord>(capacity);
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    let handle = thread::spawn(move || worker_thread_loop(rx, shutdown_rx));

    WorkerParts {
        tx,
        shutdown_tx,
        handle,
    }
}

/// Dispatch a single queued record to each of its handlers.
pub(crate) fn handle_log_record(job: QueuedRecord) {
    for h in &job.handlers {
        if let Err(err) = h.handle(job.record.clone()) {
            warn!("FemtoLogger: handler reported an error: {err}");
        }
    }
}

/// Drain any remaining records once a shutdown signal is received.
pub(crate) fn drain_remaining_records(rx: &Receiver<QueuedRecord>) {
    while let Ok(job) = rx.try_recv() {
        handle_log_record(job);
    }
}

/// Non-blocking check for a pending or disconnected shutdown channel.
fn should_shutdown_now(shutdown_rx: &Receiver<()>) -> bool {
    matches!(
        shutdown_rx.try_recv(),
        Ok(()) | Err(TryRecvError::Disconnected)
    )
}

/// Main loop executed by the logger's worker thread.
///
/// Every iteration first polls the shutdown channel without blocking, so a
/// saturated record channel cannot starve shutdown, then blocks in
/// `select!` on both channels. Queued records are drained before exit.
pub(crate) fn worker_thread_loop(rx: Receiver<QueuedRecord>, shutdown_rx: Receiver<()>) {
    loop {
        if should_shutdown_now(&shutdown_rx) {
            drain_remaining_records(&rx);
            break;
        }
        select! {
            recv(shutdown_rx) -> _ => {
                drain_remaining_records(&rx);
                break;
            },
            recv(rx) -> rec => match rec {
                Ok(job) => handle_log_record(job),
                Err(_) => break,
            },
        }
    }
}
