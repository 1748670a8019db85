//! Stream-based logging handler implementation.
//!
//! This module defines `FemtoStreamHandler`, which formats log records and
//! writes them to a stream on a background thread. The handler forwards
//! records over a bounded channel so the producer never blocks on I/O.

use std::{
    any::Any,
    io::{self, Write},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::warn;

use crate::handler::{FemtoHandlerTrait, HandlerError};
use crate::{
    formatter::{DefaultFormatter, FemtoFormatter},
    log_record::FemtoLogRecord,
};

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

enum StreamCommand {
    Record(FemtoLogRecord),
    Flush(Sender<bool>),
}

/// Handler that writes formatted log records to an `io::Write` stream.
///
/// Each instance owns a background thread which receives records via a
/// channel and writes them to the provided stream. The writer and formatter
/// are moved into that thread so the caller never locks or blocks.
pub struct FemtoStreamHandler {
    tx: Option<Sender<StreamCommand>>,
    handle: Option<JoinHandle<()>>,
    done_rx: Receiver<()>,
}

impl FemtoStreamHandler {
    /// Create a new handler writing to `stdout` with a `DefaultFormatter`.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), DefaultFormatter)
    }

    /// Create a new handler writing to `stderr` with a `DefaultFormatter`.
    pub fn stderr() -> Self {
        Self::new(io::stderr(), DefaultFormatter)
    }

    /// Create a new handler from an arbitrary writer and formatter using the default capacity.
    pub fn new<W, F>(writer: W, formatter: F) -> Self
    where
        W: Write + Send + 'static,
        F: FemtoFormatter + Send + 'static,
    {
        Self::with_capacity(writer, formatter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new handler with a custom channel capacity.
    pub fn with_capacity<W, F>(writer: W, formatter: F, capacity: usize) -> Self
    where
        W: Write + Send + 'static,
        F: FemtoFormatter + Send + 'static,
    {
        let (tx, rx) = bounded(capacity);
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::spawn(move || {
            Self::worker_loop(writer, formatter, rx);
            let _ = done_tx.send(());
        });

        Self {
            tx: Some(tx),
            handle: Some(handle),
            done_rx,
        }
    }

    fn worker_loop<W, F>(mut writer: W, formatter: F, rx: Receiver<StreamCommand>)
    where
        W: Write,
        F: FemtoFormatter,
    {
        for command in rx {
            match command {
                StreamCommand::Record(record) => {
                    let msg = formatter.format(&record);
                    if writeln!(writer, "{msg}").and_then(|_| writer.flush()).is_err() {
                        warn!("FemtoStreamHandler write error");
                    }
                }
                StreamCommand::Flush(ack) => {
                    let _ = ack.send(writer.flush().is_ok());
                }
            }
        }
    }
}

impl FemtoHandlerTrait for FemtoStreamHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        let Some(tx) = &self.tx else {
            return Err(HandlerError::QueueUnavailable("handler closed".into()));
        };
        tx.try_send(StreamCommand::Record(record)).map_err(|_| {
            HandlerError::QueueUnavailable("queue full or shutting down".into())
        })
    }

    /// Wait until every record queued so far has been written and flushed.
    fn flush(&self) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(StreamCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv_timeout(FLUSH_TIMEOUT).unwrap_or(false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for FemtoStreamHandler {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if self.done_rx.recv_timeout(SHUTDOWN_TIMEOUT).is_err() {
                warn!("FemtoStreamHandler: worker thread did not shut down within 1s");
                // Detach the thread so shutdown continues
                return;
            }
            if handle.join().is_err() {
                warn!("FemtoStreamHandler: worker thread panicked");
            }
        }
    }
}
