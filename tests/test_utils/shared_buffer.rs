//! Shared buffer utilities for handler tests.
//!
//! Provides a thread-safe byte buffer that stream handlers can write to
//! while the test keeps a handle for reading the output back.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Thread-safe wrapper around a byte buffer used by stream handlers.
///
/// The inner `Arc<Mutex<Vec<u8>>>` is kept private so tests can't
/// accidentally bypass the `Write` implementation or mutate the buffer
/// without locking.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// Return the buffer contents decoded as UTF-8.
    pub fn output(&self) -> String {
        String::from_utf8(self.buffer.lock().expect("SharedBuf mutex poisoned").clone())
            .expect("Buffer contains invalid UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .expect("SharedBuf mutex poisoned")
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buffer
            .lock()
            .expect("SharedBuf mutex poisoned")
            .flush()
    }
}
