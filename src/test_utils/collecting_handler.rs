//! A handler that accumulates records in memory for test assertions.

use crate::caller::CALLER_FIELD;
use crate::handler::{FemtoHandlerTrait, HandlerError};
use crate::log_record::FemtoLogRecord;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

/// Handler that stores every record it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<FemtoLogRecord>>>,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all records received so far.
    pub fn collected(&self) -> Vec<FemtoLogRecord> {
        self.records.lock().clone()
    }

    /// The `caller` field of every record received, in arrival order.
    pub fn callers(&self) -> Vec<Option<String>> {
        self.records
            .lock()
            .iter()
            .map(|r| r.key_value(CALLER_FIELD).map(str::to_owned))
            .collect()
    }
}

impl FemtoHandlerTrait for CollectingHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
