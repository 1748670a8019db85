//! In-memory handler recording every record it receives.

use std::any::Any;
use std::sync::Arc;

use femtologging_caller::{CALLER_FIELD, FemtoHandlerTrait, FemtoLogRecord, HandlerError};
use parking_lot::Mutex;

#[derive(Clone, Default)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<FemtoLogRecord>>>,
}

impl CollectingHandler {
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
