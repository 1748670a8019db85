use std::sync::Arc;
use std::thread;

use femtologging_caller::{
    DefaultFormatter, FemtoHandlerTrait, FemtoLevel, FemtoLogRecord, FemtoStreamHandler,
    JsonFormatter,
};
use rstest::rstest;

mod test_utils;
use test_utils::SharedBuf;

#[rstest]
fn stream_handler_writes_to_buffer() {
    let buffer = SharedBuf::default();
    let handler = FemtoStreamHandler::new(buffer.clone(), DefaultFormatter);
    let record = FemtoLogRecord::new("core", FemtoLevel::Info, "hello")
        .with_key_value("caller", "main.rs:3(main)");
    handler.handle(record).expect("queue accepts the record");
    drop(handler);

    assert_eq!(buffer.output(), "core [INFO] hello caller=main.rs:3(main)\n");
}

#[rstest]
fn flush_waits_for_queued_records() {
    let buffer = SharedBuf::default();
    let handler = FemtoStreamHandler::new(buffer.clone(), DefaultFormatter);
    for i in 0..10 {
        handler
            .handle(FemtoLogRecord::new("core", FemtoLevel::Debug, &format!("m{i}")))
            .expect("queue accepts the record");
    }

    assert!(handler.flush());
    assert_eq!(buffer.output().lines().count(), 10);
}

#[rstest]
fn json_lines_carry_structured_fields() {
    let buffer = SharedBuf::default();
    let handler = FemtoStreamHandler::new(buffer.clone(), JsonFormatter);
    let record = FemtoLogRecord::new("svc", FemtoLevel::Error, "boom")
        .with_key_value("caller", "svc.rs:9(run)");
    handler.handle(record).expect("queue accepts the record");
    assert!(handler.flush());

    let output = buffer.output();
    let value: serde_json::Value =
        serde_json::from_str(output.trim_end()).expect("one JSON object per line");
    assert_eq!(value["levelname"], "ERROR");
    assert_eq!(value["caller"], "svc.rs:9(run)");
}

#[rstest]
fn handler_is_shared_across_threads() {
    let buffer = SharedBuf::default();
    let handler = Arc::new(FemtoStreamHandler::new(buffer.clone(), DefaultFormatter));

    let workers: Vec<_> = (0..4)
        .map(|t| {
            let handler = Arc::clone(&handler);
            thread::spawn(move || {
                for i in 0..25 {
                    handler
                        .handle(FemtoLogRecord::new("mt", FemtoLevel::Info, &format!("{t}-{i}")))
                        .expect("queue accepts the record");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker thread panicked");
    }

    assert!(handler.flush());
    assert_eq!(buffer.output().lines().count(), 100);
}
