//! End-to-end caller annotation against the real call stack.
//!
//! These tests rely on debug information, which the default test profile
//! provides.

use std::sync::Arc;
use std::thread;

use femtologging_caller::{
    CALLER_FIELD, CallerAnnotator, FemtoHandlerTrait, FemtoHook, FemtoLevel, FemtoLogRecord,
    FemtoLogger, InternalFrames,
};
use rstest::{fixture, rstest};

mod test_utils;
use test_utils::CollectingHandler;

struct Harness {
    logger: FemtoLogger,
    handler: Arc<CollectingHandler>,
}

impl Harness {
    fn records(&self) -> Vec<FemtoLogRecord> {
        assert!(self.logger.flush_handlers(), "flush should drain the queue");
        self.handler.collected()
    }

    fn handler_callers(&self) -> Vec<Option<String>> {
        assert!(self.logger.flush_handlers(), "flush should drain the queue");
        self.handler.callers()
    }
}

#[fixture]
fn harness() -> Harness {
    let logger = FemtoLogger::new("e2e".into());
    logger.set_level(FemtoLevel::Trace);
    let handler = Arc::new(CollectingHandler::default());
    logger.add_handler(handler.clone() as Arc<dyn FemtoHandlerTrait>);
    Harness { logger, handler }
}

#[inline(never)]
fn checkout_handler(logger: &FemtoLogger) -> (u32, Option<String>) {
    (line!(), logger.info("checkout started"))
}

#[inline(never)]
fn billing_worker(logger: &FemtoLogger) -> (u32, Option<String>) {
    (line!(), logger.log(FemtoLevel::Error, "card declined"))
}

#[inline(never)]
fn shipping_worker(logger: &FemtoLogger) -> (u32, Option<String>) {
    (line!(), logger.log(FemtoLevel::Error, "address missing"))
}

#[rstest]
fn annotates_with_application_call_site(harness: Harness) {
    harness
        .logger
        .add_hook(Arc::new(CallerAnnotator::new(FemtoLevel::Info)));

    let (line, formatted) = checkout_handler(&harness.logger);

    let expected = format!("caller_tests.rs:{line}(checkout_handler)");
    assert_eq!(
        formatted.as_deref(),
        Some(format!("e2e [INFO] checkout started caller={expected}").as_str())
    );
    let records = harness.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key_value(CALLER_FIELD), Some(expected.as_str()));
}

#[rstest]
fn levels_below_minimum_are_not_annotated(harness: Harness) {
    harness
        .logger
        .add_hook(Arc::new(CallerAnnotator::new(FemtoLevel::Warn)));

    checkout_handler(&harness.logger);
    let (line, _) = billing_worker(&harness.logger);

    assert_eq!(
        harness.handler_callers(),
        vec![None, Some(format!("caller_tests.rs:{line}(billing_worker)"))]
    );
}

#[rstest]
fn unshortened_paths_are_relative_to_source_root(harness: Harness) {
    let annotator = CallerAnnotator::builder(FemtoLevel::Trace)
        .shorten_paths(false)
        .source_root(env!("CARGO_MANIFEST_DIR"))
        .build()
        .expect("valid config");
    harness.logger.add_hook(Arc::new(annotator));

    let (line, _) = checkout_handler(&harness.logger);

    let records = harness.records();
    let caller = records[0].key_value(CALLER_FIELD).expect("caller recorded");
    let file = format!("tests{}caller_tests.rs", std::path::MAIN_SEPARATOR);
    assert_eq!(caller, format!("{file}:{line}(checkout_handler)"));
}

#[rstest]
fn treating_every_frame_as_application_code_reports_the_pipeline(harness: Harness) {
    let annotator = CallerAnnotator::builder(FemtoLevel::Trace)
        .internal_frames(InternalFrames::none())
        .build()
        .expect("valid config");
    harness.logger.add_hook(Arc::new(annotator));

    checkout_handler(&harness.logger);

    let records = harness.records();
    let caller = records[0].key_value(CALLER_FIELD).expect("caller recorded");
    assert!(
        !caller.ends_with("(checkout_handler)"),
        "innermost frame should belong to the unwinder, got {caller}"
    );
}

#[rstest]
fn too_shallow_depth_leaves_record_unannotated(harness: Harness) {
    let annotator = CallerAnnotator::builder(FemtoLevel::Trace)
        .depth(1)
        .build()
        .expect("valid config");
    harness.logger.add_hook(Arc::new(annotator));

    let (_, formatted) = checkout_handler(&harness.logger);

    assert_eq!(formatted.as_deref(), Some("e2e [INFO] checkout started"));
    assert_eq!(harness.handler_callers(), vec![None]);
}

#[test]
fn annotator_fired_directly_reports_its_caller() {
    let annotator = CallerAnnotator::new(FemtoLevel::Trace);
    let mut record = FemtoLogRecord::new("direct", FemtoLevel::Info, "m");

    let (line, result) = (line!(), annotator.fire(&mut record));

    assert!(result.is_ok());
    let caller = record.key_value(CALLER_FIELD).expect("caller recorded");
    assert!(
        caller.starts_with(&format!("caller_tests.rs:{line}(")),
        "unexpected caller {caller}"
    );
}

#[rstest]
fn concurrent_threads_see_their_own_call_sites(harness: Harness) {
    harness
        .logger
        .add_hook(Arc::new(CallerAnnotator::new(FemtoLevel::Error)));
    let logger = Arc::new(harness.logger);

    let billing = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || (0..50).map(|_| billing_worker(&logger)).collect::<Vec<_>>())
    };
    let shipping = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || (0..50).map(|_| shipping_worker(&logger)).collect::<Vec<_>>())
    };

    for (worker, function) in [(billing, "billing_worker"), (shipping, "shipping_worker")] {
        for (line, formatted) in worker.join().expect("worker thread panicked") {
            let formatted = formatted.expect("ERROR passes the threshold");
            let expected = format!("caller=caller_tests.rs:{line}({function})");
            assert!(formatted.ends_with(&expected), "{formatted} != {expected}");
        }
    }

    assert!(logger.flush_handlers());
    let records = harness.handler.collected();
    assert_eq!(records.len(), 100);
    for record in records {
        let caller = record.key_value(CALLER_FIELD).expect("caller recorded");
        let expected_fn = match record.message() {
            "card declined" => "(billing_worker)",
            _ => "(shipping_worker)",
        };
        assert!(caller.ends_with(expected_fn), "{caller} for {}", record.message());
    }
}
