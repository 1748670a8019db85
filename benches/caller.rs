//! Benchmarks for the caller annotation path.
//!
//! `fixed_frames` isolates the filtering and formatting cost; `backtrace`
//! adds capture and symbol resolution on the real stack.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use femtologging_caller::{
    CallerAnnotator, FemtoLevel, FemtoLogRecord, FemtoLogger, FixedFrames, StackFrame,
};

fn pipeline_stack() -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = (0..12)
        .map(|i| {
            StackFrame::new(
                "/work/femtologging_caller/src/logger/mod.rs",
                100 + i,
                "femtologging_caller::logger::FemtoLogger::log_record",
            )
        })
        .collect();
    frames.push(StackFrame::new(
        "/srv/app/service/handler.rs",
        42,
        "app::service::Handler::process",
    ));
    frames
}

fn caller_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("caller");

    let fixed = CallerAnnotator::builder(FemtoLevel::Info)
        .frame_source(Arc::new(FixedFrames::new(pipeline_stack())))
        .build()
        .expect("valid config");
    group.bench_function("annotate_fixed_frames", |b| {
        b.iter(|| {
            let mut record = FemtoLogRecord::new("bench", FemtoLevel::Info, "hello");
            fixed.annotate(&mut record);
            black_box(record)
        });
    });

    let live = CallerAnnotator::new(FemtoLevel::Info);
    group.bench_function("annotate_backtrace", |b| {
        b.iter(|| {
            let mut record = FemtoLogRecord::new("bench", FemtoLevel::Info, "hello");
            live.annotate(&mut record);
            black_box(record)
        });
    });

    let logger = FemtoLogger::new("bench".into());
    group.bench_function("logger_info_without_hook", |b| {
        b.iter(|| black_box(logger.info("hello")));
    });
    logger.add_hook(Arc::new(CallerAnnotator::new(FemtoLevel::Info)));
    group.bench_function("logger_info_with_annotator", |b| {
        b.iter(|| black_box(logger.info("hello")));
    });

    group.finish();
}

criterion_group!(benches, caller_benchmarks);
criterion_main!(benches);
