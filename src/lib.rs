//! Caller annotation for the femtologging core.
//!
//! The crate provides a small asynchronous logging core ([`FemtoLogger`],
//! handlers and formatters) with synchronous record hooks, and the
//! [`CallerAnnotator`] hook that stamps every record with the application
//! call site that produced it.
//!
//! ```rust
//! use std::sync::Arc;
//! use femtologging_caller::{CallerAnnotator, FemtoLevel, FemtoLogger, FemtoStreamHandler};
//!
//! let logger = FemtoLogger::new("app".into());
//! logger.add_handler(Arc::new(FemtoStreamHandler::stderr()));
//! logger.add_hook(Arc::new(CallerAnnotator::new(FemtoLevel::Warn)));
//! logger.warn("disk almost full");
//! ```

pub mod caller;
pub mod file_config;
pub mod formatter;
pub mod frame_filter;
pub mod handler;
pub mod hooks;
pub mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
mod logger;
mod rate_limited_warner;
pub mod stack_frame;
mod stream_handler;
#[cfg(feature = "tracing-compat")]
pub mod tracing_compat;
pub mod traceback_frames;

#[cfg(test)]
mod test_utils;

pub use caller::{
    AnnotatorConfig, CALLER_FIELD, CallerAnnotator, CallerAnnotatorBuilder, DEFAULT_SKIP_FRAMES,
    DEFAULT_TRACE_DEPTH,
};
pub use file_config::{ConfigError, load_annotator_config, parse_annotator_config};
pub use formatter::{DefaultFormatter, FemtoFormatter, JsonFormatter, SharedFormatter};
pub use frame_filter::InternalFrames;
pub use handler::{FemtoHandlerTrait, HandlerError};
pub use hooks::{FemtoHook, HookBuildError, HookError, LevelHooks};
pub use level::{FemtoLevel, ParseLevelError};
#[cfg(feature = "log-compat")]
pub use log_compat::{FemtoLogAdapter, install_global_logger};
pub use log_record::{FemtoLogRecord, RecordMetadata};
pub use logger::{FemtoLogger, QueuedRecord};
pub use rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};
pub use stack_frame::StackFrame;
pub use stream_handler::FemtoStreamHandler;
#[cfg(feature = "tracing-compat")]
pub use tracing_compat::FemtoTracingLayer;
pub use traceback_frames::{BacktraceSource, FixedFrames, FrameSource, Frames};
