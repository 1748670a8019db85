//! Caller annotation hook.
//!
//! [`CallerAnnotator`] is a [`FemtoHook`] that records where in application
//! code a log call originated. When fired it captures a bounded slice of
//! the emitting thread's stack, steps over every frame that belongs to the
//! logging pipeline, and stores the first remaining frame under the
//! [`CALLER_FIELD`] key as `file:line(function)`.
//!
//! Annotation never fails: an empty stack, a stack made only of logging
//! frames, or frames without debug information all leave the record
//! untouched, and the hook still reports success.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use femtologging_caller::{CallerAnnotator, FemtoLevel, FemtoLogger};
//!
//! let logger = FemtoLogger::new("app".into());
//! logger.add_hook(Arc::new(CallerAnnotator::new(FemtoLevel::Info)));
//! let line = logger.info("ready").expect("INFO passes the default threshold");
//! assert!(line.starts_with("app [INFO] ready"));
//! ```

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;

use log::trace;

use crate::frame_filter::InternalFrames;
use crate::hooks::{FemtoHook, HookBuildError, HookError};
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;
use crate::stack_frame::StackFrame;
use crate::traceback_frames::{BacktraceSource, FrameSource};

/// Key under which the caller location is stored.
pub const CALLER_FIELD: &str = "caller";

/// Innermost frames skipped before capture starts.
///
/// Skipping is positional and therefore tied to the exact call depth of the
/// dispatch path, which varies with inlining. The default relies on
/// [`InternalFrames`] instead.
pub const DEFAULT_SKIP_FRAMES: usize = 0;

/// Maximum number of frames captured per annotation.
pub const DEFAULT_TRACE_DEPTH: usize = 32;

/// Placeholder used when a path has no final component.
pub const UNKNOWN_FILE: &str = "<file>";

/// Placeholder used when a frame has no symbol name.
pub const UNKNOWN_FUNCTION: &str = "<function>";

/// Immutable settings of a [`CallerAnnotator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatorConfig {
    minimum_level: FemtoLevel,
    shorten_paths: bool,
    source_root: PathBuf,
    skip: usize,
    depth: usize,
    internal: InternalFrames,
}

impl AnnotatorConfig {
    pub fn minimum_level(&self) -> FemtoLevel {
        self.minimum_level
    }

    pub fn shorten_paths(&self) -> bool {
        self.shorten_paths
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn internal(&self) -> &InternalFrames {
        &self.internal
    }

    /// Render `frame` as `file:line(function)`.
    pub fn format_frame(&self, frame: &StackFrame) -> String {
        let file = if self.shorten_paths {
            base_name(&frame.filename)
        } else {
            relative_to_root(&frame.filename, &self.source_root)
        };
        format!(
            "{file}:{}({})",
            frame.lineno,
            bare_function_name(&frame.function)
        )
    }
}

/// Final path component of `path`, split on the platform separator.
///
/// A path without separators is returned whole.
pub fn base_name(path: &str) -> &str {
    match path.rsplit(MAIN_SEPARATOR).next() {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_FILE,
    }
}

/// `path` with the `root` prefix and its separator removed.
///
/// Paths outside `root`, and every path when `root` is empty, are returned
/// unchanged.
pub fn relative_to_root<'a>(path: &'a str, root: &Path) -> &'a str {
    let root = root.to_string_lossy();
    let root = root.trim_end_matches(MAIN_SEPARATOR);
    if root.is_empty() {
        return path;
    }
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix(MAIN_SEPARATOR))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(path)
}

/// Function name without its module, type or package qualification.
///
/// Rust paths are split on `::`, and the remainder on `.` for dotted names:
/// `app::svc::Handler::run` becomes `run`, `service.Handler.Process`
/// becomes `Process`.
pub fn bare_function_name(function: &str) -> &str {
    let last = function.rsplit("::").next().unwrap_or(function);
    match last.rsplit('.').next() {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_FUNCTION,
    }
}

/// Hook attaching the application call site to every record it sees.
pub struct CallerAnnotator {
    config: AnnotatorConfig,
    source: Arc<dyn FrameSource>,
}

impl CallerAnnotator {
    /// Annotator firing for `minimum_level` and above, with basename paths,
    /// the default internal-frame rules and the platform unwinder.
    pub fn new(minimum_level: FemtoLevel) -> Self {
        Self::builder(minimum_level).into_annotator()
    }

    pub fn builder(minimum_level: FemtoLevel) -> CallerAnnotatorBuilder {
        CallerAnnotatorBuilder::new(minimum_level)
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Every level at least as severe as the configured minimum.
    pub fn requested_levels(&self) -> Vec<FemtoLevel> {
        self.config.minimum_level.and_above()
    }

    /// Locate the application frame on the current stack and format it.
    pub fn locate_caller(&self) -> Option<String> {
        let frames = self.source.frames(self.config.skip, self.config.depth);
        let frame = self.config.internal.first_external(frames)?;
        Some(self.config.format_frame(&frame))
    }

    /// Write the caller location into `record`, replacing any earlier value.
    /// Leaves the record untouched when no application frame is found.
    pub fn annotate(&self, record: &mut FemtoLogRecord) {
        match self.locate_caller() {
            Some(caller) => {
                record.insert_key_value(CALLER_FIELD, caller);
            }
            None => trace!(
                "caller annotation skipped for logger {:?}: no application frame within {} frames",
                record.logger(),
                self.config.depth
            ),
        }
    }
}

impl FemtoHook for CallerAnnotator {
    fn levels(&self) -> Vec<FemtoLevel> {
        self.requested_levels()
    }

    fn fire(&self, record: &mut FemtoLogRecord) -> Result<(), HookError> {
        self.annotate(record);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CallerAnnotator"
    }
}

impl fmt::Debug for CallerAnnotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerAnnotator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CallerAnnotator`].
#[derive(Clone)]
pub struct CallerAnnotatorBuilder {
    minimum_level: FemtoLevel,
    shorten_paths: bool,
    source_root: PathBuf,
    skip: usize,
    depth: usize,
    internal: InternalFrames,
    source: Arc<dyn FrameSource>,
}

impl CallerAnnotatorBuilder {
    pub fn new(minimum_level: FemtoLevel) -> Self {
        Self {
            minimum_level,
            shorten_paths: true,
            source_root: PathBuf::new(),
            skip: DEFAULT_SKIP_FRAMES,
            depth: DEFAULT_TRACE_DEPTH,
            internal: InternalFrames::default(),
            source: Arc::new(BacktraceSource),
        }
    }

    pub fn minimum_level(mut self, level: FemtoLevel) -> Self {
        self.minimum_level = level;
        self
    }

    /// Emit only the file's base name (`true`) or its path relative to the
    /// source root (`false`).
    pub fn shorten_paths(mut self, shorten: bool) -> Self {
        self.shorten_paths = shorten;
        self
    }

    /// Prefix stripped from file paths when paths are not shortened.
    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    /// Read the source root from the environment variable `var` now.
    /// An unset variable leaves an empty root.
    pub fn source_root_from_env(mut self, var: &str) -> Self {
        self.source_root = std::env::var_os(var).map(PathBuf::from).unwrap_or_default();
        self
    }

    /// Number of innermost frames to skip before capturing.
    pub fn skip(mut self, frames: usize) -> Self {
        self.skip = frames;
        self
    }

    /// Maximum number of frames captured and scanned.
    pub fn depth(mut self, frames: usize) -> Self {
        self.depth = frames;
        self
    }

    /// Replace the rules identifying logging infrastructure frames.
    pub fn internal_frames(mut self, internal: InternalFrames) -> Self {
        self.internal = internal;
        self
    }

    /// Replace the stack source. Mostly useful in tests.
    pub fn frame_source(mut self, source: Arc<dyn FrameSource>) -> Self {
        self.source = source;
        self
    }

    /// Validate the configuration and build the annotator.
    pub fn build(self) -> Result<CallerAnnotator, HookBuildError> {
        if self.depth == 0 {
            return Err(HookBuildError::InvalidConfig(
                "depth must be at least 1".into(),
            ));
        }
        Ok(self.into_annotator())
    }

    fn into_annotator(self) -> CallerAnnotator {
        CallerAnnotator {
            config: AnnotatorConfig {
                minimum_level: self.minimum_level,
                shorten_paths: self.shorten_paths,
                source_root: self.source_root,
                skip: self.skip,
                depth: self.depth,
                internal: self.internal,
            },
            source: self.source,
        }
    }
}

impl fmt::Debug for CallerAnnotatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerAnnotatorBuilder")
            .field("minimum_level", &self.minimum_level)
            .field("shorten_paths", &self.shorten_paths)
            .field("source_root", &self.source_root)
            .field("skip", &self.skip)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
