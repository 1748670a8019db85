//! Resolved call-stack frame.
//!
//! A [`StackFrame`] is produced by a [`FrameSource`](crate::traceback_frames::FrameSource)
//! for the duration of a single annotation and discarded once formatted.

/// A single frame of the current thread's call stack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// Source file the frame's code was compiled from. Empty when the
    /// debug information could not be resolved.
    pub filename: String,
    /// Line number in the source file, or zero when unknown.
    pub lineno: u32,
    /// Fully qualified function path, without the symbol hash.
    pub function: String,
}

impl StackFrame {
    pub fn new(filename: impl Into<String>, lineno: u32, function: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            lineno,
            function: function.into(),
        }
    }

    /// Whether the frame carries a usable source path.
    pub fn has_location(&self) -> bool {
        !self.filename.is_empty()
    }
}
