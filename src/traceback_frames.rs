//! Stack capture and lazy symbol resolution.
//!
//! [`BacktraceSource`] walks the calling thread's stack with the `backtrace`
//! crate. Capture only records raw frames; file, line and function are
//! resolved one frame at a time as the consumer advances the returned
//! iterator, so a walk that stops early never pays for the remaining
//! symbol lookups.

use std::collections::VecDeque;
use std::fmt;

use log::trace;

use crate::stack_frame::StackFrame;

/// Forward-only sequence of resolved frames, innermost first.
pub type Frames<'a> = Box<dyn Iterator<Item = StackFrame> + 'a>;

/// Source of call-stack frames for the current thread.
pub trait FrameSource: Send + Sync {
    /// Return up to `depth` captured frames after skipping the `skip`
    /// innermost ones. Inlined calls may resolve to more than one frame
    /// per captured address.
    fn frames(&self, skip: usize, depth: usize) -> Frames<'_>;
}

/// Frame source backed by the platform unwinder.
#[derive(Clone, Copy, Debug, Default)]
pub struct BacktraceSource;

impl BacktraceSource {
    fn capture(skip: usize, depth: usize) -> Vec<backtrace::Frame> {
        let mut captured = Vec::with_capacity(depth);
        if depth == 0 {
            return captured;
        }
        let mut skipped = 0;
        backtrace::trace(|frame| {
            if skipped < skip {
                skipped += 1;
                return true;
            }
            captured.push(frame.clone());
            captured.len() < depth
        });
        captured
    }
}

impl FrameSource for BacktraceSource {
    fn frames(&self, skip: usize, depth: usize) -> Frames<'_> {
        let captured = Self::capture(skip, depth);
        if captured.is_empty() {
            trace!("caller capture returned no frames (skip={skip}, depth={depth})");
        }
        Box::new(ResolvedFrames::new(captured))
    }
}

/// Iterator resolving captured frames on demand.
pub struct ResolvedFrames {
    raw: std::vec::IntoIter<backtrace::Frame>,
    pending: VecDeque<StackFrame>,
}

impl ResolvedFrames {
    fn new(raw: Vec<backtrace::Frame>) -> Self {
        Self {
            raw: raw.into_iter(),
            pending: VecDeque::new(),
        }
    }
}

impl Iterator for ResolvedFrames {
    type Item = StackFrame;

    fn next(&mut self) -> Option<StackFrame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Some(frame);
            }
            let raw = self.raw.next()?;
            backtrace::resolve_frame(&raw, |symbol| {
                self.pending.push_back(StackFrame {
                    filename: symbol
                        .filename()
                        .map(|path| path.display().to_string())
                        .unwrap_or_default(),
                    lineno: symbol.lineno().unwrap_or(0),
                    // `{:#}` omits the trailing symbol hash.
                    function: symbol
                        .name()
                        .map(|name| format!("{name:#}"))
                        .unwrap_or_default(),
                });
            });
        }
    }
}

impl fmt::Debug for ResolvedFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedFrames")
            .field("unresolved", &self.raw.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Frame source replaying a prepared stack, innermost frame first.
///
/// Useful for exercising annotation rules without depending on the shape
/// of the real call stack.
#[derive(Clone, Debug, Default)]
pub struct FixedFrames {
    frames: Vec<StackFrame>,
}

impl FixedFrames {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }
}

impl FrameSource for FixedFrames {
    fn frames(&self, skip: usize, depth: usize) -> Frames<'_> {
        Box::new(self.frames.iter().skip(skip).take(depth).cloned())
    }
}
