//! Shared factories and assertions for frame-related tests.

use crate::stack_frame::StackFrame;

/// Create a StackFrame with the given filename, line number, and function name.
pub fn make_frame(filename: &str, lineno: u32, function: &str) -> StackFrame {
    StackFrame::new(filename, lineno, function)
}

/// Assert frames have expected length and filenames.
pub fn assert_frames(frames: &[StackFrame], expected_len: usize, expected_filenames: &[&str]) {
    assert_eq!(
        expected_len,
        expected_filenames.len(),
        "expected_len ({}) must match expected_filenames.len() ({})",
        expected_len,
        expected_filenames.len()
    );
    assert_eq!(frames.len(), expected_len);
    for (i, expected) in expected_filenames.iter().enumerate() {
        assert_eq!(frames[i].filename, *expected, "Mismatch at index {}", i);
    }
}

/// Build an application frame under `/srv/app`, the root used by the
/// source-root tests.
pub fn app_frame(file: &str, lineno: u32, function: &str) -> StackFrame {
    make_frame(&format!("/srv/app/{file}"), lineno, function)
}
