//! Detection of logging-infrastructure frames.
//!
//! When searching for the application code that emitted a record, every
//! frame belonging to the logging pipeline itself has to be stepped over:
//! this crate, the stack unwinder, the `log`/`tracing` facades and the
//! standard library glue in between. [`InternalFrames`] encodes those rules
//! as data so callers embedding the annotator in a different pipeline can
//! replace or extend them.
//!
//! # Example
//!
//! ```rust
//! use femtologging_caller::frame_filter::InternalFrames;
//! use femtologging_caller::StackFrame;
//!
//! let internal = InternalFrames::none().with_path("vendor/logging/");
//! let frames = vec![
//!     StackFrame::new("vendor/logging/entry.rs", 50, "logging::Entry::info"),
//!     StackFrame::new("app/main.rs", 10, "app::run"),
//! ];
//!
//! let external = internal.exclude_internal(&frames);
//! assert_eq!(external.len(), 1);
//! assert_eq!(external[0].filename, "app/main.rs");
//! ```

use std::path::{MAIN_SEPARATOR, Path};

use once_cell::sync::Lazy;

use crate::stack_frame::StackFrame;

/// Crates that sit between a logging macro and the hooks. Their frames are
/// recognised by the `registry/src/<index>/<name>-<version>/` directory
/// cargo unpacks them into.
const REGISTRY_CRATES: &[&str] = &[
    "backtrace",
    "log",
    "tracing",
    "tracing-core",
    "tracing-subscriber",
];

/// Prefix rustc remaps standard library sources to.
const STD_SOURCE_PREFIX: &str = "/rustc/";

/// Function path prefixes that identify logging infrastructure frames.
pub const DEFAULT_INTERNAL_MODULES: &[&str] = &[
    "femtologging_caller::",
    "backtrace::",
    "log::",
    "tracing::",
    "tracing_core::",
    "tracing_subscriber::",
];

static DEFAULT_INTERNAL: Lazy<InternalFrames> = Lazy::new(|| InternalFrames {
    path_patterns: vec![crate_source_dir()],
    path_prefixes: vec![STD_SOURCE_PREFIX.to_owned()],
    registry_crates: REGISTRY_CRATES.iter().map(|c| (*c).to_owned()).collect(),
    module_prefixes: DEFAULT_INTERNAL_MODULES
        .iter()
        .map(|m| (*m).to_owned())
        .collect(),
});

/// This crate's `src` directory, with a trailing separator.
fn crate_source_dir() -> String {
    let mut dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .display()
        .to_string();
    dir.push(MAIN_SEPARATOR);
    dir
}

/// Check if `haystack` contains any of the given patterns.
fn matches_any_pattern(haystack: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| haystack.contains(p.as_str()))
}

/// The `<name>-<version>` directory of a file unpacked from a cargo
/// registry, if `path` has one.
fn registry_crate_dir(path: &str) -> Option<&str> {
    let components: Vec<&str> = path.split(['/', '\\']).collect();
    components
        .windows(4)
        .find(|w| w[0] == "registry" && w[1] == "src" && !w[2].is_empty())
        .map(|w| w[3])
}

/// Check if `dir` is `<name>-<version>` for the given crate name. The
/// version must start with a digit and continue with `.`.
fn is_crate_dir(dir: &str, name: &str) -> bool {
    let Some(version) = dir
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    let digits = version.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && version[digits..].starts_with('.')
}

/// Strip the `<` that opens trait-impl paths such as
/// `<crate::Type as crate::Trait>::method`.
fn function_path(function: &str) -> &str {
    function.trim_start_matches('<')
}

/// Rules deciding whether a frame belongs to logging infrastructure.
///
/// A frame is internal when its file path contains any path pattern,
/// starts with any path prefix, lies in the registry directory of a listed
/// crate, or when its function path starts with any module prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalFrames {
    path_patterns: Vec<String>,
    path_prefixes: Vec<String>,
    registry_crates: Vec<String>,
    module_prefixes: Vec<String>,
}

impl Default for InternalFrames {
    /// Rules covering this crate, the unwinder, the `log` and `tracing`
    /// facades and the standard library.
    fn default() -> Self {
        DEFAULT_INTERNAL.clone()
    }
}

impl InternalFrames {
    /// A matcher that treats every frame as application code.
    pub fn none() -> Self {
        Self {
            path_patterns: Vec::new(),
            path_prefixes: Vec::new(),
            registry_crates: Vec::new(),
            module_prefixes: Vec::new(),
        }
    }

    /// Add a file path substring identifying internal frames.
    pub fn with_path(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.path_patterns.push(pattern);
        }
        self
    }

    /// Add a file path prefix identifying internal frames.
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.path_prefixes.push(prefix);
        }
        self
    }

    /// Treat frames unpacked from the cargo registry for crate `name` as
    /// internal.
    pub fn with_registry_crate(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.registry_crates.push(name);
        }
        self
    }

    /// Add a function path prefix identifying internal frames.
    pub fn with_module(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.module_prefixes.push(prefix);
        }
        self
    }

    pub fn path_patterns(&self) -> &[String] {
        &self.path_patterns
    }

    pub fn path_prefixes(&self) -> &[String] {
        &self.path_prefixes
    }

    pub fn registry_crates(&self) -> &[String] {
        &self.registry_crates
    }

    pub fn module_prefixes(&self) -> &[String] {
        &self.module_prefixes
    }

    fn is_registry_frame(&self, filename: &str) -> bool {
        if self.registry_crates.is_empty() {
            return false;
        }
        registry_crate_dir(filename).is_some_and(|dir| {
            self.registry_crates
                .iter()
                .any(|name| is_crate_dir(dir, name))
        })
    }

    /// Check if a frame is from logging infrastructure.
    pub fn is_internal(&self, frame: &StackFrame) -> bool {
        let filename = frame.filename.as_str();
        matches_any_pattern(filename, &self.path_patterns)
            || self
                .path_prefixes
                .iter()
                .any(|prefix| filename.starts_with(prefix.as_str()))
            || self.is_registry_frame(filename)
            || self
                .module_prefixes
                .iter()
                .any(|prefix| function_path(&frame.function).starts_with(prefix.as_str()))
    }

    /// Return the frames that are not logging infrastructure, in order.
    pub fn exclude_internal(&self, frames: &[StackFrame]) -> Vec<StackFrame> {
        frames
            .iter()
            .filter(|f| !self.is_internal(f))
            .cloned()
            .collect()
    }

    /// Return the first frame with a source location that is not logging
    /// infrastructure. Consumes `frames` only up to that frame.
    pub fn first_external<I>(&self, frames: I) -> Option<StackFrame>
    where
        I: IntoIterator<Item = StackFrame>,
    {
        frames
            .into_iter()
            .filter(StackFrame::has_location)
            .find(|f| !self.is_internal(f))
    }
}
