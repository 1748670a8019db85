//! Level-named shorthands for [`FemtoLogger::log`].
//!
//! Each shorthand adds one frame between the application and the hooks.
//! Those frames live in this crate, so caller annotation steps over them.

use crate::level::FemtoLevel;

use super::FemtoLogger;

impl FemtoLogger {
    pub fn trace(&self, message: &str) -> Option<String> {
        self.log(FemtoLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> Option<String> {
        self.log(FemtoLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> Option<String> {
        self.log(FemtoLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> Option<String> {
        self.log(FemtoLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> Option<String> {
        self.log(FemtoLevel::Error, message)
    }

    pub fn critical(&self, message: &str) -> Option<String> {
        self.log(FemtoLevel::Critical, message)
    }
}
