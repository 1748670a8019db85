//! Record hooks fired synchronously before a record is dispatched.
//!
//! A hook subscribes to a set of levels through [`FemtoHook::levels`]. When a
//! logger accepts a record it fires every hook registered for the record's
//! level, in registration order, on the emitting thread. Hooks receive the
//! record mutably and may add structured fields; handlers then see the
//! mutated record.

use std::sync::Arc;

use log::warn;
use thiserror::Error;

use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;

/// Error reported by a hook. Loggers log it and carry on dispatching.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("hook failed: {0}")]
    Failed(String),
}

/// Errors raised while building a hook from user configuration.
#[derive(Debug, Error)]
pub enum HookBuildError {
    #[error("invalid hook configuration: {0}")]
    InvalidConfig(String),
}

/// Plugin contract between the logger and record hooks.
pub trait FemtoHook: Send + Sync {
    /// Levels this hook wants to be fired for.
    fn levels(&self) -> Vec<FemtoLevel>;

    /// Inspect or enrich `record` before it is formatted and dispatched.
    fn fire(&self, record: &mut FemtoLogRecord) -> Result<(), HookError>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Hooks indexed by the levels they subscribe to.
#[derive(Clone, Default)]
pub struct LevelHooks {
    by_level: [Vec<Arc<dyn FemtoHook>>; FemtoLevel::ALL.len()],
}

impl LevelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` under every level it advertises.
    pub fn add(&mut self, hook: Arc<dyn FemtoHook>) {
        for level in hook.levels() {
            self.by_level[usize::from(u8::from(level))].push(Arc::clone(&hook));
        }
    }

    /// Remove `hook` from every level. Returns `true` when it was registered.
    pub fn remove(&mut self, hook: &Arc<dyn FemtoHook>) -> bool {
        let mut removed = false;
        for hooks in &mut self.by_level {
            let before = hooks.len();
            hooks.retain(|h| !Arc::ptr_eq(h, hook));
            removed |= hooks.len() != before;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.by_level.iter_mut().for_each(Vec::clear);
    }

    /// Number of hooks registered for `level`.
    pub fn len_for(&self, level: FemtoLevel) -> usize {
        self.by_level[usize::from(u8::from(level))].len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.iter().all(Vec::is_empty)
    }

    /// Fire the hooks registered for the record's level.
    ///
    /// Every hook runs even if an earlier one fails. Failures are logged and
    /// counted; the return value is the number of hooks that failed.
    pub fn fire(&self, record: &mut FemtoLogRecord) -> usize {
        let mut failures = 0;
        for hook in &self.by_level[usize::from(u8::from(record.level()))] {
            if let Err(err) = hook.fire(record) {
                failures += 1;
                warn!(
                    "femtologging: failed to fire hook {} for logger {:?}: {err}",
                    hook.name(),
                    record.logger()
                );
            }
        }
        failures
    }
}
