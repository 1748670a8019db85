use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

/// Default interval between dropped-record warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Process-wide reference point for the millisecond clock below.
static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

fn now_millis() -> u64 {
    u64::try_from(EPOCH.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Helper that rate limits dropped-record warnings.
///
/// The caller increments the drop counter via [`record_drop`]. The next call to
/// [`warn_if_due`] emits a warning using the provided callback if the configured
/// interval has elapsed since the previous warning. [`flush`] emits a warning
/// immediately if any records have been dropped since the last emission.
///
/// [`record_drop`]: Self::record_drop
/// [`warn_if_due`]: Self::warn_if_due
/// [`flush`]: Self::flush
pub struct RateLimitedWarner {
    interval_ms: u64,
    /// Millisecond timestamp of the last warning plus one; zero means never.
    last_warn: AtomicU64,
    dropped: AtomicU64,
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl RateLimitedWarner {
    /// Create a warner that emits at most once per `interval`. The first
    /// warning is emitted immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_warn: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Increment the dropped-record counter.
    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of drops not yet reported.
    pub fn pending(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Emit a warning if the rate limit interval has elapsed.
    pub fn warn_if_due(&self, warn: impl FnOnce(u64)) {
        let now = now_millis();
        let prev = self.last_warn.load(Ordering::Relaxed);
        let due = prev == 0 || now.saturating_sub(prev - 1) >= self.interval_ms;
        if !due {
            return;
        }
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            self.last_warn.store(now + 1, Ordering::Relaxed);
        }
    }

    /// Immediately warn about any dropped records.
    pub fn flush(&self, warn: impl FnOnce(u64)) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            self.last_warn.store(now_millis() + 1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_first_warning_immediately() {
        let warner = RateLimitedWarner::default();
        let mut warnings = Vec::new();
        warner.record_drop();
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
    }

    #[test]
    fn rate_limits_subsequent_warnings() {
        let warner = RateLimitedWarner::new(Duration::from_secs(60));
        let mut warnings = Vec::new();
        warner.record_drop();
        warner.warn_if_due(|c| warnings.push(c));
        warner.record_drop();
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
        assert_eq!(warner.pending(), 1);
    }

    #[test]
    fn zero_interval_never_suppresses() {
        let warner = RateLimitedWarner::new(Duration::ZERO);
        let mut warnings = Vec::new();
        for _ in 0..3 {
            warner.record_drop();
            warner.warn_if_due(|c| warnings.push(c));
        }
        assert_eq!(warnings, vec![1, 1, 1]);
    }

    #[test]
    fn flush_emits_pending_warning() {
        let warner = RateLimitedWarner::new(Duration::from_secs(60));
        let mut warnings = Vec::new();
        warner.record_drop();
        warner.record_drop();
        warner.flush(|c| warnings.push(c));
        assert_eq!(warnings, vec![2]);
        assert_eq!(warner.pending(), 0);
    }
}
