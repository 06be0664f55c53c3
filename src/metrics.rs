// Internal counters
//
// Lightweight counters describing what the diagnostics facility did during a run.
// They are summarised in the internal log on release.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Uses atomic operations for thread-safe tracking without locks.
#[derive(Debug)]
pub struct DiagnosticsMetrics {
    /// Lines dispatched to sinks
    pub lines_logged: AtomicU64,

    /// Lines mirrored to the console
    pub console_lines: AtomicU64,

    /// Thread sinks registered
    pub sinks_registered: AtomicU64,

    /// Errors reported through `log_error` / `assert`
    pub errors_reported: AtomicU64,

    /// Sink open or write failures
    pub sink_failures: AtomicU64,

    /// Change notifications sent
    pub notifications: AtomicU64,

    start_time: Instant,
}

impl DiagnosticsMetrics {
    pub fn new() -> Self {
        Self {
            lines_logged: AtomicU64::new(0),
            console_lines: AtomicU64::new(0),
            sinks_registered: AtomicU64::new(0),
            errors_reported: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            notifications: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_line(&self) {
        self.lines_logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_console_line(&self) {
        self.console_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_registered(&self) {
        self.sinks_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error_reported(&self) {
        self.errors_reported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "Diagnostics summary: {} lines ({} on console), {} sinks, {} errors reported, {} sink failures, {} notifications, uptime {:.2}s",
            self.lines_logged.load(Ordering::Relaxed),
            self.console_lines.load(Ordering::Relaxed),
            self.sinks_registered.load(Ordering::Relaxed),
            self.errors_reported.load(Ordering::Relaxed),
            self.sink_failures.load(Ordering::Relaxed),
            self.notifications.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        );
    }
}

impl Default for DiagnosticsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = DiagnosticsMetrics::new();
        assert_eq!(metrics.lines_logged.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.sinks_registered.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_counters() {
        let metrics = DiagnosticsMetrics::new();

        metrics.record_line();
        metrics.record_line();
        metrics.record_console_line();
        metrics.record_sink_registered();
        metrics.record_error_reported();
        metrics.record_sink_failure();
        metrics.record_notification();

        assert_eq!(metrics.lines_logged.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.console_lines.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.sinks_registered.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.errors_reported.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.sink_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.notifications.load(Ordering::Relaxed), 1);
    }
}
