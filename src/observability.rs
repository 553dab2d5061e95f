use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Issue tracker API usage metrics
#[derive(Debug, Default)]
pub struct TrackerApiMetrics {
    pub total_requests: AtomicU64,
    pub rate_limit_waits: AtomicU64,
    pub errors: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
}

impl TrackerApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limit_wait(&self) {
        self.rate_limit_waits.fetch_add(1, Ordering::Relaxed);
        debug!("Waiting for tracker rate limiter");
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> TrackerApiStats {
        TrackerApiStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rate_limit_waits: self.rate_limit_waits.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Tracker API metrics: requests={}, rate_limit_waits={}, errors={}, cache_hits={}, cache_misses={}",
            stats.total_requests,
            stats.rate_limit_waits,
            stats.errors,
            stats.cache_hits,
            stats.cache_misses
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerApiStats {
    pub total_requests: u64,
    pub rate_limit_waits: u64,
    pub errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Global metrics instance
static TRACKER_METRICS: std::sync::LazyLock<TrackerApiMetrics> =
    std::sync::LazyLock::new(TrackerApiMetrics::new);

pub fn tracker_metrics() -> &'static TrackerApiMetrics {
    &TRACKER_METRICS
}

/// Time an operation and log its duration
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) -> u128 {
        let elapsed_ms = self.start.elapsed().as_millis();
        info!(
            operation = %self.operation,
            duration_ms = elapsed_ms,
            "Operation completed"
        );
        elapsed_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counters() {
        let metrics = TrackerApiMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_error();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        metrics.record_rate_limit_wait();

        assert_eq!(
            metrics.get_stats(),
            TrackerApiStats {
                total_requests: 2,
                rate_limit_waits: 1,
                errors: 1,
                cache_hits: 1,
                cache_misses: 1,
            }
        );
    }

    #[test]
    fn test_operation_timer_reports_elapsed() {
        let timer = OperationTimer::new("test_operation");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.finish() >= 5);
    }
}
