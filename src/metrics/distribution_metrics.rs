//! Distribution metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for distribution passes.
///
/// The client records into it automatically when attached through
/// [`OptionsClientBuilder::with_metrics`](crate::core::OptionsClientBuilder::with_metrics).
#[derive(Clone)]
pub struct DistributionMetrics {
    passes: Counter<u64>,
    fetch_failures: Counter<u64>,
    options_applied: Counter<u64>,
    update_failures: Counter<u64>,
    pass_duration: Histogram<f64>,
    since_last_change_seconds: Gauge<i64>,
    monitors: Gauge<i64>,
    last_change: Arc<parking_lot::Mutex<Instant>>,
}

impl DistributionMetrics {
    /// Create a new metrics collector with the provided meter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use options_monitor::metrics::DistributionMetrics;
    /// use opentelemetry::global;
    ///
    /// let metrics = DistributionMetrics::new(global::meter("options-monitor"));
    /// ```
    pub fn new(meter: Meter) -> Self {
        let passes = meter
            .u64_counter("options_monitor.pass.count")
            .with_description("Number of distribution passes started")
            .build();

        let fetch_failures = meter
            .u64_counter("options_monitor.fetch.failures")
            .with_description("Number of passes whose document fetch failed")
            .build();

        let options_applied = meter
            .u64_counter("options_monitor.options.applied")
            .with_description("Number of sub-documents accepted by subscribers")
            .build();

        let update_failures = meter
            .u64_counter("options_monitor.options.failures")
            .with_description("Number of monitor updates that failed")
            .build();

        let pass_duration = meter
            .f64_histogram("options_monitor.pass.duration")
            .with_description("Duration of distribution passes in seconds")
            .with_unit("s")
            .build();

        let since_last_change_seconds = meter
            .i64_gauge("options_monitor.change.age")
            .with_description("Time since a subscriber last accepted new options in seconds")
            .with_unit("s")
            .build();

        let monitors = meter
            .i64_gauge("options_monitor.monitors")
            .with_description("Number of registered options monitors")
            .build();

        Self {
            passes,
            fetch_failures,
            options_applied,
            update_failures,
            pass_duration,
            since_last_change_seconds,
            monitors,
            last_change: Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    /// Start timing a pass.
    pub fn start_pass(&self) -> Instant {
        self.passes.add(1, &[]);
        Instant::now()
    }

    /// Record a pass whose fetch failed.
    pub fn record_fetch_failure(&self, start: Instant) {
        self.fetch_failures.add(1, &[]);
        self.pass_duration
            .record(start.elapsed().as_secs_f64(), &[]);
        self.update_change_age();
    }

    /// Record a completed pass.
    ///
    /// # Arguments
    ///
    /// * `start` - The `Instant` returned from `start_pass()`
    /// * `applied` - Monitors whose subscriber accepted new options
    /// * `failed` - Monitors whose update failed
    pub fn record_pass(&self, start: Instant, applied: u64, failed: u64) {
        self.pass_duration
            .record(start.elapsed().as_secs_f64(), &[]);
        if applied > 0 {
            self.options_applied.add(applied, &[]);
            *self.last_change.lock() = Instant::now();
        }
        if failed > 0 {
            self.update_failures.add(failed, &[]);
        }
        self.update_change_age();
    }

    /// Update the registered monitor gauge.
    pub fn record_monitor_count(&self, count: usize) {
        self.monitors.record(count as i64, &[]);
    }

    fn update_change_age(&self) {
        let age_secs = self.last_change.lock().elapsed().as_secs() as i64;
        self.since_last_change_seconds.record(age_secs, &[]);
    }
}
