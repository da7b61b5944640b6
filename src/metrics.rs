//! Compile counters exported on `/metrics` next to the HTTP metrics.

use std::time::Duration;

use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};

const NAMESPACE: &str = "pageperfect";
const DURATION_BUCKETS: [f64; 9] = [0.5, 1.0, 2.0, 4.0, 8.0, 15.0, 25.0, 35.0, 45.0];

#[derive(Clone)]
pub struct CompileMetrics {
    outcomes: IntCounterVec,
    duration: Histogram,
}

impl CompileMetrics {
    pub fn new() -> Self {
        let outcomes = IntCounterVec::new(
            Opts::new("compile_outcomes_total", "Compile requests by outcome").namespace(NAMESPACE),
            &["outcome"],
        )
        .expect("compile outcome counter definition is valid");
        let duration = Histogram::with_opts(
            HistogramOpts::new("compile_duration_seconds", "Wall-clock time of successful compiles")
                .namespace(NAMESPACE)
                .buckets(DURATION_BUCKETS.to_vec()),
        )
        .expect("compile duration histogram definition is valid");

        Self { outcomes, duration }
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.outcomes.clone()))?;
        registry.register(Box::new(self.duration.clone()))?;
        Ok(())
    }

    pub fn record_success(&self, duration: Duration) {
        self.outcomes.with_label_values(&["success"]).inc();
        self.duration.observe(duration.as_secs_f64());
    }

    /// `code` is the error code sent to the client.
    pub fn record_failure(&self, code: &str) {
        self.outcomes.with_label_values(&[code]).inc();
    }

    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.outcomes.with_label_values(&[outcome]).get()
    }
}

impl Default for CompileMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_are_counted_and_exported() {
        let metrics = CompileMetrics::new();
        metrics.record_success(Duration::from_millis(1200));
        metrics.record_failure("compile_failed");
        metrics.record_failure("compile_failed");

        assert_eq!(metrics.outcome_count("success"), 1);
        assert_eq!(metrics.outcome_count("compile_failed"), 2);
        assert_eq!(metrics.outcome_count("compile_timeout"), 0);

        let registry = Registry::new();
        metrics.register(&registry).unwrap();
        let exported = prometheus::TextEncoder::new()
            .encode_to_string(&registry.gather())
            .unwrap();
        assert!(exported.contains("pageperfect_compile_outcomes_total{outcome=\"compile_failed\"} 2"));
        assert!(exported.contains("pageperfect_compile_duration_seconds_count 1"));
    }
}
