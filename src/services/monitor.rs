use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Last observed duration of one measured operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub elapsed_ms: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Records how long outbound catalog calls take.
///
/// Constructed once at startup and handed to whoever needs it; there is no
/// process-wide instance.
pub struct PerformanceMonitor {
    slow_threshold: Duration,
    metrics: RwLock<HashMap<String, MetricSample>>,
}

impl PerformanceMonitor {
    pub fn new(slow_threshold: Duration) -> Self {
        Self {
            slow_threshold,
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// Runs `call`, storing its duration under `"{endpoint}_api"` whatever the outcome
    pub async fn measure<T, F>(&self, endpoint: &str, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed();

        self.record(&format!("{}_api", endpoint), elapsed).await;

        if elapsed > self.slow_threshold {
            tracing::warn!(
                endpoint = %endpoint,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "Slow catalog call"
            );
        }

        result
    }

    pub async fn record(&self, key: &str, elapsed: Duration) {
        let sample = MetricSample {
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            recorded_at: Utc::now(),
        };
        self.metrics.write().await.insert(key.to_string(), sample);
    }

    /// Snapshot of every recorded operation
    pub async fn metrics(&self) -> HashMap<String, MetricSample> {
        self.metrics.read().await.clone()
    }

    pub async fn clear(&self) {
        self.metrics.write().await.clear();
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_measure_records_under_endpoint_key() {
        let monitor = PerformanceMonitor::default();

        let value = monitor.measure("movie_details", async { 42 }).await;
        assert_eq!(value, 42);

        let metrics = monitor.metrics().await;
        assert!(metrics.contains_key("movie_details_api"));
        assert!(metrics["movie_details_api"].elapsed_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_measure_records_failures_too() {
        let monitor = PerformanceMonitor::default();

        let result: Result<(), &str> = monitor.measure("search", async { Err("boom") }).await;
        assert!(result.is_err());
        assert!(monitor.metrics().await.contains_key("search_api"));
    }

    #[tokio::test]
    async fn test_latest_sample_wins_and_clear() {
        let monitor = PerformanceMonitor::new(Duration::from_millis(1));

        monitor.record("genres_api", Duration::from_millis(5)).await;
        monitor.record("genres_api", Duration::from_millis(20)).await;
        let metrics = monitor.metrics().await;
        assert_eq!(metrics.len(), 1);
        assert!((metrics["genres_api"].elapsed_ms - 20.0).abs() < f64::EPSILON);

        monitor.clear().await;
        assert!(monitor.metrics().await.is_empty());
    }
}
