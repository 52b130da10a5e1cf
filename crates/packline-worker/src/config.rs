//! Worker configuration.

use std::time::Duration;

/// Worker loop configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum concurrently handled jobs
    pub concurrency: usize,
    /// Bounded wait of one blocking dequeue
    pub poll_timeout: Duration,
    /// Fixed backoff between broker connection attempts
    pub connect_backoff: Duration,
    /// Sleep before re-checking capacity while saturated
    pub saturation_sleep: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            poll_timeout: Duration::from_secs(2),
            connect_backoff: Duration::from_secs(3),
            saturation_sleep: Duration::from_secs(1),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables. Concurrency is owned by the
    /// packaging config and set by the caller.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            concurrency: defaults.concurrency,
            poll_timeout: duration_var("WORKER_POLL_TIMEOUT_SECS", defaults.poll_timeout),
            connect_backoff: duration_var("WORKER_CONNECT_BACKOFF_SECS", defaults.connect_backoff),
            saturation_sleep: duration_var(
                "WORKER_SATURATION_SLEEP_SECS",
                defaults.saturation_sleep,
            ),
        }
    }
}

fn duration_var(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
