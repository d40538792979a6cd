//! Success/failure counters for external lookups.
//!
//! `SuccessMetrics` wraps a `CounterClient` and bumps `<name>.success` or
//! `<name>.fail` once per attempt. Clients are fire-and-forget: an increment
//! never fails or blocks the caller.

mod statsd;

use std::sync::Arc;

use crate::config::{MetricsConfig, METRIC_FAIL_SUFFIX, METRIC_SUCCESS_SUFFIX};

pub use statsd::{LogClient, StatsdClient};

/// A counter backend.
pub trait CounterClient: Send + Sync {
    /// Increment `metric` by one.
    fn increment(&self, metric: &str);
}

/// Metrics setup error
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to open statsd socket: {0}")]
    Socket(#[from] std::io::Error),

    #[error("Failed to create statsd sink: {0}")]
    Sink(#[from] cadence::MetricError),
}

/// Whether `name` can be used as a dotted statsd metric name.
///
/// Segments are non-empty runs of ASCII alphanumerics, `_` or `-`. The
/// statsd separators `:`, `|` and `@` are never allowed.
pub fn is_valid_metric_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

/// Records lookup outcomes against a single base metric name.
#[derive(Clone)]
pub struct SuccessMetrics {
    client: Arc<dyn CounterClient>,
    metric_name: String,
}

impl SuccessMetrics {
    pub fn new(client: Arc<dyn CounterClient>, metric_name: impl Into<String>) -> Self {
        Self {
            client,
            metric_name: metric_name.into(),
        }
    }

    /// Build the sink described by `config`.
    ///
    /// Returns `None` when metrics are disabled. Without a statsd address the
    /// counters are written to the log instead.
    pub fn from_config(config: &MetricsConfig) -> Result<Option<Self>, MetricsError> {
        if !config.enabled {
            tracing::info!("Lookup metrics disabled");
            return Ok(None);
        }

        let client: Arc<dyn CounterClient> = match &config.statsd_addr {
            Some(addr) => Arc::new(StatsdClient::connect(addr, &config.prefix)?),
            None => {
                tracing::info!("No statsd_addr configured, counters go to the log");
                Arc::new(LogClient::new(&config.prefix))
            }
        };

        Ok(Some(Self::new(client, config.metric_name.clone())))
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    pub fn log_success(&self) {
        self.log(METRIC_SUCCESS_SUFFIX);
    }

    pub fn log_fail(&self) {
        self.log(METRIC_FAIL_SUFFIX);
    }

    fn log(&self, suffix: &str) {
        self.client
            .increment(&format!("{}.{}", self.metric_name, suffix));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::CounterClient;

    /// Counter client that remembers every increment.
    #[derive(Default)]
    pub struct RecordingClient {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingClient {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, metric: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|m| *m == metric).count()
        }
    }

    impl CounterClient for RecordingClient {
        fn increment(&self, metric: &str) {
            self.calls.lock().unwrap().push(metric.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingClient;
    use super::*;

    #[test]
    fn test_success_and_fail_suffixes() {
        let client = Arc::new(RecordingClient::default());
        let metrics = SuccessMetrics::new(client.clone(), "external_service");

        metrics.log_success();
        metrics.log_fail();
        metrics.log_success();

        assert_eq!(
            client.calls(),
            vec![
                "external_service.success",
                "external_service.fail",
                "external_service.success",
            ]
        );
    }

    #[test]
    fn test_from_config_disabled() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(SuccessMetrics::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_without_statsd_uses_log_client() {
        let config = MetricsConfig::default();
        let metrics = SuccessMetrics::from_config(&config).unwrap().unwrap();
        assert_eq!(metrics.metric_name(), "external_service");
        metrics.log_success();
    }

    #[test]
    fn test_from_config_bad_statsd_addr() {
        let config = MetricsConfig {
            statsd_addr: Some("not-an-address".to_string()),
            ..MetricsConfig::default()
        };
        assert!(matches!(
            SuccessMetrics::from_config(&config),
            Err(MetricsError::Sink(_))
        ));
    }

    #[test]
    fn test_metric_name_validation() {
        assert!(is_valid_metric_name("external_service"));
        assert!(is_valid_metric_name("gw.external-service.v2"));

        assert!(!is_valid_metric_name(""));
        assert!(!is_valid_metric_name("a|b"));
        assert!(!is_valid_metric_name("a:b"));
        assert!(!is_valid_metric_name("a@b"));
        assert!(!is_valid_metric_name("has space"));
        assert!(!is_valid_metric_name("trailing."));
        assert!(!is_valid_metric_name("double..dot"));
    }
}
