//! Simulated external entity lookup.
//!
//! The "external" service resolves an entity id to a display name and fails
//! at random, as decided by a [`FailureInjector`]. A batch walks a contiguous
//! id range; each attempt yields a [`LookupOutcome`] and the configured
//! [`FailurePolicy`] decides whether a failure ends the batch or is skipped.

mod injector;

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use tracing::instrument;

use crate::config::{FailurePolicy, LookupConfig, ENTITY_NAME_PREFIX};
use crate::metrics::SuccessMetrics;

pub use injector::{FailureInjector, RandomInjector};

#[cfg(test)]
pub(crate) use injector::testing;

/// Names resolved by a batch, keyed by entity id in ascending order.
pub type LookupResult = BTreeMap<i64, String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Cannot request name for entity {id}")]
    Failed { id: i64 },

    #[error("Id range starting at {start} with count {count} overflows")]
    RangeOverflow { start: i64, count: i64 },
}

/// Result of a single lookup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found { id: i64, name: String },
    Failed { id: i64 },
}

/// Ids covered by a batch of `count` lookups starting at `start`.
///
/// Non-positive counts give an empty range. `None` if the end does not fit in `i64`.
pub fn id_range(start: i64, count: i64) -> Option<Range<i64>> {
    if count <= 0 {
        return Some(start..start);
    }
    start.checked_add(count).map(|end| start..end)
}

/// Client for the unreliable external name service.
#[derive(Clone)]
pub struct LookupService {
    injector: Arc<dyn FailureInjector>,
    metrics: Option<SuccessMetrics>,
    policy: FailurePolicy,
}

impl LookupService {
    pub fn new(
        injector: Arc<dyn FailureInjector>,
        metrics: Option<SuccessMetrics>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            injector,
            metrics,
            policy,
        }
    }

    /// Build a service with a random injector as described by `config`.
    pub fn from_config(config: &LookupConfig, metrics: Option<SuccessMetrics>) -> Self {
        let injector = match config.seed {
            Some(seed) => RandomInjector::seeded(seed, config.success_rate),
            None => RandomInjector::new(config.success_rate),
        };

        tracing::info!(
            success_rate = config.success_rate,
            policy = ?config.failure_policy,
            seeded = config.seed.is_some(),
            metrics = metrics.is_some(),
            "Initialized lookup service"
        );

        Self::new(Arc::new(injector), metrics, config.failure_policy)
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Resolve a single entity id.
    pub fn get_name(&self, id: i64) -> Result<String, LookupError> {
        if self.injector.should_fail(id) {
            return Err(LookupError::Failed { id });
        }
        Ok(format!("{} {}", ENTITY_NAME_PREFIX, id))
    }

    /// One attempt, recorded against the metrics sink if one is wired.
    pub fn lookup(&self, id: i64) -> LookupOutcome {
        match self.get_name(id) {
            Ok(name) => {
                if let Some(metrics) = &self.metrics {
                    metrics.log_success();
                }
                LookupOutcome::Found { id, name }
            }
            Err(e) => {
                tracing::debug!(id, error = %e, "External lookup failed");
                if let Some(metrics) = &self.metrics {
                    metrics.log_fail();
                }
                LookupOutcome::Failed { id }
            }
        }
    }

    /// Resolve `count` consecutive ids starting at `start_id`.
    ///
    /// Under [`FailurePolicy::Skip`] failed ids are left out of the result.
    /// Under [`FailurePolicy::Propagate`] the first failure is returned and
    /// the remaining ids are not attempted.
    #[instrument(name = "lookup::get_multiple_names", skip(self))]
    pub fn get_multiple_names(
        &self,
        start_id: i64,
        count: i64,
    ) -> Result<LookupResult, LookupError> {
        let range = id_range(start_id, count).ok_or(LookupError::RangeOverflow {
            start: start_id,
            count,
        })?;

        let mut result = LookupResult::new();
        for id in range {
            match self.lookup(id) {
                LookupOutcome::Found { id, name } => {
                    result.insert(id, name);
                }
                LookupOutcome::Failed { id } => match self.policy {
                    FailurePolicy::Skip => continue,
                    FailurePolicy::Propagate => return Err(LookupError::Failed { id }),
                },
            }
        }

        tracing::debug!(
            requested = count.max(0),
            resolved = result.len(),
            "Batch lookup complete"
        );

        Ok(result)
    }
}
