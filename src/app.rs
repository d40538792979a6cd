//! Application assembly: wires the lookup service, metrics sink and router.

use axum::Router;

use crate::config::AppConfig;
use crate::lookup::LookupService;
use crate::metrics::{MetricsError, SuccessMetrics};
use crate::routes::create_router;
use crate::state::AppState;

/// Build shared state from configuration.
pub fn build_state(config: AppConfig) -> Result<AppState, MetricsError> {
    let metrics = SuccessMetrics::from_config(&config.metrics)?;
    let lookup = LookupService::from_config(&config.lookup, metrics);
    Ok(AppState::new(config, lookup))
}

/// Build the full router from configuration.
pub fn build_app(config: AppConfig) -> Result<Router, MetricsError> {
    Ok(create_router(build_state(config)?))
}
