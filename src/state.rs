//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::lookup::LookupService;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration and the lookup service, which
/// carries the failure injector and the optional metrics sink.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub lookup: LookupService,
}

impl AppState {
    /// Creates a new application state from the given configuration and lookup service.
    pub fn new(config: AppConfig, lookup: LookupService) -> Self {
        Self {
            config: Arc::new(config),
            lookup,
        }
    }
}
