//! entity-gateway: an HTTP front for an unreliable external name service.
//!
//! The "external" service is simulated: each lookup fails at random, and a
//! batch over a contiguous id range either skips or surfaces failures. Every
//! attempt can be counted as `<metric>.success` / `<metric>.fail` via statsd.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod lookup;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::{build_app, build_state};
pub use error::AppError;
