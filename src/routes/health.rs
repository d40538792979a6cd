//! Liveness check.

/// Returns `ok` while the process can answer HTTP. The simulated upstream is
/// not consulted.
pub async fn health() -> &'static str {
    "ok"
}
