//! Handler for the external entity lookup endpoint.
//!
//! `GET /external?id=<id>&count=<count>` resolves `count` consecutive ids
//! starting at `id` and returns the names as a `"; "`-joined plain-text body.

use std::sync::LazyLock;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension,
};
use regex::Regex;
use tracing::instrument;

use crate::config::{EntryFormat, ENTRY_SEPARATOR};
use crate::error::AppError;
use crate::lookup::LookupResult;
use crate::middleware::RequestId;
use crate::state::AppState;

/// Decimal number with optional sign, fraction and exponent: `5`, `-1.5`, `.5`, `1e3`.
static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// Raw query parameters. Kept as strings so validation controls the response.
#[derive(Debug, Default)]
pub struct LookupParams {
    pub id: Option<String>,
    pub count: Option<String>,
}

impl LookupParams {
    /// Collect known keys from decoded query pairs. A repeated key keeps its last value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "id" => params.id = Some(value),
                "count" => params.count = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// Parse a decimal number and truncate it toward zero.
///
/// Surrounding ASCII whitespace is ignored. Fractions and exponents are
/// accepted (`"2.9"` is 2, `"1e1"` is 10). Anything that is not a finite
/// number inside the `i64` range gives `None`.
pub fn parse_numeric(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
    if !NUMERIC_RE.is_match(trimmed) {
        return None;
    }

    // Plain integers skip the float path so large values stay exact
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    let value: f64 = trimmed.parse().ok()?;
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// Join resolved entries into the response body.
pub fn render(result: &LookupResult, format: EntryFormat) -> String {
    result
        .iter()
        .map(|(id, name)| match format {
            EntryFormat::IdPrefixed => format!("{}: {}", id, name),
            EntryFormat::Name => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Looks up a batch of external entity names.
#[instrument(name = "lookup::external", skip_all, fields(request_id = %request_id.0))]
pub async fn external(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<String, AppError> {
    let Query(pairs) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let params = LookupParams::from_pairs(pairs);

    let id = params
        .id
        .as_deref()
        .and_then(parse_numeric)
        .ok_or_else(|| AppError::BadRequest("id must be numeric".to_string()))?;

    let count = match params.count.as_deref() {
        None => 1,
        Some(raw) => parse_numeric(raw)
            .ok_or_else(|| AppError::BadRequest("count must be numeric".to_string()))?,
    };

    let max_count = state.config.lookup.max_count;
    if count > max_count {
        return Err(AppError::BatchLimit {
            count,
            max: max_count,
        });
    }

    let result = state.lookup.get_multiple_names(id, count)?;

    tracing::debug!(id, count, resolved = result.len(), "Lookup served");

    Ok(render(&result, state.config.lookup.entry_format))
}
