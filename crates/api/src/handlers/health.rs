use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::collections::BTreeMap;
use xswap_types::CacheStats;

use crate::state::AppState;

/// Liveness probe
pub async fn health() -> &'static str {
	"OK"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
	pub status: String,
	pub storage_healthy: bool,
	pub providers: BTreeMap<String, bool>,
	pub cache: CacheStats,
	pub executions: usize,
}

/// GET /ready - Readiness probe with storage, provider and cache state.
///
/// Ready while storage answers and at least one enabled provider is healthy.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
	let storage_healthy = state.storage.health_check().await.unwrap_or(false);
	let providers: BTreeMap<String, bool> =
		state.providers.health_check_all().await.into_iter().collect();
	let providers_healthy = providers.is_empty() || providers.values().any(|healthy| *healthy);
	let cache = state.aggregator.cache_stats().await;
	let executions = state.executions.execution_count().await.unwrap_or(0);

	let overall = storage_healthy && providers_healthy;
	let body = ReadinessResponse {
		status: if overall { "ready" } else { "degraded" }.to_string(),
		storage_healthy,
		providers,
		cache,
		executions,
	};
	let code = if overall {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	(code, Json(body))
}
