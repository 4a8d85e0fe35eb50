use axum::{extract::State, response::Json};
use serde::Serialize;
use xswap_adapters::ProviderSummary;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersResponse {
	pub providers: Vec<ProviderSummary>,
	pub total_providers: usize,
	pub enabled_providers: usize,
	pub timestamp: i64,
}

/// GET /api/v1/providers - Configured providers in priority order
pub async fn get_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
	let providers = state.providers.summaries();
	Json(ProvidersResponse {
		total_providers: providers.len(),
		enabled_providers: state.providers.enabled_count(),
		providers,
		timestamp: chrono::Utc::now().timestamp(),
	})
}
