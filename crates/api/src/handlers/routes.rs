use axum::{extract::State, response::Json};
use tracing::{info, warn};
use xswap_types::{RoutePlan, RoutePlanRequest};

use crate::handlers::common::{route_error, ApiError};
use crate::state::AppState;

/// POST /api/v1/routes - Plan a (possibly multi-leg) route
pub async fn post_routes(
	State(state): State<AppState>,
	Json(request): Json<RoutePlanRequest>,
) -> Result<Json<RoutePlan>, ApiError> {
	info!(
		"Received route request {} {}/{} -> {}/{}",
		request.amount,
		request.from_token_id,
		request.from_network_id,
		request.to_token_id,
		request.to_network_id
	);

	match state.planner.plan(&request).await {
		Ok(plan) => {
			info!(
				"Planned route {} with {} steps{}",
				plan.id,
				plan.steps.len(),
				plan.via_hub
					.as_deref()
					.map(|hub| format!(" via {}", hub))
					.unwrap_or_default()
			);
			Ok(Json(plan))
		},
		Err(e) => {
			warn!("Route planning failed with {}: {}", e.code(), e);
			Err(route_error(&e, state.debug))
		},
	}
}
