use axum::{
	extract::{Query, State},
	http::StatusCode,
	response::Json,
};
use tracing::{info, warn};
use xswap_types::{QuoteRequest, QuoteResponse};

use crate::handlers::common::status_for;
use crate::state::AppState;

/// POST /api/v1/quotes - Best quote for a swap
pub async fn post_quotes(
	State(state): State<AppState>,
	Json(request): Json<QuoteRequest>,
) -> (StatusCode, Json<QuoteResponse>) {
	quote(&state, request).await
}

/// GET /api/v1/quotes - Same as POST with the request in the query string
pub async fn get_quotes(
	State(state): State<AppState>,
	Query(request): Query<QuoteRequest>,
) -> (StatusCode, Json<QuoteResponse>) {
	quote(&state, request).await
}

async fn quote(state: &AppState, request: QuoteRequest) -> (StatusCode, Json<QuoteResponse>) {
	info!(
		"Received quote request {} {}/{} -> {}/{}",
		request.amount,
		request.from_token_id,
		request.from_network_id,
		request.to_token_id,
		request.to_network_id
	);

	match state.aggregator.get_quote(&request).await {
		Ok(quote) => {
			info!(
				"Quote served by {} ({}{})",
				quote.provider(),
				quote.out_amount,
				if quote.is_indicative() { ", indicative" } else { "" }
			);
			(StatusCode::OK, Json(QuoteResponse::success(&request, &quote)))
		},
		Err(e) => {
			let code = e.code();
			if code.is_input_error() {
				info!("Rejected quote request: {}", e);
			} else {
				warn!("Quote request failed with {}: {}", code, e);
			}
			(
				status_for(code),
				Json(QuoteResponse::failure(&request, &e, state.debug)),
			)
		},
	}
}
