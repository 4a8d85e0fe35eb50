//! Asset registry listings

use axum::{
	extract::{Query, State},
	http::StatusCode,
	response::Json,
};
use serde::{Deserialize, Serialize};
use xswap_types::{Network, ResolvedToken, Token};

use crate::handlers::common::{ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworksResponse {
	pub networks: Vec<Network>,
	pub total_networks: usize,
}

/// GET /api/v1/networks
pub async fn get_networks(State(state): State<AppState>) -> Json<NetworksResponse> {
	let networks: Vec<Network> = state.assets.networks().into_iter().cloned().collect();
	Json(NetworksResponse {
		total_networks: networks.len(),
		networks,
	})
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensQuery {
	pub network_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
	pub tokens: Vec<Token>,
	/// Per-network resolution when filtered by network
	#[serde(skip_serializing_if = "Option::is_none")]
	pub resolved: Option<Vec<ResolvedToken>>,
	pub total_tokens: usize,
}

/// GET /api/v1/tokens?networkId= - Tokens, optionally only those on a network
pub async fn get_tokens(
	State(state): State<AppState>,
	Query(query): Query<TokensQuery>,
) -> Result<Json<TokensResponse>, ApiError> {
	let Some(network_id) = query.network_id.filter(|id| !id.trim().is_empty()) else {
		let tokens: Vec<Token> = state.assets.tokens().into_iter().cloned().collect();
		return Ok(Json(TokensResponse {
			total_tokens: tokens.len(),
			tokens,
			resolved: None,
		}));
	};

	if state.assets.network(&network_id).is_none() {
		return Err((
			StatusCode::NOT_FOUND,
			Json(ErrorResponse::new(
				"UNSUPPORTED_NETWORK",
				format!("Unknown network {}", network_id),
			)),
		));
	}

	let tokens: Vec<Token> = state
		.assets
		.tokens_on(&network_id)
		.into_iter()
		.cloned()
		.collect();
	let resolved = tokens
		.iter()
		.filter_map(|token| state.assets.resolve(&token.id, &network_id).ok())
		.collect();
	Ok(Json(TokensResponse {
		total_tokens: tokens.len(),
		tokens,
		resolved: Some(resolved),
	}))
}
