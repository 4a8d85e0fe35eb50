//! Execution handlers
//!
//! Clients sign and broadcast each step themselves, then report the hash back
//! and poll until the chain confirms it.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use xswap_types::{ExecutionResponse, Family, RoutePlan};

use crate::handlers::common::{execution_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExecutionRequest {
	pub plan: RoutePlan,
	#[serde(default)]
	pub wallets: BTreeMap<Family, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStepRequest {
	pub tx_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailStepRequest {
	#[serde(default)]
	pub reason: Option<String>,
}

/// POST /api/v1/executions - Start executing a plan
pub async fn post_executions(
	State(state): State<AppState>,
	Json(request): Json<CreateExecutionRequest>,
) -> Result<(StatusCode, Json<ExecutionResponse>), ApiError> {
	info!(
		"Creating execution for plan {} ({} steps)",
		request.plan.id,
		request.plan.steps.len()
	);
	let execution = state
		.executions
		.create_execution(request.plan, request.wallets)
		.await
		.map_err(|e| execution_error(&e, state.debug))?;
	Ok((StatusCode::CREATED, Json(ExecutionResponse::from(&execution))))
}

/// GET /api/v1/executions/{id}
pub async fn get_execution(
	State(state): State<AppState>,
	Path(execution_id): Path<String>,
) -> Result<Json<ExecutionResponse>, ApiError> {
	debug!("Fetching execution {}", execution_id);
	let execution = state
		.executions
		.get_execution(&execution_id)
		.await
		.map_err(|e| execution_error(&e, state.debug))?;
	Ok(Json(ExecutionResponse::from(&execution)))
}

/// POST /api/v1/executions/{id}/steps/{index}/submit - Record a broadcast hash
pub async fn submit_step(
	State(state): State<AppState>,
	Path((execution_id, index)): Path<(String, usize)>,
	Json(request): Json<SubmitStepRequest>,
) -> Result<Json<ExecutionResponse>, ApiError> {
	let execution = state
		.executions
		.submit_step(&execution_id, index, &request.tx_hash)
		.await
		.map_err(|e| execution_error(&e, state.debug))?;
	Ok(Json(ExecutionResponse::from(&execution)))
}

/// POST /api/v1/executions/{id}/steps/{index}/fail - Client-side rejection
pub async fn fail_step(
	State(state): State<AppState>,
	Path((execution_id, index)): Path<(String, usize)>,
	Json(request): Json<FailStepRequest>,
) -> Result<Json<ExecutionResponse>, ApiError> {
	let reason = request
		.reason
		.filter(|r| !r.trim().is_empty())
		.unwrap_or_else(|| "rejected by user".to_string());
	let execution = state
		.executions
		.fail_step(&execution_id, index, &reason)
		.await
		.map_err(|e| execution_error(&e, state.debug))?;
	Ok(Json(ExecutionResponse::from(&execution)))
}

/// POST /api/v1/executions/{id}/poll - Check chain status of submitted steps
pub async fn poll_execution(
	State(state): State<AppState>,
	Path(execution_id): Path<String>,
) -> Result<Json<ExecutionResponse>, ApiError> {
	let execution = state
		.executions
		.poll_execution_status(&execution_id)
		.await
		.map_err(|e| execution_error(&e, state.debug))?;
	Ok(Json(ExecutionResponse::from(&execution)))
}
