use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::handlers::{
	fail_step, get_execution, get_networks, get_providers, get_quotes, get_tokens, health,
	poll_execution, post_executions, post_quotes, post_routes, ready, submit_step,
};
use crate::rate_limit::{enforce_rate_limit, RateLimiter};
use crate::security::add_security_headers;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

// State is applied at the application level using `.with_state(...)`.
pub fn create_router() -> Router<AppState> {
	create_router_with_rate_limit(None)
}

/// Router with the `/api/v1` routes optionally rate limited. Probes are
/// never limited.
pub fn create_router_with_rate_limit(limiter: Option<Arc<RateLimiter>>) -> Router<AppState> {
	let cors = CorsLayer::permissive();
	let body_limit = RequestBodyLimitLayer::new(MAX_BODY_BYTES);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let mut api = Router::new()
		.route("/api/v1/quotes", post(post_quotes).get(get_quotes))
		.route("/api/v1/quotes/", post(post_quotes).get(get_quotes))
		.route("/api/v1/routes", post(post_routes))
		.route("/api/v1/routes/", post(post_routes))
		.route("/api/v1/executions", post(post_executions))
		.route("/api/v1/executions/", post(post_executions))
		.route("/api/v1/executions/{id}", get(get_execution))
		.route("/api/v1/executions/{id}/", get(get_execution))
		.route("/api/v1/executions/{id}/poll", post(poll_execution))
		.route(
			"/api/v1/executions/{id}/steps/{index}/submit",
			post(submit_step),
		)
		.route("/api/v1/executions/{id}/steps/{index}/fail", post(fail_step))
		.route("/api/v1/providers", get(get_providers))
		.route("/api/v1/providers/", get(get_providers))
		.route("/api/v1/networks", get(get_networks))
		.route("/api/v1/networks/", get(get_networks))
		.route("/api/v1/tokens", get(get_tokens))
		.route("/api/v1/tokens/", get(get_tokens));
	if let Some(limiter) = limiter {
		api = api.layer(middleware::from_fn_with_state(limiter, enforce_rate_limit));
	}

	let router = Router::new()
		.route("/health", get(health))
		.route("/health/", get(health))
		.route("/ready", get(ready))
		.route("/ready/", get(ready))
		.merge(api)
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id)
		.layer(body_limit);

	add_security_headers(router)
}
