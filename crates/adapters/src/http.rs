//! Shared HTTP plumbing for provider adapters

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use xswap_types::{AdapterError, AdapterResult, ProviderRuntimeConfig};

use crate::client_cache::{build_client, AuthConfig, ClientCache, ClientConfig};

/// Largest upstream body an adapter will buffer
pub const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024;

/// Client strategy for provider adapters
#[derive(Debug, Clone)]
pub enum ClientStrategy {
	/// Use the client cache for connection pooling and reuse
	Cached(ClientCache),
	/// Create clients on-demand with no caching
	OnDemand,
}

impl ClientStrategy {
	/// Get an HTTP client for the given provider configuration
	pub fn client(
		&self,
		config: &ProviderRuntimeConfig,
		auth: &AuthConfig,
	) -> AdapterResult<Arc<Client>> {
		match self {
			ClientStrategy::Cached(cache) => cache.get_client_with_auth(config, auth),
			ClientStrategy::OnDemand => {
				let mut client_config = ClientConfig::from(config);
				auth.apply(&mut client_config);
				Ok(Arc::new(build_client(&client_config)?))
			},
		}
	}

	pub fn is_cached(&self) -> bool {
		matches!(self, ClientStrategy::Cached(_))
	}
}

/// Buffered upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
	pub status: u16,
	pub body: String,
}

impl UpstreamResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	pub fn json(&self) -> AdapterResult<Value> {
		serde_json::from_str(&self.body).map_err(|e| {
			AdapterError::invalid_response(format!("response is not valid JSON: {}", e))
		})
	}

	/// Case-insensitive search in the raw body, for provider error codes
	pub fn mentions(&self, needle: &str) -> bool {
		self.body
			.to_ascii_lowercase()
			.contains(&needle.to_ascii_lowercase())
	}

	pub fn into_error(self) -> AdapterError {
		AdapterError::from_http_failure(self.status, &self.body)
	}
}

/// Send a request and buffer the body. Transport failures become
/// [`AdapterError::HttpError`]; HTTP statuses are left to the caller.
/// Bodies over [`MAX_RESPONSE_BYTES`] are rejected as invalid responses.
pub async fn execute(request: RequestBuilder) -> AdapterResult<UpstreamResponse> {
	execute_with_limit(request, MAX_RESPONSE_BYTES).await
}

async fn execute_with_limit(
	request: RequestBuilder,
	limit: usize,
) -> AdapterResult<UpstreamResponse> {
	let mut response = request.send().await.map_err(AdapterError::HttpError)?;
	let status = response.status().as_u16();
	if response
		.content_length()
		.is_some_and(|length| length > limit as u64)
	{
		return Err(body_too_large(limit));
	}

	let mut buffered = Vec::new();
	while let Some(chunk) = response.chunk().await.map_err(AdapterError::HttpError)? {
		if buffered.len() + chunk.len() > limit {
			return Err(body_too_large(limit));
		}
		buffered.extend_from_slice(&chunk);
	}
	let body = String::from_utf8_lossy(&buffered).into_owned();
	debug!("Upstream answered HTTP {} ({} bytes)", status, body.len());
	Ok(UpstreamResponse { status, body })
}

fn body_too_large(limit: usize) -> AdapterError {
	AdapterError::invalid_response(format!("response body exceeds {} bytes", limit))
}
