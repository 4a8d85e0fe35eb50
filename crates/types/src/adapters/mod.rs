//! Provider adapter contract and canonical quote models

use std::collections::HashMap;
use std::time::Duration;

use crate::models::SecretString;

pub mod errors;
pub mod models;
pub mod outcome;
pub mod traits;

pub use errors::{AdapterError, AdapterFactoryError};
pub use models::{
	FeeBreakdown, FeeItem, FeeKind, ProviderInfo, ProviderStep, QuoteInput, QuoteResult, Support,
};
pub use outcome::{ProviderError, ProviderOutcome};
pub use traits::ProviderAdapter;

/// Result types for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;
pub type AdapterFactoryResult<T> = Result<T, AdapterFactoryError>;

/// Minimal runtime configuration needed by adapters
///
/// Built from the provider settings; holds only what an adapter needs to
/// reach its upstream API.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRuntimeConfig {
	/// Provider identifier
	pub provider_id: String,

	/// Base URL of the provider API
	pub endpoint: String,

	/// Timeout for a single quote in milliseconds
	pub timeout_ms: u64,

	/// Optional API key, sent the way each provider expects
	pub api_key: Option<SecretString>,

	/// Optional custom HTTP headers for requests
	pub headers: Option<HashMap<String, String>>,
}

impl ProviderRuntimeConfig {
	pub fn new(provider_id: &str, endpoint: &str, timeout_ms: u64) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			endpoint: endpoint.trim_end_matches('/').to_string(),
			timeout_ms,
			api_key: None,
			headers: None,
		}
	}

	pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
		self.api_key = api_key.filter(|key| !key.is_empty());
		self
	}

	pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
		self.headers = Some(headers);
		self
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	/// Join a path onto the endpoint
	pub fn url(&self, path: &str) -> String {
		format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
	}
}
