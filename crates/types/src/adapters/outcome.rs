//! Provider outcomes: failures and skips are data, never panics or errors

use serde::{Deserialize, Serialize};

use super::{AdapterError, QuoteResult};
use crate::errors::ErrorCode;

/// Diagnostic record of a failed provider call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderError {
	pub provider: String,
	pub message: String,
	pub code: Option<ErrorCode>,
	pub http_status: Option<u16>,
	pub url: Option<String>,
	pub request: Option<serde_json::Value>,
}

impl ProviderError {
	pub fn new(provider: &str, code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			provider: provider.to_string(),
			message: message.into(),
			code: Some(code),
			http_status: None,
			url: None,
			request: None,
		}
	}

	pub fn from_adapter_error(provider: &str, error: &AdapterError) -> Self {
		Self {
			provider: provider.to_string(),
			message: error.to_string(),
			code: Some(error.classify()),
			http_status: error.status_code(),
			url: match error {
				AdapterError::HttpError(e) => e.url().map(|url| url.to_string()),
				_ => None,
			},
			request: None,
		}
	}

	pub fn timeout(provider: &str, timeout_ms: u64) -> Self {
		Self::new(
			provider,
			ErrorCode::Timeout,
			format!("provider did not answer within {}ms", timeout_ms),
		)
	}

	pub fn is_timeout(&self) -> bool {
		self.code == Some(ErrorCode::Timeout)
	}
}

/// Tagged result of a single provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
	Quoted(QuoteResult),
	/// The provider does not serve this input; not an error
	Skipped { provider: String, reason: String },
	Failed(ProviderError),
}

impl ProviderOutcome {
	pub fn provider(&self) -> &str {
		match self {
			ProviderOutcome::Quoted(result) => &result.provider,
			ProviderOutcome::Skipped { provider, .. } => provider,
			ProviderOutcome::Failed(error) => &error.provider,
		}
	}

	pub fn is_quoted(&self) -> bool {
		matches!(self, ProviderOutcome::Quoted(_))
	}
}
