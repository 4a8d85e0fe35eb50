//! Error types for adapter operations

use thiserror::Error;

use crate::errors::ErrorCode;

/// Adapter operation errors
///
/// These never cross the adapter boundary as errors: the default
/// [`ProviderAdapter::quote`](super::ProviderAdapter::quote) turns them into
/// [`ProviderOutcome`](super::ProviderOutcome) data.
#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("HTTP request failed: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("HTTP {status_code}: {reason}")]
	HttpStatusError { status_code: u16, reason: String },

	#[error("Timeout occurred after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },

	#[error("Response carries no non-zero output amount")]
	MissingOutputAmount,

	/// The provider cannot serve this pair at any amount (unknown chain, token
	/// or family); the fan-out skips it and remembers the pair
	#[error("Unsupported pair: {reason}")]
	UnsupportedPair { reason: String },

	/// The provider found no route for this request. Depends on amount and
	/// liquidity, so it is never remembered per pair.
	#[error("No route: {reason}")]
	NoRoute { reason: String },

	/// The provider understood the request but declined it (amount limits etc.)
	#[error("Provider rejected the request: {reason}")]
	Rejected { reason: String },

	#[error("API key required for provider {provider_id}")]
	ApiKeyRequired { provider_id: String },

	#[error("Configuration error: {reason}")]
	ConfigError { reason: String },

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Network error: {0}")]
	Network(String),
}

impl AdapterError {
	/// Extract HTTP status code from the error if available
	pub fn status_code(&self) -> Option<u16> {
		match self {
			AdapterError::HttpStatusError { status_code, .. } => Some(*status_code),
			AdapterError::HttpError(reqwest_error) => {
				reqwest_error.status().map(|status| status.as_u16())
			},
			_ => None,
		}
	}

	pub fn unsupported(reason: impl Into<String>) -> Self {
		Self::UnsupportedPair {
			reason: reason.into(),
		}
	}

	pub fn no_route(reason: impl Into<String>) -> Self {
		Self::NoRoute {
			reason: reason.into(),
		}
	}

	pub fn invalid_response(reason: impl Into<String>) -> Self {
		Self::InvalidResponse {
			reason: reason.into(),
		}
	}

	/// Create an HTTP failure error from response status, keeping a short body excerpt
	pub fn from_http_failure(status_code: u16, body: &str) -> Self {
		let reason = match status_code {
			400 => "Bad Request",
			401 => "Unauthorized",
			403 => "Forbidden",
			404 => "Not Found",
			408 => "Request Timeout",
			429 => "Too Many Requests",
			500 => "Internal Server Error",
			502 => "Bad Gateway",
			503 => "Service Unavailable",
			504 => "Gateway Timeout",
			_ => "HTTP Error",
		};
		let excerpt: String = body.chars().take(200).collect();
		let reason = if excerpt.trim().is_empty() {
			reason.to_string()
		} else {
			format!("{} - {}", reason, excerpt.trim())
		};

		Self::HttpStatusError {
			status_code,
			reason,
		}
	}

	/// Map the error onto the provider-level error taxonomy
	pub fn classify(&self) -> ErrorCode {
		match self {
			AdapterError::Timeout { .. } => ErrorCode::Timeout,
			AdapterError::HttpError(error) if error.is_timeout() => ErrorCode::Timeout,
			AdapterError::HttpError(error) if error.is_decode() => ErrorCode::InvalidResponse,
			AdapterError::HttpError(error) => match error.status() {
				Some(status) => status_code_class(status.as_u16()),
				None => ErrorCode::NetworkError,
			},
			AdapterError::HttpStatusError { status_code, .. } => status_code_class(*status_code),
			AdapterError::InvalidResponse { .. }
			| AdapterError::MissingOutputAmount
			| AdapterError::Serialization(_) => ErrorCode::InvalidResponse,
			AdapterError::UnsupportedPair { .. } | AdapterError::NoRoute { .. } => ErrorCode::NoRoute,
			AdapterError::ApiKeyRequired { .. } => ErrorCode::ApiKeyRequired,
			AdapterError::Rejected { .. } | AdapterError::ConfigError { .. } => ErrorCode::ApiError,
			AdapterError::Network(_) => ErrorCode::NetworkError,
		}
	}
}

fn status_code_class(status_code: u16) -> ErrorCode {
	match status_code {
		401 | 403 => ErrorCode::ApiKeyRequired,
		408 | 504 => ErrorCode::Timeout,
		_ => ErrorCode::ApiError,
	}
}

/// Factory-specific errors
#[derive(Error, Debug)]
pub enum AdapterFactoryError {
	#[error("Unknown adapter type: {adapter_type}")]
	UnknownAdapterType { adapter_type: String },

	#[error("Failed to create adapter: {adapter_type} - {reason}")]
	CreationFailed {
		adapter_type: String,
		reason: String,
	},

	#[error("Adapter already registered: {adapter_id}")]
	AlreadyRegistered { adapter_id: String },
}
