//! Error types for quote operations

use thiserror::Error;

use crate::adapters::ProviderError;
use crate::assets::AssetError;
use crate::errors::ErrorCode;

/// Which side of the pair an input error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	From,
	To,
}

/// Quote-level errors. `Clone` because a single coalesced computation hands
/// the same outcome to every waiting caller and to the no-route cache.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
	#[error("Invalid amount: {reason}")]
	InvalidAmount { reason: String },

	#[error("Unsupported network {network_id}: {reason}")]
	UnsupportedNetwork { network_id: String, reason: String },

	#[error("Invalid source token: {reason}")]
	InvalidFromToken { reason: String },

	#[error("Invalid destination token: {reason}")]
	InvalidToToken { reason: String },

	#[error("Token address mapping bug: {reason}")]
	TokenAddressMappingBug { reason: String },

	#[error("Decimals for {token_id} on {network_id} are {expected}, request says {provided}")]
	TokenDecimalsMismatch {
		token_id: String,
		network_id: String,
		expected: u8,
		provided: u8,
	},

	#[error("Quote from {provider} looks like a decimals mismatch (output/input ratio {ratio:e})")]
	DecimalsMismatchSuspected { provider: String, ratio: f64 },

	#[error("Quote from {provider} is implausibly low (output/input ratio {ratio})")]
	SuspiciousQuote { provider: String, ratio: f64 },

	#[error("Quote from {provider} returns more than it takes (output/input ratio {ratio})")]
	SuspiciousQuoteHighOutput { provider: String, ratio: f64 },

	#[error("No route found: {reason}")]
	NoRoute {
		reason: String,
		provider_errors: Vec<ProviderError>,
	},

	#[error("Internal error: {reason}")]
	Internal { reason: String },
}

impl QuoteError {
	pub fn code(&self) -> ErrorCode {
		match self {
			QuoteError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
			QuoteError::UnsupportedNetwork { .. } => ErrorCode::UnsupportedNetwork,
			QuoteError::InvalidFromToken { .. } => ErrorCode::InvalidFromToken,
			QuoteError::InvalidToToken { .. } => ErrorCode::InvalidToToken,
			QuoteError::TokenAddressMappingBug { .. } => ErrorCode::TokenAddressMappingBug,
			QuoteError::TokenDecimalsMismatch { .. } => ErrorCode::TokenDecimalsMismatch,
			QuoteError::DecimalsMismatchSuspected { .. } => ErrorCode::DecimalsMismatchSuspected,
			QuoteError::SuspiciousQuote { .. } => ErrorCode::SuspiciousQuote,
			QuoteError::SuspiciousQuoteHighOutput { .. } => ErrorCode::SuspiciousQuoteHighOutput,
			QuoteError::NoRoute { .. } => ErrorCode::NoRoute,
			QuoteError::Internal { .. } => ErrorCode::ApiError,
		}
	}

	pub fn no_route(reason: impl Into<String>) -> Self {
		QuoteError::NoRoute {
			reason: reason.into(),
			provider_errors: Vec::new(),
		}
	}

	pub fn internal(reason: impl Into<String>) -> Self {
		QuoteError::Internal {
			reason: reason.into(),
		}
	}

	pub fn is_input_error(&self) -> bool {
		self.code().is_input_error()
	}

	pub fn provider_errors(&self) -> &[ProviderError] {
		match self {
			QuoteError::NoRoute {
				provider_errors, ..
			} => provider_errors,
			_ => &[],
		}
	}

	/// Map a registry failure onto the side of the request it came from
	pub fn from_asset(error: AssetError, side: Side) -> Self {
		match error {
			AssetError::UnknownNetwork { network_id } => QuoteError::UnsupportedNetwork {
				network_id,
				reason: "unknown network".to_string(),
			},
			AssetError::UnsupportedFamily { network_id } => QuoteError::UnsupportedNetwork {
				network_id,
				reason: "network family is not supported".to_string(),
			},
			AssetError::AddressMappingBug { .. } => QuoteError::TokenAddressMappingBug {
				reason: error.to_string(),
			},
			AssetError::UnknownToken { .. } | AssetError::TokenNotOnNetwork { .. } => {
				let reason = error.to_string();
				match side {
					Side::From => QuoteError::InvalidFromToken { reason },
					Side::To => QuoteError::InvalidToToken { reason },
				}
			},
		}
	}
}
