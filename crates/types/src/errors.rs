//! Wire-level error code taxonomy shared by quotes, routes and providers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable machine-readable error code returned to callers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	// Input errors
	InvalidAmount,
	UnsupportedNetwork,
	InvalidFromToken,
	InvalidToToken,
	TokenAddressMappingBug,
	TokenDecimalsMismatch,

	// Quote integrity
	DecimalsMismatchSuspected,
	SuspiciousQuote,
	SuspiciousQuoteHighOutput,

	// Routing
	NoRoute,
	AdapterMissing,
	WalletMissingForRoute,

	// Provider level
	Timeout,
	NetworkError,
	InvalidResponse,
	ApiError,
	ProviderDisabled,
	ApiKeyRequired,

	// Execution
	ExecutionNotFound,
	InvalidStepTransition,
}

impl ErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorCode::InvalidAmount => "INVALID_AMOUNT",
			ErrorCode::UnsupportedNetwork => "UNSUPPORTED_NETWORK",
			ErrorCode::InvalidFromToken => "INVALID_FROM_TOKEN",
			ErrorCode::InvalidToToken => "INVALID_TO_TOKEN",
			ErrorCode::TokenAddressMappingBug => "TOKEN_ADDRESS_MAPPING_BUG",
			ErrorCode::TokenDecimalsMismatch => "TOKEN_DECIMALS_MISMATCH",
			ErrorCode::DecimalsMismatchSuspected => "DECIMALS_MISMATCH_SUSPECTED",
			ErrorCode::SuspiciousQuote => "SUSPICIOUS_QUOTE",
			ErrorCode::SuspiciousQuoteHighOutput => "SUSPICIOUS_QUOTE_HIGH_OUTPUT",
			ErrorCode::NoRoute => "NO_ROUTE",
			ErrorCode::AdapterMissing => "ADAPTER_MISSING",
			ErrorCode::WalletMissingForRoute => "WALLET_MISSING_FOR_ROUTE",
			ErrorCode::Timeout => "TIMEOUT",
			ErrorCode::NetworkError => "NETWORK_ERROR",
			ErrorCode::InvalidResponse => "INVALID_RESPONSE",
			ErrorCode::ApiError => "API_ERROR",
			ErrorCode::ProviderDisabled => "PROVIDER_DISABLED",
			ErrorCode::ApiKeyRequired => "API_KEY_REQUIRED",
			ErrorCode::ExecutionNotFound => "EXECUTION_NOT_FOUND",
			ErrorCode::InvalidStepTransition => "INVALID_STEP_TRANSITION",
		}
	}

	/// Errors caused by the caller's request rather than by upstream state
	pub fn is_input_error(&self) -> bool {
		matches!(
			self,
			ErrorCode::InvalidAmount
				| ErrorCode::UnsupportedNetwork
				| ErrorCode::InvalidFromToken
				| ErrorCode::InvalidToToken
				| ErrorCode::TokenAddressMappingBug
				| ErrorCode::TokenDecimalsMismatch
		)
	}

	/// Errors produced while rejecting a provider quote
	pub fn is_integrity_error(&self) -> bool {
		matches!(
			self,
			ErrorCode::DecimalsMismatchSuspected
				| ErrorCode::SuspiciousQuote
				| ErrorCode::SuspiciousQuoteHighOutput
		)
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
