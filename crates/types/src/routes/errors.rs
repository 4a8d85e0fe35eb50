//! Error types for route planning

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::StepKind;
use crate::errors::ErrorCode;
use crate::models::Family;
use crate::quotes::QuoteError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LegStatus {
	Quoted,
	Failed,
	Offchain,
	Unquoted,
	NotAttempted,
}

/// Trail entry describing what the planner tried for one leg
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegAttempt {
	pub index: usize,
	pub kind: StepKind,
	pub from_network: String,
	pub to_network: String,
	pub from_token: String,
	pub to_token: String,
	pub status: LegStatus,
	pub provider: Option<String>,
	pub error_code: Option<ErrorCode>,
	pub message: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutePlanError {
	/// Request-level failure from quote resolution or a same-family quote
	#[error(transparent)]
	Quote(#[from] QuoteError),

	#[error("No route from {from} to {to}")]
	NoRoute { from: Family, to: Family },

	#[error("No adapter can serve {missing:?}")]
	AdapterMissing {
		missing: Vec<String>,
		trail: Vec<LegAttempt>,
	},

	#[error("Leg {leg} failed: {error}")]
	LegFailed {
		leg: usize,
		error: QuoteError,
		trail: Vec<LegAttempt>,
		missing_adapters: Vec<String>,
	},

	#[error("Route requires wallets for {missing:?}")]
	WalletMissing {
		required: Vec<Family>,
		missing: Vec<Family>,
	},
}

impl RoutePlanError {
	pub fn code(&self) -> ErrorCode {
		match self {
			RoutePlanError::Quote(error) => error.code(),
			RoutePlanError::NoRoute { .. } => ErrorCode::NoRoute,
			RoutePlanError::AdapterMissing { .. } => ErrorCode::AdapterMissing,
			RoutePlanError::LegFailed { error, .. } => {
				if error.is_input_error() {
					error.code()
				} else {
					ErrorCode::NoRoute
				}
			},
			RoutePlanError::WalletMissing { .. } => ErrorCode::WalletMissingForRoute,
		}
	}

	pub fn trail(&self) -> &[LegAttempt] {
		match self {
			RoutePlanError::AdapterMissing { trail, .. } | RoutePlanError::LegFailed { trail, .. } => {
				trail
			},
			_ => &[],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_leg_failure_code() {
		let error = RoutePlanError::LegFailed {
			leg: 1,
			error: QuoteError::no_route("all providers failed"),
			trail: vec![],
			missing_adapters: vec!["bridge solana -> arbitrum".into()],
		};
		assert_eq!(error.code(), ErrorCode::NoRoute);

		let error = RoutePlanError::WalletMissing {
			required: vec![Family::Evm, Family::Solana],
			missing: vec![Family::Solana],
		};
		assert_eq!(error.code(), ErrorCode::WalletMissingForRoute);
	}
}
