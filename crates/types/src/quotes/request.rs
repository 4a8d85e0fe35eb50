//! Quote request model and validation

use serde::{Deserialize, Serialize};

use super::{QuoteError, QuoteValidationResult};
use crate::constants::limits::MAX_SLIPPAGE_BPS;

/// API request body for /api/v1/quotes
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	/// Human-readable decimal amount of the source token
	pub amount: String,
	pub from_token_id: String,
	pub to_token_id: String,
	pub from_network_id: String,
	pub to_network_id: String,
	/// Sender address; when absent the quote is indicative
	pub user_address: Option<String>,
	pub recipient: Option<String>,
	/// Client-supplied idempotency id, echoed back
	pub request_id: Option<String>,
	pub slippage_bps: Option<u32>,
	/// Client's view of the source decimals, checked against the registry
	pub from_decimals: Option<u8>,
	/// Client's view of the destination decimals, checked against the registry
	pub to_decimals: Option<u8>,
}

impl QuoteRequest {
	pub fn new(
		amount: &str,
		from_token_id: &str,
		from_network_id: &str,
		to_token_id: &str,
		to_network_id: &str,
	) -> Self {
		Self {
			amount: amount.to_string(),
			from_token_id: from_token_id.to_string(),
			to_token_id: to_token_id.to_string(),
			from_network_id: from_network_id.to_string(),
			to_network_id: to_network_id.to_string(),
			..Default::default()
		}
	}

	pub fn with_user(mut self, user_address: &str) -> Self {
		self.user_address = Some(user_address.to_string());
		self
	}

	/// User address after trimming; empty strings count as absent
	pub fn user(&self) -> Option<&str> {
		self.user_address
			.as_deref()
			.map(str::trim)
			.filter(|address| !address.is_empty())
	}

	/// Shape checks that need no registry access
	pub fn validate(&self) -> QuoteValidationResult<()> {
		if self.amount.trim().is_empty() {
			return Err(QuoteError::InvalidAmount {
				reason: "amount is required".to_string(),
			});
		}
		if self.from_token_id.trim().is_empty() {
			return Err(QuoteError::InvalidFromToken {
				reason: "fromTokenId is required".to_string(),
			});
		}
		if self.to_token_id.trim().is_empty() {
			return Err(QuoteError::InvalidToToken {
				reason: "toTokenId is required".to_string(),
			});
		}
		for network_id in [&self.from_network_id, &self.to_network_id] {
			if network_id.trim().is_empty() {
				return Err(QuoteError::UnsupportedNetwork {
					network_id: String::new(),
					reason: "network id is required".to_string(),
				});
			}
		}
		if let Some(slippage_bps) = self.slippage_bps {
			if slippage_bps > MAX_SLIPPAGE_BPS {
				return Err(QuoteError::InvalidAmount {
					reason: format!(
						"slippageBps {} exceeds maximum {}",
						slippage_bps, MAX_SLIPPAGE_BPS
					),
				});
			}
		}
		Ok(())
	}
}
