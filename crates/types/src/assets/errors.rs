//! Error types for asset registry lookups

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
	#[error("Unknown network: {network_id}")]
	UnknownNetwork { network_id: String },

	#[error("Network {network_id} belongs to an unsupported family")]
	UnsupportedFamily { network_id: String },

	#[error("Unknown token: {token_id}")]
	UnknownToken { token_id: String },

	#[error("Token {token_id} is not available on {network_id}")]
	TokenNotOnNetwork {
		token_id: String,
		network_id: String,
	},

	#[error("Address mapping bug for {token_id} on {network_id}: {reason}")]
	AddressMappingBug {
		token_id: String,
		network_id: String,
		reason: String,
	},
}

pub type AssetResult<T> = Result<T, AssetError>;
