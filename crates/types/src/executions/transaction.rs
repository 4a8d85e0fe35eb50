//! Family-specific unsigned transaction payloads

use serde::{Deserialize, Serialize};

use crate::models::Family;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TonMessage {
	pub address: String,
	/// Nanotons as a decimal string
	pub amount: String,
	/// Base64 BOC payload
	pub payload: Option<String>,
}

/// Transaction handed to the client's wallet for signing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "family", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnsignedTransaction {
	#[serde(rename_all = "camelCase")]
	Evm {
		chain_id: u64,
		from: String,
		to: String,
		data: String,
		/// Wei as a decimal string
		value: String,
		gas_limit: Option<String>,
	},
	#[serde(rename_all = "camelCase")]
	Solana {
		signer: String,
		/// Base64 serialized versioned transaction
		transaction: String,
	},
	#[serde(rename_all = "camelCase")]
	Ton {
		signer: String,
		messages: Vec<TonMessage>,
		valid_until: Option<i64>,
	},
	#[serde(rename_all = "camelCase")]
	Tron {
		signer: String,
		raw_data_hex: Option<String>,
		raw_data: Option<serde_json::Value>,
	},
}

impl UnsignedTransaction {
	pub fn family(&self) -> Family {
		match self {
			UnsignedTransaction::Evm { .. } => Family::Evm,
			UnsignedTransaction::Solana { .. } => Family::Solana,
			UnsignedTransaction::Ton { .. } => Family::Ton,
			UnsignedTransaction::Tron { .. } => Family::Tron,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_payload_is_tagged_by_family() {
		let tx = UnsignedTransaction::Evm {
			chain_id: 42161,
			from: "0x1".into(),
			to: "0x2".into(),
			data: "0x".into(),
			value: "0".into(),
			gas_limit: None,
		};
		let json = serde_json::to_value(&tx).unwrap();
		assert_eq!(json["family"], "EVM");
		assert_eq!(json["chainId"], 42161);
		assert_eq!(tx.family(), Family::Evm);
	}
}
