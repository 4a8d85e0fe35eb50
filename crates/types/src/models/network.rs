//! Blockchain network models

use serde::{Deserialize, Serialize};

use super::Family;

/// A network known to the asset registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Network {
	/// Registry identifier (e.g., "ethereum", "bsc", "solana")
	pub id: String,
	/// Human-readable name
	pub name: String,
	/// Family classification
	pub family: Family,
	/// Numeric chain ID; `None` for chainless families (Solana, TON, TRON)
	pub chain_id: Option<u64>,
	/// Symbol of the native gas token
	pub native_symbol: String,
}

impl Network {
	pub fn new(
		id: impl Into<String>,
		name: impl Into<String>,
		family: Family,
		chain_id: Option<u64>,
		native_symbol: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			family,
			chain_id,
			native_symbol: native_symbol.into(),
		}
	}

	pub fn evm(id: &str, name: &str, chain_id: u64, native_symbol: &str) -> Self {
		Self::new(id, name, Family::Evm, Some(chain_id), native_symbol)
	}

	/// Stable key used for caching: the chain id when the family has one,
	/// otherwise the registry id.
	pub fn chain_key(&self) -> String {
		match self.chain_id {
			Some(chain_id) => chain_id.to_string(),
			None => self.id.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_key_prefers_chain_id() {
		let bsc = Network::evm("bsc", "BNB Chain", 56, "BNB");
		assert_eq!(bsc.chain_key(), "56");

		let solana = Network::new("solana", "Solana", Family::Solana, None, "SOL");
		assert_eq!(solana.chain_key(), "solana");
	}
}
