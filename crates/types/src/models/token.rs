//! Token metadata models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token metadata as held by the asset registry.
///
/// `addresses` maps a network id to the token's contract address on that
/// network; an explicit `None` marks the token as the network's native asset.
/// A network missing from the map means the token is not available there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Token {
	pub id: String,
	pub symbol: String,
	pub name: String,
	/// Default decimals, used when no per-network override exists
	pub decimals: u8,
	#[serde(default)]
	pub addresses: HashMap<String, Option<String>>,
	/// Per-network decimal overrides (e.g., USDT uses 18 on BNB Chain)
	#[serde(default)]
	pub chain_decimals: HashMap<String, u8>,
	#[serde(default)]
	pub is_stablecoin: bool,
}

impl Token {
	pub fn new(id: &str, symbol: &str, name: &str, decimals: u8) -> Self {
		Self {
			id: id.to_string(),
			symbol: symbol.to_string(),
			name: name.to_string(),
			decimals,
			addresses: HashMap::new(),
			chain_decimals: HashMap::new(),
			is_stablecoin: false,
		}
	}

	pub fn stablecoin(mut self) -> Self {
		self.is_stablecoin = true;
		self
	}

	pub fn with_address(mut self, network_id: &str, address: &str) -> Self {
		self.addresses
			.insert(network_id.to_string(), Some(address.to_string()));
		self
	}

	pub fn with_native(mut self, network_id: &str) -> Self {
		self.addresses.insert(network_id.to_string(), None);
		self
	}

	pub fn with_chain_decimals(mut self, network_id: &str, decimals: u8) -> Self {
		self.chain_decimals.insert(network_id.to_string(), decimals);
		self
	}

	pub fn is_available_on(&self, network_id: &str) -> bool {
		self.addresses.contains_key(network_id)
	}

	pub fn is_native_on(&self, network_id: &str) -> bool {
		matches!(self.addresses.get(network_id), Some(None))
	}

	/// Decimals on a network: the per-network override wins over the default
	pub fn decimals_on(&self, network_id: &str) -> u8 {
		self.chain_decimals
			.get(network_id)
			.copied()
			.unwrap_or(self.decimals)
	}

	/// Whether two tokens represent the same asset for sanity-bound purposes
	pub fn same_symbol(&self, other: &Token) -> bool {
		normalize_symbol(&self.symbol) == normalize_symbol(&other.symbol)
	}
}

/// Strip bridged/wrapped decorations so "USDC.e" and "USDC" compare equal
pub fn normalize_symbol(symbol: &str) -> String {
	let upper = symbol.trim().to_ascii_uppercase();
	let upper = upper
		.strip_suffix(".E")
		.or_else(|| upper.strip_suffix(".B"))
		.unwrap_or(&upper)
		.to_string();
	match upper.as_str() {
		"WETH" => "ETH".to_string(),
		"WSOL" => "SOL".to_string(),
		"USDT0" => "USDT".to_string(),
		_ => upper,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_native_and_available_flags() {
		let eth = Token::new("eth", "ETH", "Ether", 18)
			.with_native("ethereum")
			.with_address("bsc", "0x2170Ed0880ac9A755fd29B2688956BD959F933F8");

		assert!(eth.is_native_on("ethereum"));
		assert!(!eth.is_native_on("bsc"));
		assert!(eth.is_available_on("bsc"));
		assert!(!eth.is_available_on("solana"));
	}

	#[test]
	fn test_chain_decimal_override() {
		let usdt = Token::new("usdt", "USDT", "Tether USD", 6)
			.with_address("bsc", "0x55d398326f99059fF775485246999027B3197955")
			.with_chain_decimals("bsc", 18);
		assert_eq!(usdt.decimals_on("bsc"), 18);
		assert_eq!(usdt.decimals_on("ethereum"), 6);
	}

	#[test]
	fn test_symbol_normalization() {
		assert_eq!(normalize_symbol("usdc.e"), "USDC");
		assert_eq!(normalize_symbol("WETH"), "ETH");
		assert_eq!(normalize_symbol(" usdt0 "), "USDT");

		let usdc = Token::new("usdc", "USDC", "USD Coin", 6);
		let bridged = Token::new("usdc-e", "USDC.e", "Bridged USDC", 6);
		assert!(usdc.same_symbol(&bridged));
	}
}
