//! In-memory asset registry
//!
//! The registry is the single source of truth for token decimals and
//! per-network addresses. Nothing downstream trusts decimals reported by a
//! provider; every base-unit conversion goes through [`AssetRegistry::decimals_for`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{AssetError, AssetResult};
use crate::constants::{
	is_zero_address, TON_NATIVE_ADDRESS, TRON_NATIVE_ADDRESS, WRAPPED_SOL_MINT, ZERO_ADDRESS,
};
use crate::models::{Family, Network, Token};

/// A token resolved against a concrete network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedToken {
	pub token_id: String,
	pub symbol: String,
	pub network_id: String,
	pub family: Family,
	pub chain_id: Option<u64>,
	/// Family-correct address; native assets use the family's native convention
	pub address: String,
	pub is_native: bool,
	pub decimals: u8,
	pub is_stablecoin: bool,
}

impl ResolvedToken {
	/// Chain id when the family has one, otherwise the network id
	pub fn chain_key(&self) -> String {
		match self.chain_id {
			Some(chain_id) => chain_id.to_string(),
			None => self.network_id.clone(),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
	networks: HashMap<String, Network>,
	tokens: HashMap<String, Token>,
	chain_index: HashMap<u64, String>,
}

impl AssetRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register_network(&mut self, network: Network) {
		if let Some(chain_id) = network.chain_id {
			self.chain_index.insert(chain_id, network.id.clone());
		}
		self.networks.insert(network.id.to_ascii_lowercase(), network);
	}

	pub fn register_token(&mut self, token: Token) {
		self.tokens.insert(token.id.to_ascii_lowercase(), token);
	}

	pub fn with_network(mut self, network: Network) -> Self {
		self.register_network(network);
		self
	}

	pub fn with_token(mut self, token: Token) -> Self {
		self.register_token(token);
		self
	}

	pub fn network(&self, network_id: &str) -> Option<&Network> {
		self.networks.get(&network_id.trim().to_ascii_lowercase())
	}

	pub fn network_by_chain_id(&self, chain_id: u64) -> Option<&Network> {
		self.chain_index
			.get(&chain_id)
			.and_then(|id| self.network(id))
	}

	pub fn token(&self, token_id: &str) -> Option<&Token> {
		self.tokens.get(&token_id.trim().to_ascii_lowercase())
	}

	/// All networks ordered by id
	pub fn networks(&self) -> Vec<&Network> {
		let mut networks: Vec<&Network> = self.networks.values().collect();
		networks.sort_by(|a, b| a.id.cmp(&b.id));
		networks
	}

	/// All tokens ordered by id
	pub fn tokens(&self) -> Vec<&Token> {
		let mut tokens: Vec<&Token> = self.tokens.values().collect();
		tokens.sort_by(|a, b| a.id.cmp(&b.id));
		tokens
	}

	pub fn tokens_on(&self, network_id: &str) -> Vec<&Token> {
		let network_id = network_id.trim().to_ascii_lowercase();
		self.tokens()
			.into_iter()
			.filter(|token| token.is_available_on(&network_id))
			.collect()
	}

	/// Family of a network. Total: unknown ids are `Unsupported`, never EVM.
	pub fn family_of(&self, network_id: &str) -> Family {
		self.network(network_id)
			.map(|network| network.family)
			.unwrap_or(Family::Unsupported)
	}

	/// Decimals of a token on a network, applying per-network overrides
	pub fn decimals_for(&self, token_id: &str, network_id: &str) -> AssetResult<u8> {
		let network = self.supported_network(network_id)?;
		let token = self.available_token(token_id, network)?;
		Ok(token.decimals_on(&network.id))
	}

	/// Family-correct address of a token on a network
	pub fn resolve_address(&self, token_id: &str, network_id: &str) -> AssetResult<String> {
		self.resolve(token_id, network_id).map(|resolved| resolved.address)
	}

	/// Resolve a token against a network.
	///
	/// Native assets resolve to the zero address on EVM and to the family's own
	/// native convention elsewhere. A configured address equal to the EVM zero
	/// address is always a mapping bug: native tokens must be declared as native.
	pub fn resolve(&self, token_id: &str, network_id: &str) -> AssetResult<ResolvedToken> {
		let network = self.supported_network(network_id)?;
		let token = self.available_token(token_id, network)?;

		let mapping_bug = |reason: &str| AssetError::AddressMappingBug {
			token_id: token.id.clone(),
			network_id: network.id.clone(),
			reason: reason.to_string(),
		};

		let (address, is_native) = match token.addresses.get(&network.id) {
			Some(None) => (native_address(network.family).to_string(), true),
			Some(Some(address)) => {
				let address = address.trim();
				if address.is_empty() {
					return Err(mapping_bug("empty contract address"));
				}
				if is_zero_address(address) {
					let reason = if network.family.is_evm() {
						"non-native token mapped to the zero address"
					} else {
						"EVM zero address used on a non-EVM family"
					};
					return Err(mapping_bug(reason));
				}
				(address.to_string(), false)
			},
			None => {
				return Err(AssetError::TokenNotOnNetwork {
					token_id: token.id.clone(),
					network_id: network.id.clone(),
				})
			},
		};

		Ok(ResolvedToken {
			token_id: token.id.clone(),
			symbol: token.symbol.clone(),
			network_id: network.id.clone(),
			family: network.family,
			chain_id: network.chain_id,
			address,
			is_native,
			decimals: token.decimals_on(&network.id),
			is_stablecoin: token.is_stablecoin,
		})
	}

	fn supported_network(&self, network_id: &str) -> AssetResult<&Network> {
		let network = self
			.network(network_id)
			.ok_or_else(|| AssetError::UnknownNetwork {
				network_id: network_id.to_string(),
			})?;
		if !network.family.is_supported() {
			return Err(AssetError::UnsupportedFamily {
				network_id: network.id.clone(),
			});
		}
		Ok(network)
	}

	fn available_token<'a>(&'a self, token_id: &str, network: &Network) -> AssetResult<&'a Token> {
		let token = self
			.token(token_id)
			.ok_or_else(|| AssetError::UnknownToken {
				token_id: token_id.to_string(),
			})?;
		if !token.is_available_on(&network.id) {
			return Err(AssetError::TokenNotOnNetwork {
				token_id: token.id.clone(),
				network_id: network.id.clone(),
			});
		}
		Ok(token)
	}
}

fn native_address(family: Family) -> &'static str {
	match family {
		Family::Evm => ZERO_ADDRESS,
		Family::Solana => WRAPPED_SOL_MINT,
		Family::Ton => TON_NATIVE_ADDRESS,
		Family::Tron => TRON_NATIVE_ADDRESS,
		// rejected by supported_network before we get here
		Family::Unsupported => "",
	}
}
