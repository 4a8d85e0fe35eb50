//! Built-in network and token catalogue

use super::AssetRegistry;
use crate::models::{Family, Network, Token};

pub fn builtin_networks() -> Vec<Network> {
	vec![
		Network::evm("ethereum", "Ethereum", 1, "ETH"),
		Network::evm("arbitrum", "Arbitrum One", 42161, "ETH"),
		Network::evm("optimism", "OP Mainnet", 10, "ETH"),
		Network::evm("base", "Base", 8453, "ETH"),
		Network::evm("polygon", "Polygon PoS", 137, "POL"),
		Network::evm("bsc", "BNB Chain", 56, "BNB"),
		Network::evm("avalanche", "Avalanche C-Chain", 43114, "AVAX"),
		Network::new("solana", "Solana", Family::Solana, None, "SOL"),
		Network::new("ton", "TON", Family::Ton, None, "TON"),
		Network::new("tron", "TRON", Family::Tron, None, "TRX"),
	]
}

pub fn builtin_tokens() -> Vec<Token> {
	vec![
		Token::new("eth", "ETH", "Ether", 18)
			.with_native("ethereum")
			.with_native("arbitrum")
			.with_native("optimism")
			.with_native("base"),
		Token::new("weth", "WETH", "Wrapped Ether", 18)
			.with_address("ethereum", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")
			.with_address("arbitrum", "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1")
			.with_address("optimism", "0x4200000000000000000000000000000000000006")
			.with_address("base", "0x4200000000000000000000000000000000000006"),
		Token::new("usdc", "USDC", "USD Coin", 6)
			.stablecoin()
			.with_address("ethereum", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")
			.with_address("arbitrum", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831")
			.with_address("optimism", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85")
			.with_address("base", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913")
			.with_address("polygon", "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359")
			.with_address("bsc", "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d")
			.with_chain_decimals("bsc", 18)
			.with_address("avalanche", "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E")
			.with_address("solana", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
		Token::new("usdt", "USDT", "Tether USD", 6)
			.stablecoin()
			.with_address("ethereum", "0xdAC17F958D2ee523a2206206994597C13D831ec7")
			.with_address("arbitrum", "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9")
			.with_address("optimism", "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58")
			.with_address("polygon", "0xc2132D05D31c914a87C6611C10748AEb04B58e8F")
			.with_address("bsc", "0x55d398326f99059fF775485246999027B3197955")
			.with_chain_decimals("bsc", 18)
			.with_address("avalanche", "0x9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7")
			.with_address("solana", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB")
			.with_address("ton", "EQCxE6mUtQJKFnGfaROTKOt1lZbDiiX1kCixRv7Nw2Id_sDs")
			.with_address("tron", "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"),
		Token::new("dai", "DAI", "Dai Stablecoin", 18)
			.stablecoin()
			.with_address("ethereum", "0x6B175474E89094C44Da98b954EedeAC495271d0F")
			.with_address("arbitrum", "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1")
			.with_address("optimism", "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1"),
		Token::new("bnb", "BNB", "BNB", 18).with_native("bsc"),
		Token::new("pol", "POL", "Polygon Ecosystem Token", 18).with_native("polygon"),
		Token::new("avax", "AVAX", "Avalanche", 18).with_native("avalanche"),
		Token::new("sol", "SOL", "Solana", 9).with_native("solana"),
		Token::new("ton", "TON", "Toncoin", 9).with_native("ton"),
		Token::new("trx", "TRX", "TRON", 6).with_native("tron"),
	]
}

impl AssetRegistry {
	/// Registry pre-populated with the built-in catalogue
	pub fn builtin() -> Self {
		let mut registry = AssetRegistry::new();
		for network in builtin_networks() {
			registry.register_network(network);
		}
		for token in builtin_tokens() {
			registry.register_token(token);
		}
		registry
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_every_token_address_targets_a_known_network() {
		let networks: Vec<String> = builtin_networks().into_iter().map(|n| n.id).collect();
		for token in builtin_tokens() {
			for network_id in token.addresses.keys() {
				assert!(networks.contains(network_id), "{} on {}", token.id, network_id);
			}
		}
	}

	#[test]
	fn test_each_network_has_its_native_token() {
		let registry = AssetRegistry::builtin();
		for network in registry.networks() {
			let native = registry
				.tokens_on(&network.id)
				.into_iter()
				.find(|token| token.is_native_on(&network.id));
			assert!(native.is_some(), "no native token on {}", network.id);
		}
	}
}
