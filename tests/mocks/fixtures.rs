//! Request fixtures for e2e tests

use serde_json::{json, Value};

#[allow(dead_code)]
pub struct ApiFixtures;

#[allow(dead_code)]
impl ApiFixtures {
	pub const EVM_WALLET: &'static str = "0x742d35Cc6634C0532925a3b8D2a27F79c5a85b03";
	pub const SOLANA_WALLET: &'static str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
	pub const TRON_WALLET: &'static str = "TLsV52sRDL79HXGGm9yzwKibb6BeruhUzy";
	pub const TX_HASH: &'static str =
		"0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

	/// USDC on Ethereum to USDC on Base, with a sender
	pub fn usdc_bridge_quote() -> Value {
		json!({
			"amount": "100",
			"fromTokenId": "usdc",
			"toTokenId": "usdc",
			"fromNetworkId": "ethereum",
			"toNetworkId": "base",
			"userAddress": Self::EVM_WALLET,
			"requestId": "req-1"
		})
	}

	pub fn quote(amount: &str, from: (&str, &str), to: (&str, &str)) -> Value {
		json!({
			"amount": amount,
			"fromTokenId": from.0,
			"fromNetworkId": from.1,
			"toTokenId": to.0,
			"toNetworkId": to.1,
			"userAddress": Self::EVM_WALLET
		})
	}

	pub fn route(amount: &str, from: (&str, &str), to: (&str, &str), wallets: Value) -> Value {
		json!({
			"amount": amount,
			"fromTokenId": from.0,
			"fromNetworkId": from.1,
			"toTokenId": to.0,
			"toNetworkId": to.1,
			"wallets": wallets
		})
	}

	/// EVM transaction payload in the shape LI.FI returns it
	pub fn evm_transaction() -> Value {
		json!({
			"transactionRequest": {
				"to": "0x1231DEB6f5749EF6cE6943a275A1D3E7486F4EaE",
				"data": "0xabcdef",
				"value": "0x0",
				"gasLimit": "0x30d40",
				"chainId": 1
			}
		})
	}
}
