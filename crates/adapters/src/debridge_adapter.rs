//! deBridge DLN adapter implementation
//!
//! Cross-chain orders between EVM chains and Solana via
//! `GET /dln/order/create-tx`. Without order authorities the endpoint returns
//! an estimation only, which is what indicative quotes use.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use xswap_types::{
	AdapterError, AdapterResult, Family, FeeBreakdown, FeeItem, FeeKind, ProviderAdapter,
	ProviderInfo, ProviderRuntimeConfig, ProviderStep, QuoteInput, QuoteResult,
};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::fields::{lookup, pick_amount, pick_f64, pick_string, pick_u64};
use crate::http::{execute, ClientStrategy, UpstreamResponse};
use crate::params::{chain_id_with_solana, receiver, sender, system_program_native};

/// deBridge's internal id for Solana
pub const DEBRIDGE_SOLANA_CHAIN_ID: u64 = 7565164;

const NO_ROUTE_ERRORS: [&str; 3] = [
	"UNSUPPORTED_TOKEN",
	"UNSUPPORTED_CHAIN",
	"CHAIN_NOT_SUPPORTED",
];

#[derive(Debug)]
pub struct DebridgeAdapter {
	info: ProviderInfo,
	client_strategy: ClientStrategy,
}

impl DebridgeAdapter {
	pub fn new(info: ProviderInfo) -> AdapterResult<Self> {
		Self::with_cache(info, ClientCache::for_adapter())
	}

	pub fn with_cache(info: ProviderInfo, cache: ClientCache) -> AdapterResult<Self> {
		Ok(Self {
			info,
			client_strategy: ClientStrategy::Cached(cache),
		})
	}

	pub fn without_cache(info: ProviderInfo) -> AdapterResult<Self> {
		Ok(Self {
			info,
			client_strategy: ClientStrategy::OnDemand,
		})
	}

	pub fn default_info() -> ProviderInfo {
		ProviderInfo::new("debridge", "deBridge DLN", vec![Family::Evm, Family::Solana], true)
	}

	pub fn with_default_config() -> AdapterResult<Self> {
		Self::new(Self::default_info())
	}

	fn query_params(
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<(&'static str, String)>> {
		let mut params = vec![
			(
				"srcChainId",
				chain_id_with_solana(&input.from, DEBRIDGE_SOLANA_CHAIN_ID)?.to_string(),
			),
			("srcChainTokenIn", system_program_native(&input.from).to_string()),
			("srcChainTokenInAmount", input.amount.to_string()),
			(
				"dstChainId",
				chain_id_with_solana(&input.to, DEBRIDGE_SOLANA_CHAIN_ID)?.to_string(),
			),
			("dstChainTokenOut", system_program_native(&input.to).to_string()),
			("dstChainTokenOutAmount", "auto".to_string()),
			("prependOperatingExpenses", "true".to_string()),
		];

		// Order authorities turn the estimation into a signable order
		if !input.indicative {
			if let (Some(src), Some(dst)) = (sender(input), receiver(input)) {
				params.push(("srcChainOrderAuthorityAddress", src.to_string()));
				params.push(("dstChainOrderAuthorityAddress", dst.to_string()));
				params.push(("dstChainTokenOutRecipient", dst.to_string()));
			}
		}
		if let Some(key) = &config.api_key {
			params.push(("accesstoken", key.expose_secret().to_string()));
		}
		Ok(params)
	}

	fn is_unsupported(response: &UpstreamResponse) -> bool {
		NO_ROUTE_ERRORS.iter().any(|code| response.mentions(code))
	}

	fn convert(&self, body: &Value, input: &QuoteInput) -> AdapterResult<QuoteResult> {
		let to_amount = pick_amount(body, &["estimation.dstChainTokenOut.amount"])
			.ok_or(AdapterError::MissingOutputAmount)?;
		let to_amount_min = pick_amount(body, &["estimation.dstChainTokenOut.recommendedAmount"]);

		let mut fees = FeeBreakdown::default();
		if let Some(fix_fee) = pick_string(body, &["fixFee", "order.fixFee"]) {
			fees.push(FeeItem {
				kind: FeeKind::Protocol,
				amount: Some(fix_fee),
				token_symbol: None,
				usd: None,
			});
		}
		let input_usd = pick_f64(body, &["estimation.srcChainTokenIn.approximateUsdValue"]);
		let output_usd = pick_f64(body, &["estimation.dstChainTokenOut.approximateUsdValue"]);
		if let (Some(input_usd), Some(output_usd)) = (input_usd, output_usd) {
			fees.push(FeeItem::usd(
				FeeKind::Bridge,
				Some((input_usd - output_usd).max(0.0)),
			));
		}

		let step = ProviderStep {
			kind: "bridge".to_string(),
			tool: Some("dln".to_string()),
			from_chain: Some(input.from.chain_key()),
			to_chain: Some(input.to.chain_key()),
		};

		let transaction = if input.indicative {
			None
		} else {
			lookup(body, "tx").cloned()
		};

		Ok(QuoteResult::new(&self.info.provider_id, input.amount.clone(), to_amount)
			.with_min_amount(to_amount_min)
			.with_fees(fees)
			.with_steps(vec![step])
			.with_duration(pick_u64(body, &["order.approximateFulfillmentDelay"]))
			.with_transaction(transaction))
	}
}

#[async_trait]
impl ProviderAdapter for DebridgeAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult> {
		let params = Self::query_params(input, config)?;
		let client = self.client_strategy.client(config, &AuthConfig::None)?;
		let quote_url = config.url("dln/order/create-tx");

		debug!(
			"Fetching deBridge quote from {} (provider: {}) for {}",
			quote_url,
			config.provider_id,
			input.pair_key()
		);

		let response = execute(client.get(&quote_url).query(&params)).await?;
		if !response.is_success() {
			if Self::is_unsupported(&response) {
				return Err(AdapterError::unsupported(format!(
					"deBridge does not support {}",
					input.pair_key()
				)));
			}
			return Err(response.into_error());
		}

		self.convert(&response.json()?, input)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		let client = self.client_strategy.client(config, &AuthConfig::None)?;
		let response = execute(client.get(config.url("supported-chains-info"))).await?;
		if !response.is_success() {
			warn!(
				"deBridge health check failed for provider {}: HTTP status {}",
				config.provider_id, response.status
			);
		}
		Ok(response.is_success())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use xswap_types::constants::PLACEHOLDER_USER_ADDRESS;
	use xswap_types::{AssetRegistry, BaseAmount, ProviderAdapter, SecretString, Support};

	fn input(from: (&str, &str), to: (&str, &str)) -> QuoteInput {
		let registry = AssetRegistry::builtin();
		QuoteInput::new(
			registry.resolve(from.0, from.1).unwrap(),
			registry.resolve(to.0, to.1).unwrap(),
			BaseAmount::from(5_000_000u64),
			PLACEHOLDER_USER_ADDRESS,
		)
	}

	fn config() -> ProviderRuntimeConfig {
		ProviderRuntimeConfig::new("debridge", "https://dln.debridge.finance/v1.0", 8_000)
	}

	#[test]
	fn test_same_network_is_not_supported() {
		let adapter = DebridgeAdapter::with_default_config().unwrap();
		assert!(matches!(
			adapter.supports(&input(("usdc", "ethereum"), ("usdt", "ethereum"))),
			Support::Unsupported(_)
		));
		assert_eq!(
			adapter.supports(&input(("usdc", "ethereum"), ("usdc", "solana"))),
			Support::Supported
		);
	}

	#[test]
	fn test_indicative_query_has_no_authorities() {
		let quote_input = input(("usdc", "ethereum"), ("usdc", "solana"));
		let params = DebridgeAdapter::query_params(&quote_input.clone().indicative(), &config())
			.unwrap();
		assert!(params.contains(&("dstChainId", DEBRIDGE_SOLANA_CHAIN_ID.to_string())));
		assert!(!params.iter().any(|(k, _)| *k == "srcChainOrderAuthorityAddress"));

		let executable = quote_input.with_recipient("SoLRecipient");
		let keyed = config().with_api_key(Some(SecretString::new("token")));
		let params = DebridgeAdapter::query_params(&executable, &keyed).unwrap();
		assert!(params.contains(&("dstChainTokenOutRecipient", "SoLRecipient".to_string())));
		assert!(params.contains(&("accesstoken", "token".to_string())));
	}

	#[test]
	fn test_convert_estimation() {
		let adapter = DebridgeAdapter::with_default_config().unwrap();
		let body = json!({
			"estimation": {
				"srcChainTokenIn": {"amount": "5000000", "approximateUsdValue": 5.0},
				"dstChainTokenOut": {
					"amount": "4950000",
					"recommendedAmount": "4925250",
					"approximateUsdValue": 4.95
				}
			},
			"fixFee": "1000000000000000",
			"order": {"approximateFulfillmentDelay": 2},
			"tx": {"to": "0xdln", "data": "0xabcd", "value": "1000000000000000"}
		});
		let quote = adapter
			.convert(&body, &input(("usdc", "ethereum"), ("usdc", "solana")))
			.unwrap();
		assert_eq!(quote.to_amount.as_str(), "4950000");
		assert_eq!(quote.to_amount_min.unwrap().as_str(), "4925250");
		assert!((quote.fees.bridge_usd().unwrap() - 0.05).abs() < 1e-9);
		assert_eq!(quote.estimated_duration_secs, Some(2));
		assert_eq!(quote.transaction.unwrap()["to"], "0xdln");
	}
}
