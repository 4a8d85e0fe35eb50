//! LI.FI adapter implementation
//!
//! Quotes EVM and Solana transfers through the LI.FI `/quote` endpoint.
//! This adapter uses the client cache for connection pooling and keep-alive.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use xswap_types::{
	AdapterError, AdapterResult, Family, FeeBreakdown, FeeItem, FeeKind, ProviderAdapter,
	ProviderInfo, ProviderRuntimeConfig, ProviderStep, QuoteInput, QuoteResult,
};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::fields::{lookup, pick_amount, pick_string, pick_u64, sum_field};
use crate::http::{execute, ClientStrategy, UpstreamResponse};
use crate::params::{chain_id_with_solana, receiver, sender};

/// LI.FI's numeric id for Solana
pub const LIFI_SOLANA_CHAIN_ID: u64 = 1151111081099710;

const API_KEY_HEADER: &str = "x-lifi-api-key";

/// LI.FI adapter for cross-chain and same-chain quotes
#[derive(Debug)]
pub struct LifiAdapter {
	info: ProviderInfo,
	client_strategy: ClientStrategy,
}

impl LifiAdapter {
	/// Create a new LI.FI adapter backed by the shared client cache (recommended)
	pub fn new(info: ProviderInfo) -> AdapterResult<Self> {
		Self::with_cache(info, ClientCache::for_adapter())
	}

	/// Create LI.FI adapter with custom client cache
	pub fn with_cache(info: ProviderInfo, cache: ClientCache) -> AdapterResult<Self> {
		Ok(Self {
			info,
			client_strategy: ClientStrategy::Cached(cache),
		})
	}

	/// Create LI.FI adapter without client caching
	pub fn without_cache(info: ProviderInfo) -> AdapterResult<Self> {
		Ok(Self {
			info,
			client_strategy: ClientStrategy::OnDemand,
		})
	}

	pub fn default_info() -> ProviderInfo {
		ProviderInfo::new("lifi", "LI.FI", vec![Family::Evm, Family::Solana], true)
	}

	/// Create default LI.FI adapter instance
	pub fn with_default_config() -> AdapterResult<Self> {
		Self::new(Self::default_info())
	}

	fn query_params(input: &QuoteInput) -> AdapterResult<Vec<(&'static str, String)>> {
		let mut params = vec![
			(
				"fromChain",
				chain_id_with_solana(&input.from, LIFI_SOLANA_CHAIN_ID)?.to_string(),
			),
			(
				"toChain",
				chain_id_with_solana(&input.to, LIFI_SOLANA_CHAIN_ID)?.to_string(),
			),
			("fromToken", input.from.address.clone()),
			("toToken", input.to.address.clone()),
			("fromAmount", input.amount.to_string()),
			("slippage", input.slippage_fraction().to_string()),
			("order", "CHEAPEST".to_string()),
		];
		if let Some(from_address) = sender(input) {
			params.push(("fromAddress", from_address.to_string()));
		}
		if let Some(to_address) = receiver(input) {
			params.push(("toAddress", to_address.to_string()));
		}
		Ok(params)
	}

	fn is_unsupported(response: &UpstreamResponse) -> bool {
		response.mentions("not supported")
	}

	/// "No available quotes" depends on amount and liquidity
	fn is_no_route(response: &UpstreamResponse) -> bool {
		response.status == 404 || response.mentions("no available quotes")
	}

	fn convert(&self, body: &Value, input: &QuoteInput) -> AdapterResult<QuoteResult> {
		let to_amount = pick_amount(body, &["estimate.toAmount", "toAmount"])
			.ok_or(AdapterError::MissingOutputAmount)?;
		let to_amount_min = pick_amount(body, &["estimate.toAmountMin", "toAmountMin"]);

		let mut fees = FeeBreakdown::default();
		if let Some(gas) = sum_field(body, "estimate.gasCosts", "amountUSD") {
			fees.push(FeeItem::usd(FeeKind::Gas, Some(gas)));
		}
		if let Some(protocol) = sum_field(body, "estimate.feeCosts", "amountUSD") {
			fees.push(FeeItem::usd(FeeKind::Protocol, Some(protocol)));
		}

		let steps = lookup(body, "includedSteps")
			.and_then(Value::as_array)
			.map(|steps| {
				steps
					.iter()
					.map(|step| ProviderStep {
						kind: pick_string(step, &["type"]).unwrap_or_else(|| "unknown".into()),
						tool: pick_string(step, &["tool", "toolDetails.name"]),
						from_chain: pick_string(step, &["action.fromChainId"]),
						to_chain: pick_string(step, &["action.toChainId"]),
					})
					.collect()
			})
			.unwrap_or_default();

		let transaction = if input.indicative {
			None
		} else {
			lookup(body, "transactionRequest").cloned()
		};

		Ok(QuoteResult::new(&self.info.provider_id, input.amount.clone(), to_amount)
			.with_min_amount(to_amount_min)
			.with_fees(fees)
			.with_steps(steps)
			.with_duration(pick_u64(body, &["estimate.executionDuration"]))
			.with_transaction(transaction))
	}
}

#[async_trait]
impl ProviderAdapter for LifiAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult> {
		let params = Self::query_params(input)?;
		let auth = AuthConfig::api_key(API_KEY_HEADER, config.api_key.as_ref());
		let client = self.client_strategy.client(config, &auth)?;
		let quote_url = config.url("quote");

		debug!(
			"Fetching LI.FI quote from {} (provider: {}) - {}:{} -> {}:{}",
			quote_url,
			config.provider_id,
			input.from.chain_key(),
			input.from.address,
			input.to.chain_key(),
			input.to.address
		);

		let response = execute(client.get(&quote_url).query(&params)).await?;
		if !response.is_success() {
			if Self::is_unsupported(&response) {
				return Err(AdapterError::unsupported(format!(
					"LI.FI does not support {}",
					input.pair_key()
				)));
			}
			if Self::is_no_route(&response) {
				return Err(AdapterError::no_route(format!(
					"LI.FI has no quote for {}",
					input.pair_key()
				)));
			}
			return Err(response.into_error());
		}

		self.convert(&response.json()?, input)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		debug!("LI.FI adapter health check for provider: {}", config.provider_id);

		let auth = AuthConfig::api_key(API_KEY_HEADER, config.api_key.as_ref());
		let client = self.client_strategy.client(config, &auth)?;
		let response = execute(client.get(config.url("chains"))).await?;
		if !response.is_success() {
			warn!(
				"LI.FI health check failed for provider {}: HTTP status {}",
				config.provider_id, response.status
			);
		}
		Ok(response.is_success())
	}
}
