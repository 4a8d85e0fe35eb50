//! STON.fi adapter implementation
//!
//! Same-network swaps on TON via the `/v1/swap/simulate` endpoint. The
//! simulation prices the swap only; STON.fi exposes no wallet messages, so
//! its quotes carry no transaction payload.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use xswap_types::{
	AdapterError, AdapterResult, Family, FeeBreakdown, FeeItem, FeeKind, ProviderAdapter,
	ProviderInfo, ProviderRuntimeConfig, ProviderStep, QuoteInput, QuoteResult,
};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::fields::{pick_amount, pick_f64, pick_string};
use crate::http::{execute, ClientStrategy, UpstreamResponse};

#[derive(Debug)]
pub struct StonfiAdapter {
	info: ProviderInfo,
	client_strategy: ClientStrategy,
}

impl StonfiAdapter {
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
		ProviderInfo::new("stonfi", "STON.fi", vec![Family::Ton], false)
	}

	pub fn with_default_config() -> AdapterResult<Self> {
		Self::new(Self::default_info())
	}

	fn query_params(input: &QuoteInput) -> Vec<(&'static str, String)> {
		vec![
			("offer_address", input.from.address.clone()),
			("ask_address", input.to.address.clone()),
			("units", input.amount.to_string()),
			("slippage_tolerance", input.slippage_fraction().to_string()),
		]
	}

	fn is_unsupported(response: &UpstreamResponse) -> bool {
		response.mentions("pool not found") || response.mentions("no pool")
	}

	/// A bare 404 from the simulator also covers amounts the pool cannot fill
	fn is_no_route(response: &UpstreamResponse) -> bool {
		response.status == 404
	}

	fn convert(&self, body: &Value, input: &QuoteInput) -> AdapterResult<QuoteResult> {
		let to_amount = pick_amount(body, &["ask_units", "askUnits"])
			.ok_or(AdapterError::MissingOutputAmount)?;
		let to_amount_min = pick_amount(body, &["min_ask_units", "minAskUnits"]);

		let mut fees = FeeBreakdown::default();
		if let Some(fee_units) = pick_string(body, &["fee_units", "feeUnits"]) {
			fees.push(FeeItem {
				kind: FeeKind::Protocol,
				amount: Some(fee_units),
				token_symbol: Some(input.to.symbol.clone()),
				usd: None,
			});
		}

		let step = ProviderStep {
			kind: "swap".to_string(),
			tool: Some("stonfi".to_string()),
			from_chain: Some(input.from.network_id.clone()),
			to_chain: Some(input.to.network_id.clone()),
		};

		let mut quote = QuoteResult::new(&self.info.provider_id, input.amount.clone(), to_amount)
			.with_min_amount(to_amount_min)
			.with_fees(fees)
			.with_steps(vec![step])
			.with_duration(Some(10));
		if let Some(impact) = pick_f64(body, &["price_impact", "priceImpact"]) {
			if impact > 0.05 {
				quote = quote.with_warning(format!("High price impact: {:.2}%", impact * 100.0));
			}
		}
		Ok(quote)
	}
}

#[async_trait]
impl ProviderAdapter for StonfiAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult> {
		let client = self.client_strategy.client(config, &AuthConfig::None)?;
		let simulate_url = config.url("v1/swap/simulate");

		debug!(
			"Simulating STON.fi swap at {} (provider: {}) - {} -> {}",
			simulate_url, config.provider_id, input.from.symbol, input.to.symbol
		);

		let response =
			execute(client.post(&simulate_url).query(&Self::query_params(input))).await?;
		if !response.is_success() {
			if Self::is_unsupported(&response) {
				return Err(AdapterError::unsupported(format!(
					"STON.fi has no pool for {}",
					input.pair_key()
				)));
			}
			if Self::is_no_route(&response) {
				return Err(AdapterError::no_route(format!(
					"STON.fi cannot simulate {}",
					input.pair_key()
				)));
			}
			return Err(response.into_error());
		}

		self.convert(&response.json()?, input)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		let client = self.client_strategy.client(config, &AuthConfig::None)?;
		let response = execute(client.get(config.url("v1/markets"))).await?;
		if !response.is_success() {
			warn!(
				"STON.fi health check failed for provider {}: HTTP status {}",
				config.provider_id, response.status
			);
		}
		Ok(response.is_success())
	}
}
