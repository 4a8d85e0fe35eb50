//! Jupiter adapter implementation
//!
//! Same-network swaps on Solana. `/quote` prices the route; executable
//! quotes then request a serialized transaction from `/swap`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};
use xswap_types::{
	AdapterError, AdapterResult, Family, FeeBreakdown, FeeItem, FeeKind, ProviderAdapter,
	ProviderInfo, ProviderRuntimeConfig, ProviderStep, QuoteInput, QuoteResult,
};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::fields::{lookup, pick_amount, pick_f64, pick_string};
use crate::http::{execute, ClientStrategy, UpstreamResponse};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug)]
pub struct JupiterAdapter {
	info: ProviderInfo,
	client_strategy: ClientStrategy,
}

impl JupiterAdapter {
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
		ProviderInfo::new("jupiter", "Jupiter", vec![Family::Solana], false)
	}

	pub fn with_default_config() -> AdapterResult<Self> {
		Self::new(Self::default_info())
	}

	fn query_params(input: &QuoteInput) -> Vec<(&'static str, String)> {
		vec![
			("inputMint", input.from.address.clone()),
			("outputMint", input.to.address.clone()),
			("amount", input.amount.to_string()),
			("slippageBps", input.slippage_bps.to_string()),
			("swapMode", "ExactIn".to_string()),
		]
	}

	fn is_unsupported(response: &UpstreamResponse) -> bool {
		response.mentions("TOKEN_NOT_TRADABLE")
	}

	fn is_no_route(response: &UpstreamResponse) -> bool {
		response.mentions("COULD_NOT_FIND_ANY_ROUTE") || response.mentions("NO_ROUTES_FOUND")
	}

	fn convert(&self, body: &Value, input: &QuoteInput) -> AdapterResult<QuoteResult> {
		let to_amount = pick_amount(body, &["outAmount"]).ok_or(AdapterError::MissingOutputAmount)?;
		let to_amount_min = pick_amount(body, &["otherAmountThreshold"]);

		let mut fees = FeeBreakdown::default();
		if let Some(platform_fee) = pick_string(body, &["platformFee.amount"]) {
			fees.push(FeeItem {
				kind: FeeKind::Protocol,
				amount: Some(platform_fee),
				token_symbol: Some(input.to.symbol.clone()),
				usd: None,
			});
		}

		let steps = lookup(body, "routePlan")
			.and_then(Value::as_array)
			.map(|plan| {
				plan.iter()
					.map(|hop| ProviderStep {
						kind: "swap".to_string(),
						tool: pick_string(hop, &["swapInfo.label"]),
						from_chain: Some(input.from.network_id.clone()),
						to_chain: Some(input.to.network_id.clone()),
					})
					.collect()
			})
			.unwrap_or_default();

		let mut quote = QuoteResult::new(&self.info.provider_id, input.amount.clone(), to_amount)
			.with_min_amount(to_amount_min)
			.with_fees(fees)
			.with_steps(steps)
			.with_duration(Some(1));

		if let Some(impact) = pick_f64(body, &["priceImpactPct"]) {
			if impact > 0.05 {
				quote = quote.with_warning(format!("High price impact: {:.2}%", impact * 100.0));
			}
		}
		Ok(quote)
	}

	async fn fetch_transaction(
		&self,
		quote_response: &Value,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
		auth: &AuthConfig,
	) -> Option<Value> {
		let client = self.client_strategy.client(config, auth).ok()?;
		let body = json!({
			"quoteResponse": quote_response,
			"userPublicKey": input.user_address,
			"wrapAndUnwrapSol": true,
		});
		let response = execute(client.post(config.url("swap")).json(&body))
			.await
			.ok()?;
		if !response.is_success() {
			warn!("Jupiter swap transaction unavailable: HTTP {}", response.status);
			return None;
		}
		let swap = response.json().ok()?;
		let transaction = pick_string(&swap, &["swapTransaction"])?;
		Some(json!({
			"swapTransaction": transaction,
			"lastValidBlockHeight": lookup(&swap, "lastValidBlockHeight").cloned(),
		}))
	}
}

#[async_trait]
impl ProviderAdapter for JupiterAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult> {
		let auth = AuthConfig::api_key(API_KEY_HEADER, config.api_key.as_ref());
		let client = self.client_strategy.client(config, &auth)?;
		let quote_url = config.url("quote");

		debug!(
			"Fetching Jupiter quote from {} (provider: {}) - {} -> {}",
			quote_url, config.provider_id, input.from.address, input.to.address
		);

		let response = execute(client.get(&quote_url).query(&Self::query_params(input))).await?;
		if !response.is_success() {
			if Self::is_unsupported(&response) {
				return Err(AdapterError::unsupported(format!(
					"Jupiter cannot trade {}",
					input.pair_key()
				)));
			}
			if Self::is_no_route(&response) {
				return Err(AdapterError::no_route(format!(
					"Jupiter has no route for {}",
					input.pair_key()
				)));
			}
			return Err(response.into_error());
		}

		let body = response.json()?;
		let quote = self.convert(&body, input)?;
		if input.indicative {
			return Ok(quote);
		}
		Ok(match self.fetch_transaction(&body, input, config, &auth).await {
			Some(transaction) => quote.with_transaction(Some(transaction)),
			None => quote.with_warning("Jupiter swap transaction unavailable"),
		})
	}
}
