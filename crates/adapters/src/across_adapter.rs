//! Across adapter implementation
//!
//! Across only bridges like-for-like assets between EVM chains. Native assets
//! are quoted through the chain's wrapped token. Quotes come from
//! `/suggested-fees`; executable quotes additionally fetch a ready-made
//! transaction from `/swap/approval`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xswap_types::constants::wrapped_native_address;
use xswap_types::{
	normalize_symbol, AdapterError, AdapterResult, BaseAmount, Family, FeeBreakdown, FeeItem,
	FeeKind, ProviderAdapter, ProviderInfo, ProviderRuntimeConfig, ProviderStep, QuoteInput,
	QuoteResult, ResolvedToken, Support,
};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::fields::lookup;
use crate::http::{execute, ClientStrategy, UpstreamResponse};
use crate::params::{evm_chain_id, receiver, sender};

// ================================
// ACROSS API MODELS
// ================================

/// Across suggested fees response; only the fields the aggregator reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcrossQuoteResponse {
	/// Estimated fill time in seconds
	#[serde(default)]
	pub estimated_fill_time_sec: Option<u64>,
	/// Whether amount is below the route minimum
	#[serde(default)]
	pub is_amount_too_low: bool,
	/// Total relay fee breakdown
	pub total_relay_fee: AcrossFeeBand,
	#[serde(default)]
	pub relayer_gas_fee: Option<AcrossFeeBand>,
	#[serde(default)]
	pub lp_fee: Option<AcrossFeeBand>,
	#[serde(default)]
	pub limits: Option<AcrossLimits>,
	/// Output amount; absent on older API versions
	#[serde(default)]
	pub output_amount: Option<String>,
	#[serde(default)]
	pub spoke_pool_address: Option<String>,
	#[serde(default)]
	pub timestamp: Option<String>,
}

/// Across fee breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcrossFeeBand {
	/// Fee percentage (1e18 = 100%)
	pub pct: String,
	/// Fee total in input token base units
	pub total: String,
}

/// Across deposit limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcrossLimits {
	pub min_deposit: String,
	pub max_deposit: String,
}

/// Across adapter for EVM bridge quotes
#[derive(Debug)]
pub struct AcrossAdapter {
	info: ProviderInfo,
	client_strategy: ClientStrategy,
}

impl AcrossAdapter {
	/// Create a new Across adapter backed by the shared client cache (recommended)
	pub fn new(info: ProviderInfo) -> AdapterResult<Self> {
		Self::with_cache(info, ClientCache::for_adapter())
	}

	/// Create Across adapter with custom client cache
	pub fn with_cache(info: ProviderInfo, cache: ClientCache) -> AdapterResult<Self> {
		Ok(Self {
			info,
			client_strategy: ClientStrategy::Cached(cache),
		})
	}

	/// Create Across adapter without client caching
	pub fn without_cache(info: ProviderInfo) -> AdapterResult<Self> {
		Ok(Self {
			info,
			client_strategy: ClientStrategy::OnDemand,
		})
	}

	pub fn default_info() -> ProviderInfo {
		ProviderInfo::new("across", "Across Protocol", vec![Family::Evm], true)
	}

	/// Create default Across adapter instance
	pub fn with_default_config() -> AdapterResult<Self> {
		Self::new(Self::default_info())
	}

	/// Address Across accepts for the token; native assets map to wrapped
	fn bridge_token(token: &ResolvedToken) -> AdapterResult<String> {
		if !token.is_native {
			return Ok(token.address.clone());
		}
		let chain_id = evm_chain_id(token)?;
		wrapped_native_address(chain_id)
			.map(str::to_string)
			.ok_or_else(|| {
				AdapterError::unsupported(format!("no wrapped native token on chain {}", chain_id))
			})
	}

	fn query_params(input: &QuoteInput) -> AdapterResult<Vec<(&'static str, String)>> {
		let mut params = vec![
			("inputToken", Self::bridge_token(&input.from)?),
			("outputToken", Self::bridge_token(&input.to)?),
			("originChainId", evm_chain_id(&input.from)?.to_string()),
			("destinationChainId", evm_chain_id(&input.to)?.to_string()),
			("amount", input.amount.to_string()),
		];
		if let Some(recipient) = receiver(input) {
			params.push(("recipient", recipient.to_string()));
		}
		Ok(params)
	}

	fn is_unsupported(response: &UpstreamResponse) -> bool {
		response.mentions("unsupported")
			|| response.mentions("route not enabled")
			|| response.mentions("ROUTE_NOT_ENABLED")
	}

	fn convert(&self, quote: AcrossQuoteResponse, input: &QuoteInput) -> AdapterResult<QuoteResult> {
		if quote.is_amount_too_low {
			let minimum = quote
				.limits
				.as_ref()
				.map(|limits| limits.min_deposit.clone())
				.unwrap_or_else(|| "unknown".to_string());
			return Err(AdapterError::Rejected {
				reason: format!("amount {} is below minimum deposit of {}", input.amount, minimum),
			});
		}

		let to_amount = match quote.output_amount.as_deref() {
			Some(output) => BaseAmount::parse(output)
				.map_err(|e| AdapterError::invalid_response(format!("outputAmount: {}", e)))?,
			None => Self::amount_after_fee(&input.amount, &quote.total_relay_fee.total)?,
		};

		let fee = |kind: FeeKind, band: &AcrossFeeBand| FeeItem {
			kind,
			amount: Some(band.total.clone()),
			token_symbol: Some(input.from.symbol.clone()),
			usd: None,
		};
		let mut fees = FeeBreakdown::default().with(fee(FeeKind::Bridge, &quote.total_relay_fee));
		if let Some(gas) = &quote.relayer_gas_fee {
			fees.push(fee(FeeKind::Gas, gas));
		}

		let step = ProviderStep {
			kind: "bridge".to_string(),
			tool: Some("across".to_string()),
			from_chain: input.from.chain_id.map(|id| id.to_string()),
			to_chain: input.to.chain_id.map(|id| id.to_string()),
		};

		Ok(QuoteResult::new(&self.info.provider_id, input.amount.clone(), to_amount)
			.with_fees(fees)
			.with_steps(vec![step])
			.with_duration(quote.estimated_fill_time_sec))
	}

	fn amount_after_fee(amount: &BaseAmount, fee: &str) -> AdapterResult<BaseAmount> {
		let parse = |value: &str| {
			value
				.parse::<u128>()
				.map_err(|_| AdapterError::invalid_response(format!("not an integer: {}", value)))
		};
		let output = parse(amount.as_str())?.saturating_sub(parse(fee)?);
		Ok(BaseAmount::from(output))
	}

	/// Ready-to-sign deposit transaction; a failure only costs executability
	async fn fetch_transaction(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> Option<serde_json::Value> {
		let mut params = Self::query_params(input).ok()?;
		params.push(("tradeType", "exactInput".to_string()));
		params.push(("depositor", sender(input)?.to_string()));

		let client = self.client_strategy.client(config, &AuthConfig::None).ok()?;
		let response = execute(client.get(config.url("swap/approval")).query(&params))
			.await
			.ok()?;
		if !response.is_success() {
			warn!(
				"Across swap transaction unavailable for {}: HTTP {}",
				input.pair_key(),
				response.status
			);
			return None;
		}
		let body = response.json().ok()?;
		lookup(&body, "swapTx").cloned()
	}
}

#[async_trait]
impl ProviderAdapter for AcrossAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	fn supports(&self, input: &QuoteInput) -> Support {
		if !input.from.family.is_evm() || !input.to.family.is_evm() {
			return Support::unsupported("Across only bridges between EVM chains");
		}
		if !input.is_cross_chain() {
			return Support::unsupported("Across does not quote same-chain swaps");
		}
		if normalize_symbol(&input.from.symbol) != normalize_symbol(&input.to.symbol) {
			return Support::unsupported(format!(
				"Across bridges like assets only ({} -> {})",
				input.from.symbol, input.to.symbol
			));
		}
		Support::Supported
	}

	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult> {
		let params = Self::query_params(input)?;
		let client = self.client_strategy.client(config, &AuthConfig::None)?;
		let quote_url = config.url("suggested-fees");

		debug!(
			"Fetching Across quote from {} (provider: {}) - {} -> {}",
			quote_url,
			config.provider_id,
			input.from.chain_key(),
			input.to.chain_key()
		);

		let response = execute(client.get(&quote_url).query(&params)).await?;
		if !response.is_success() {
			if Self::is_unsupported(&response) {
				return Err(AdapterError::unsupported(format!(
					"Across route not enabled for {}",
					input.pair_key()
				)));
			}
			return Err(response.into_error());
		}

		let across_quote: AcrossQuoteResponse = serde_json::from_str(&response.body)
			.map_err(|e| {
				AdapterError::invalid_response(format!(
					"Failed to parse Across quote response: {}",
					e
				))
			})?;

		let mut quote = self.convert(across_quote, input)?;
		if !input.indicative {
			quote = match self.fetch_transaction(input, config).await {
				Some(transaction) => quote.with_transaction(Some(transaction)),
				None => quote.with_warning("Across deposit transaction unavailable"),
			};
		}
		Ok(quote)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		debug!("Across adapter health check for provider: {}", config.provider_id);

		let client = self.client_strategy.client(config, &AuthConfig::None)?;
		let response = execute(client.get(config.url("available-routes"))).await?;
		if !response.is_success() {
			warn!(
				"Across health check failed for provider {}: HTTP status {}",
				config.provider_id, response.status
			);
		}
		Ok(response.is_success())
	}
}
