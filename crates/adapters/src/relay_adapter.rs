//! Relay adapter implementation
//!
//! Quotes EVM and Solana swaps and bridges through Relay's `POST /quote`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};
use xswap_types::{
	AdapterError, AdapterResult, Family, FeeBreakdown, FeeItem, FeeKind, ProviderAdapter,
	ProviderInfo, ProviderRuntimeConfig, ProviderStep, QuoteInput, QuoteResult,
};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::fields::{lookup, pick_amount, pick_f64, pick_string, pick_u64};
use crate::http::{execute, ClientStrategy, UpstreamResponse};
use crate::params::{chain_id_with_solana, receiver, sender, system_program_native};

/// Relay's numeric id for Solana
pub const RELAY_SOLANA_CHAIN_ID: u64 = 792703809;

const API_KEY_HEADER: &str = "x-api-key";

/// Error codes Relay uses when it simply has no route
const UNSUPPORTED_CODES: [&str; 3] = ["UNSUPPORTED_CHAIN", "UNSUPPORTED_CURRENCY", "UNSUPPORTED_ROUTE"];

const NO_ROUTE_CODES: [&str; 2] = ["NO_SWAP_ROUTES_FOUND", "NO_QUOTES"];

#[derive(Debug)]
pub struct RelayAdapter {
	info: ProviderInfo,
	client_strategy: ClientStrategy,
}

impl RelayAdapter {
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
		ProviderInfo::new("relay", "Relay", vec![Family::Evm, Family::Solana], true)
	}

	pub fn with_default_config() -> AdapterResult<Self> {
		Self::new(Self::default_info())
	}

	fn request_body(input: &QuoteInput) -> AdapterResult<Value> {
		let mut body = json!({
			"originChainId": chain_id_with_solana(&input.from, RELAY_SOLANA_CHAIN_ID)?,
			"destinationChainId": chain_id_with_solana(&input.to, RELAY_SOLANA_CHAIN_ID)?,
			"originCurrency": system_program_native(&input.from),
			"destinationCurrency": system_program_native(&input.to),
			"amount": input.amount.as_str(),
			"tradeType": "EXACT_INPUT",
			"slippageTolerance": input.slippage_bps.to_string(),
		});
		if let Some(user) = sender(input) {
			body["user"] = json!(user);
		}
		if let Some(recipient) = receiver(input) {
			body["recipient"] = json!(recipient);
		}
		Ok(body)
	}

	fn is_unsupported(response: &UpstreamResponse) -> bool {
		UNSUPPORTED_CODES.iter().any(|code| response.mentions(code))
	}

	fn is_no_route(response: &UpstreamResponse) -> bool {
		NO_ROUTE_CODES.iter().any(|code| response.mentions(code))
	}

	fn convert(&self, body: &Value, input: &QuoteInput) -> AdapterResult<QuoteResult> {
		let to_amount = pick_amount(body, &["details.currencyOut.amount", "currencyOut.amount"])
			.ok_or(AdapterError::MissingOutputAmount)?;
		let to_amount_min = pick_amount(
			body,
			&["details.currencyOut.minimumAmount", "currencyOut.minimumAmount"],
		);

		let mut fees = FeeBreakdown::default();
		let usd = |path: &str| pick_f64(body, &[path]);
		if let Some(gas) = usd("fees.gas.amountUsd") {
			fees.push(FeeItem::usd(FeeKind::Gas, Some(gas)));
		}
		if let Some(relayer) = usd("fees.relayer.amountUsd") {
			fees.push(FeeItem::usd(FeeKind::Bridge, Some(relayer)));
		}
		if let Some(app) = usd("fees.app.amountUsd") {
			fees.push(FeeItem::usd(FeeKind::Protocol, Some(app)));
		}

		let steps: Vec<Value> = lookup(body, "steps")
			.and_then(Value::as_array)
			.cloned()
			.unwrap_or_default();
		let provider_steps = steps
			.iter()
			.map(|step| ProviderStep {
				kind: pick_string(step, &["id", "kind"]).unwrap_or_else(|| "unknown".into()),
				tool: Some("relay".to_string()),
				from_chain: Some(input.from.chain_key()),
				to_chain: Some(input.to.chain_key()),
			})
			.collect();

		// Relay may emit an approval step before the deposit; the last item is the swap
		let transaction = if input.indicative {
			None
		} else {
			steps
				.iter()
				.rev()
				.find_map(|step| lookup(step, "items.0.data"))
				.cloned()
		};

		Ok(QuoteResult::new(&self.info.provider_id, input.amount.clone(), to_amount)
			.with_min_amount(to_amount_min)
			.with_fees(fees)
			.with_steps(provider_steps)
			.with_duration(pick_u64(body, &["details.timeEstimate"]))
			.with_transaction(transaction))
	}
}

#[async_trait]
impl ProviderAdapter for RelayAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult> {
		let body = Self::request_body(input)?;
		let auth = AuthConfig::api_key(API_KEY_HEADER, config.api_key.as_ref());
		let client = self.client_strategy.client(config, &auth)?;
		let quote_url = config.url("quote");

		debug!(
			"Fetching Relay quote from {} (provider: {}) for {}",
			quote_url,
			config.provider_id,
			input.pair_key()
		);

		let response = execute(client.post(&quote_url).json(&body)).await?;
		if !response.is_success() {
			if Self::is_unsupported(&response) {
				return Err(AdapterError::unsupported(format!(
					"Relay does not support {}",
					input.pair_key()
				)));
			}
			if Self::is_no_route(&response) {
				return Err(AdapterError::no_route(format!(
					"Relay has no route for {}",
					input.pair_key()
				)));
			}
			return Err(response.into_error());
		}

		self.convert(&response.json()?, input)
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		let auth = AuthConfig::api_key(API_KEY_HEADER, config.api_key.as_ref());
		let client = self.client_strategy.client(config, &auth)?;
		let response = execute(client.get(config.url("chains"))).await?;
		if !response.is_success() {
			warn!(
				"Relay health check failed for provider {}: HTTP status {}",
				config.provider_id, response.status
			);
		}
		Ok(response.is_success())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::SOLANA_SYSTEM_PROGRAM;
	use xswap_types::constants::PLACEHOLDER_USER_ADDRESS;
	use xswap_types::{AssetRegistry, BaseAmount};

	fn input(from: (&str, &str), to: (&str, &str)) -> QuoteInput {
		let registry = AssetRegistry::builtin();
		QuoteInput::new(
			registry.resolve(from.0, from.1).unwrap(),
			registry.resolve(to.0, to.1).unwrap(),
			BaseAmount::from(2_000_000_000u64),
			PLACEHOLDER_USER_ADDRESS,
		)
	}

	#[test]
	fn test_request_body_for_solana_origin() {
		let body = RelayAdapter::request_body(
			&input(("sol", "solana"), ("usdc", "arbitrum")).with_recipient("0xabc"),
		)
		.unwrap();
		assert_eq!(body["originChainId"], RELAY_SOLANA_CHAIN_ID);
		assert_eq!(body["originCurrency"], SOLANA_SYSTEM_PROGRAM);
		assert_eq!(body["destinationChainId"], 42161);
		assert_eq!(body["amount"], "2000000000");
		assert_eq!(body["recipient"], "0xabc");
		assert_eq!(body["user"], PLACEHOLDER_USER_ADDRESS);

		let indicative =
			RelayAdapter::request_body(&input(("sol", "solana"), ("usdc", "arbitrum")).indicative())
				.unwrap();
		assert!(indicative.get("user").is_none());
	}

	#[test]
	fn test_convert_reads_currency_out_and_last_step_transaction() {
		let adapter = RelayAdapter::with_default_config().unwrap();
		let body = json!({
			"steps": [
				{"id": "approve", "items": [{"data": {"to": "0xtoken", "data": "0x095ea7b3"}}]},
				{"id": "deposit", "items": [{"data": {"to": "0xrelay", "data": "0x01", "value": "0", "chainId": 1}}]}
			],
			"fees": {
				"gas": {"amountUsd": "0.80"},
				"relayer": {"amountUsd": "0.20"},
				"app": {"amountUsd": "0"}
			},
			"details": {
				"currencyOut": {"amount": "1995000", "minimumAmount": "1985025"},
				"timeEstimate": 12
			}
		});
		let quote = adapter
			.convert(&body, &input(("usdc", "ethereum"), ("usdc", "base")))
			.unwrap();
		assert_eq!(quote.to_amount.as_str(), "1995000");
		assert_eq!(quote.to_amount_min.unwrap().as_str(), "1985025");
		assert_eq!(quote.fees.total_usd(), Some(1.0));
		assert_eq!(quote.steps.len(), 2);
		assert_eq!(quote.transaction.unwrap()["to"], "0xrelay");
		assert_eq!(quote.estimated_duration_secs, Some(12));
	}

	#[test]
	fn test_error_codes_are_classified() {
		let response = UpstreamResponse {
			status: 400,
			body: r#"{"message":"No routes found","errorCode":"NO_SWAP_ROUTES_FOUND"}"#.into(),
		};
		assert!(RelayAdapter::is_no_route(&response));
		assert!(!RelayAdapter::is_unsupported(&response));

		let response = UpstreamResponse {
			status: 400,
			body: r#"{"errorCode":"UNSUPPORTED_CHAIN"}"#.into(),
		};
		assert!(RelayAdapter::is_unsupported(&response));

		let response = UpstreamResponse {
			status: 400,
			body: r#"{"errorCode":"AMOUNT_TOO_LOW"}"#.into(),
		};
		assert!(!RelayAdapter::is_unsupported(&response));
		assert!(!RelayAdapter::is_no_route(&response));
	}
}
