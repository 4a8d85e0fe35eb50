//! Price-based fallback estimation
//!
//! Used when no provider quote survives validation. Estimates are always
//! indicative and carry a warning.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use xswap_config::FallbackSettings;
use xswap_types::{
	normalize_symbol, to_base_units, BaseAmount, FeeBreakdown, QuoteResult, ResolvedToken,
};

/// Provider id stamped on fallback estimates
pub const PRICE_FALLBACK_PROVIDER: &str = "price-fallback";

pub const FALLBACK_WARNING: &str =
	"No provider returned a usable quote; this is an indicative estimate from spot prices";

#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
	#[error("price service request failed: {0}")]
	Request(String),
	#[error("price service returned an invalid response: {0}")]
	InvalidResponse(String),
}

/// Spot-price lookup in USD
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceOracle: Send + Sync + Debug {
	/// Prices for the given lookup keys. Keys without a price are absent.
	async fn fetch_prices(&self, keys: Vec<String>) -> Result<HashMap<String, f64>, PriceError>;
}

#[derive(Debug, Deserialize)]
struct PriceServiceResponse {
	ok: bool,
	#[serde(default)]
	prices: HashMap<String, Option<f64>>,
	#[serde(default)]
	source: Option<String>,
}

/// Client for the external `/api/token-price` service
#[derive(Debug, Clone)]
pub struct HttpPriceOracle {
	client: reqwest::Client,
	url: String,
}

impl HttpPriceOracle {
	pub fn new(url: &str, timeout: Duration) -> Result<Self, PriceError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| PriceError::Request(e.to_string()))?;
		Ok(Self {
			client,
			url: url.to_string(),
		})
	}
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
	async fn fetch_prices(&self, keys: Vec<String>) -> Result<HashMap<String, f64>, PriceError> {
		let response = self
			.client
			.get(&self.url)
			.query(&[("tokens", keys.join(","))])
			.send()
			.await
			.map_err(|e| PriceError::Request(e.to_string()))?;

		if !response.status().is_success() {
			return Err(PriceError::Request(format!("HTTP {}", response.status())));
		}

		let body: PriceServiceResponse = response
			.json()
			.await
			.map_err(|e| PriceError::InvalidResponse(e.to_string()))?;
		if !body.ok {
			return Err(PriceError::InvalidResponse("ok=false".to_string()));
		}
		debug!(
			"Price service answered {} prices (source: {})",
			body.prices.len(),
			body.source.as_deref().unwrap_or("unknown")
		);

		Ok(body
			.prices
			.into_iter()
			.filter_map(|(key, price)| price.filter(|p| p.is_finite() && *p > 0.0).map(|p| (key, p)))
			.collect())
	}
}

/// Builds indicative quotes from spot prices
#[derive(Debug, Clone)]
pub struct PriceFallback {
	oracle: Option<Arc<dyn PriceOracle>>,
	settings: FallbackSettings,
}

impl PriceFallback {
	pub fn new(oracle: Option<Arc<dyn PriceOracle>>, settings: FallbackSettings) -> Self {
		Self { oracle, settings }
	}

	/// Fallback with the HTTP oracle when a price service URL is configured
	pub fn from_settings(settings: &FallbackSettings) -> Self {
		let oracle = settings.price_service_url.as_deref().and_then(|url| {
			match HttpPriceOracle::new(url, Duration::from_millis(settings.timeout_ms)) {
				Ok(oracle) => Some(Arc::new(oracle) as Arc<dyn PriceOracle>),
				Err(e) => {
					warn!("Price fallback oracle unavailable: {}", e);
					None
				},
			}
		});
		Self::new(oracle, settings.clone())
	}

	pub fn disabled() -> Self {
		Self::new(
			None,
			FallbackSettings {
				enabled: false,
				..FallbackSettings::default()
			},
		)
	}

	pub fn is_enabled(&self) -> bool {
		self.settings.enabled
	}

	/// Indicative estimate for `amount` of `from` in `to`, or `None` when no
	/// estimate can be made
	pub async fn estimate(
		&self,
		from: &ResolvedToken,
		to: &ResolvedToken,
		amount: &BaseAmount,
	) -> Option<QuoteResult> {
		if !self.settings.enabled {
			return None;
		}

		let amount_in = Decimal::from_str(&amount.to_decimal_string(from.decimals)).ok()?;
		let multiplier = if normalize_symbol(&from.symbol) == normalize_symbol(&to.symbol) {
			decimal(self.settings.same_symbol_multiplier)?
		} else {
			self.price_multiplier(from, to).await?
		};

		let amount_out = amount_in
			.checked_mul(multiplier)?
			.round_dp(u32::from(to.decimals));
		let to_amount = match to_base_units(&amount_out.normalize().to_string(), to.decimals) {
			Ok(to_amount) if !to_amount.is_zero() => to_amount,
			_ => return None,
		};

		info!(
			"Price fallback estimate {} {} -> {} {} (multiplier {})",
			amount_in, from.symbol, amount_out, to.symbol, multiplier
		);
		Some(
			QuoteResult::new(PRICE_FALLBACK_PROVIDER, amount.clone(), to_amount)
				.with_fees(FeeBreakdown::default())
				.with_warning(FALLBACK_WARNING)
				.indicative(),
		)
	}

	/// `to` units per `from` unit, derived from spot prices
	async fn price_multiplier(&self, from: &ResolvedToken, to: &ResolvedToken) -> Option<Decimal> {
		let oracle = self.oracle.as_ref()?;
		let from_keys = price_keys(from);
		let to_keys = price_keys(to);
		let keys: Vec<String> = from_keys.iter().chain(to_keys.iter()).cloned().collect();

		let prices = match oracle.fetch_prices(keys).await {
			Ok(prices) => prices,
			Err(e) => {
				warn!("Price fallback lookup failed: {}", e);
				return None;
			},
		};
		let from_price = lookup(&prices, &from_keys);
		let to_price = lookup(&prices, &to_keys);

		let ratio = match (from_price, to_price) {
			(Some(from_price), Some(to_price)) => from_price / to_price,
			(Some(from_price), None) => {
				// a stablecoin is worth a dollar; anything else is valued at parity
				let to_price = if to.is_stablecoin { 1.0 } else { from_price };
				from_price / to_price * self.settings.single_price_multiplier
			},
			(None, Some(to_price)) => {
				let from_price = if from.is_stablecoin { 1.0 } else { to_price };
				from_price / to_price * self.settings.single_price_multiplier
			},
			(None, None) => {
				debug!("No spot price for {} or {}", from.symbol, to.symbol);
				return None;
			},
		};

		decimal(ratio).filter(|r| r.is_sign_positive() && !r.is_zero())
	}
}

/// Lookup keys a price service may use for a token
fn price_keys(token: &ResolvedToken) -> Vec<String> {
	let candidates = [
		token.token_id.clone(),
		token.symbol.clone(),
		token.symbol.to_ascii_lowercase(),
		normalize_symbol(&token.symbol),
	];
	let mut keys = Vec::with_capacity(candidates.len());
	for key in candidates {
		if !keys.contains(&key) {
			keys.push(key);
		}
	}
	keys
}

/// Shortest decimal form of a float, so 0.995 stays 0.995
fn decimal(value: f64) -> Option<Decimal> {
	if !value.is_finite() {
		return None;
	}
	Decimal::from_str(&value.to_string()).ok()
}

fn lookup(prices: &HashMap<String, f64>, keys: &[String]) -> Option<f64> {
	keys.iter().find_map(|key| prices.get(key).copied())
}
