//! Configuration settings structures

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use url::Url;
use xswap_types::constants::limits::{
	DEFAULT_GLOBAL_TIMEOUT_MS, DEFAULT_NEGATIVE_TTL_SECS, DEFAULT_NO_ROUTE_TTL_SECS,
	DEFAULT_PRICE_TIMEOUT_MS, DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_QUOTE_TTL_SECS,
	DEFAULT_RATE_LIMIT_BURST_SIZE, DEFAULT_RATE_LIMIT_REQUESTS_PER_MINUTE, DEFAULT_SLIPPAGE_BPS,
	MAX_PROVIDER_TIMEOUT_MS, MAX_SLIPPAGE_BPS, MIN_PROVIDER_TIMEOUT_MS,
};
use xswap_types::{Family, ProviderRuntimeConfig};

use crate::configurable_value::ConfigurableValue;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub providers: ProviderMap,
	pub timeouts: TimeoutSettings,
	pub cache: CacheSettings,
	pub sanity: SanitySettings,
	pub fallback: FallbackSettings,
	pub routing: RoutingSettings,
	/// JSON-RPC / HTTP API endpoint per network id, used for confirmation polling
	pub rpc: HashMap<String, String>,
	pub quotes: QuoteSettings,
	pub environment: EnvironmentSettings,
	pub logging: LoggingSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
		}
	}
}

/// Provider settings keyed by provider id
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct ProviderMap(pub HashMap<String, ProviderSettings>);

impl Default for ProviderMap {
	fn default() -> Self {
		let defaults = [
			("relay", "https://api.relay.link", 1, Some("RELAY_API_KEY")),
			("lifi", "https://li.quest/v1", 2, Some("LIFI_API_KEY")),
			("across", "https://app.across.to/api", 3, None),
			("debridge", "https://dln.debridge.finance/v1.0", 4, Some("DEBRIDGE_ACCESS_TOKEN")),
			("jupiter", "https://lite-api.jup.ag/swap/v1", 5, Some("JUPITER_API_KEY")),
			("stonfi", "https://api.ston.fi", 6, None),
		];
		Self(
			defaults
				.into_iter()
				.map(|(id, endpoint, priority, key_env)| {
					(
						id.to_string(),
						ProviderSettings {
							adapter: id.to_string(),
							endpoint: endpoint.to_string(),
							enabled: true,
							priority,
							timeout_ms: None,
							api_key: key_env.map(ConfigurableValue::from_env),
							headers: None,
						},
					)
				})
				.collect(),
		)
	}
}

/// Individual provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
	/// Adapter type: lifi, across, relay, debridge, jupiter, stonfi
	pub adapter: String,
	pub endpoint: String,
	#[serde(default = "default_true")]
	pub enabled: bool,
	/// Lower is more trusted
	pub priority: u32,
	/// Overrides `timeouts.default_provider_ms`
	#[serde(default)]
	pub timeout_ms: Option<u64>,
	#[serde(default)]
	pub api_key: Option<ConfigurableValue>,
	#[serde(default)]
	pub headers: Option<HashMap<String, String>>,
}

fn default_true() -> bool {
	true
}

impl ProviderSettings {
	pub fn effective_timeout_ms(&self, timeouts: &TimeoutSettings) -> u64 {
		self.timeout_ms.unwrap_or(timeouts.default_provider_ms)
	}

	/// Adapter-facing config; an unresolvable API key is treated as absent
	pub fn runtime_config(&self, provider_id: &str, timeouts: &TimeoutSettings) -> ProviderRuntimeConfig {
		let mut config = ProviderRuntimeConfig::new(
			provider_id,
			&self.endpoint,
			self.effective_timeout_ms(timeouts),
		)
		.with_api_key(self.api_key.as_ref().and_then(|key| key.resolve_optional()));
		if let Some(headers) = &self.headers {
			config = config.with_headers(headers.clone());
		}
		config
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutSettings {
	/// Per-provider quote timeout in milliseconds
	pub default_provider_ms: u64,
	/// Deadline for a whole fan-out in milliseconds
	pub global_ms: u64,
}

impl Default for TimeoutSettings {
	fn default() -> Self {
		Self {
			default_provider_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
			global_ms: DEFAULT_GLOBAL_TIMEOUT_MS,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CacheSettings {
	pub quote_ttl_secs: u64,
	pub no_route_ttl_secs: u64,
	pub negative_ttl_secs: u64,
	/// Period of the background purge of expired entries; 0 disables it
	pub cleanup_interval_secs: u64,
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self {
			quote_ttl_secs: DEFAULT_QUOTE_TTL_SECS,
			no_route_ttl_secs: DEFAULT_NO_ROUTE_TTL_SECS,
			negative_ttl_secs: DEFAULT_NEGATIVE_TTL_SECS,
			cleanup_interval_secs: 60,
		}
	}
}

/// Output/input ratio bands used to reject implausible quotes
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SanitySettings {
	/// Ratio (either direction) beyond which a stable-value pair is assumed
	/// to have been quoted with the wrong decimals
	pub decimals_mismatch_ratio: f64,
	pub same_symbol_min_ratio: f64,
	pub same_symbol_max_ratio: f64,
	pub stablecoin_min_ratio: f64,
	pub stablecoin_max_ratio: f64,
	/// Accepted but flagged below this ratio
	pub suspicious_below_ratio: f64,
	pub stablecoin_suspicious_below_ratio: f64,
}

impl Default for SanitySettings {
	fn default() -> Self {
		Self {
			decimals_mismatch_ratio: 1e10,
			same_symbol_min_ratio: 0.005,
			same_symbol_max_ratio: 1.01,
			stablecoin_min_ratio: 0.8,
			stablecoin_max_ratio: 1.01,
			suspicious_below_ratio: 0.9,
			stablecoin_suspicious_below_ratio: 0.97,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FallbackSettings {
	pub enabled: bool,
	/// Spot-price service returning `{ok, prices: {tokenId: usd}}`
	pub price_service_url: Option<String>,
	pub timeout_ms: u64,
	pub same_symbol_multiplier: f64,
	pub single_price_multiplier: f64,
}

impl Default for FallbackSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			price_service_url: None,
			timeout_ms: DEFAULT_PRICE_TIMEOUT_MS,
			same_symbol_multiplier: 0.995,
			single_price_multiplier: 0.9,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RoutingSettings {
	/// EVM network used as the intermediate point of hub routes
	pub evm_hub: String,
	/// Canonical bridge token per network id; unlisted networks use the family default
	pub bridge_tokens: HashMap<String, String>,
}

impl Default for RoutingSettings {
	fn default() -> Self {
		Self {
			evm_hub: "arbitrum".to_string(),
			bridge_tokens: HashMap::new(),
		}
	}
}

impl RoutingSettings {
	pub fn bridge_token_for(&self, network_id: &str, family: Family) -> String {
		if let Some(token) = self.bridge_tokens.get(network_id) {
			return token.clone();
		}
		match family {
			Family::Ton | Family::Tron => "usdt".to_string(),
			_ => "usdc".to_string(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct QuoteSettings {
	/// Families the quote orchestrator accepts directly
	pub allowed_families: Vec<Family>,
	pub default_slippage_bps: u32,
}

impl Default for QuoteSettings {
	fn default() -> Self {
		Self {
			allowed_families: vec![Family::Evm, Family::Solana, Family::Ton],
			default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EnvironmentSettings {
	pub profile: EnvironmentProfile,
	pub debug: bool,
	pub rate_limiting: RateLimitSettings,
}

impl Default for EnvironmentSettings {
	fn default() -> Self {
		Self {
			profile: EnvironmentProfile::Development,
			debug: false,
			rate_limiting: RateLimitSettings::default(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
	Development,
	Staging,
	Production,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitSettings {
	pub enabled: bool,
	pub requests_per_minute: u32,
	pub burst_size: u32,
}

impl Default for RateLimitSettings {
	fn default() -> Self {
		Self {
			enabled: false,
			requests_per_minute: DEFAULT_RATE_LIMIT_REQUESTS_PER_MINUTE,
			burst_size: DEFAULT_RATE_LIMIT_BURST_SIZE,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
	#[error("Provider {provider_id}: {reason}")]
	InvalidProvider { provider_id: String, reason: String },

	#[error("Providers {first} and {second} share priority {priority}")]
	DuplicatePriority {
		first: String,
		second: String,
		priority: u32,
	},

	#[error("Invalid timeout: {reason}")]
	InvalidTimeout { reason: String },

	#[error("Invalid sanity bands: {reason}")]
	InvalidSanityBands { reason: String },

	#[error("Invalid fallback settings: {reason}")]
	InvalidFallback { reason: String },

	#[error("Invalid quote settings: {reason}")]
	InvalidQuotes { reason: String },
}

impl Settings {
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Enabled providers ordered by priority
	pub fn enabled_providers(&self) -> Vec<(&String, &ProviderSettings)> {
		let mut providers: Vec<_> = self.providers.0.iter().filter(|(_, p)| p.enabled).collect();
		providers.sort_by_key(|(id, p)| (p.priority, (*id).clone()));
		providers
	}

	pub fn is_production(&self) -> bool {
		self.environment.profile == EnvironmentProfile::Production
	}

	/// Verbose error detail is never exposed in production
	pub fn is_debug(&self) -> bool {
		self.environment.debug && !self.is_production()
	}

	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		self.validate_providers()?;
		self.validate_timeouts()?;
		self.validate_sanity()?;
		self.validate_fallback()?;
		self.validate_quotes()
	}

	fn validate_providers(&self) -> Result<(), ConfigValidationError> {
		let mut ids: Vec<&String> = self.providers.0.keys().collect();
		ids.sort();

		let mut priorities: HashMap<u32, &String> = HashMap::new();
		for id in ids {
			let provider = &self.providers.0[id];
			let invalid = |reason: &str| ConfigValidationError::InvalidProvider {
				provider_id: id.clone(),
				reason: reason.to_string(),
			};
			if provider.adapter.trim().is_empty() {
				return Err(invalid("adapter type is empty"));
			}
			match Url::parse(&provider.endpoint) {
				Ok(url) if matches!(url.scheme(), "http" | "https") => {},
				Ok(_) => return Err(invalid("only HTTP and HTTPS schemes are supported")),
				Err(e) => return Err(invalid(&format!("invalid endpoint URL: {}", e))),
			}
			let timeout = provider.effective_timeout_ms(&self.timeouts);
			if !(MIN_PROVIDER_TIMEOUT_MS..=MAX_PROVIDER_TIMEOUT_MS).contains(&timeout) {
				return Err(invalid(&format!(
					"timeout {}ms outside {}..={}ms",
					timeout, MIN_PROVIDER_TIMEOUT_MS, MAX_PROVIDER_TIMEOUT_MS
				)));
			}
			if let Some(first) = priorities.insert(provider.priority, id) {
				return Err(ConfigValidationError::DuplicatePriority {
					first: first.clone(),
					second: id.clone(),
					priority: provider.priority,
				});
			}
		}
		Ok(())
	}

	fn validate_timeouts(&self) -> Result<(), ConfigValidationError> {
		if self.timeouts.default_provider_ms == 0 || self.timeouts.global_ms == 0 {
			return Err(ConfigValidationError::InvalidTimeout {
				reason: "timeouts must be positive".to_string(),
			});
		}
		if self.timeouts.global_ms < self.timeouts.default_provider_ms {
			return Err(ConfigValidationError::InvalidTimeout {
				reason: format!(
					"global timeout {}ms is shorter than provider timeout {}ms",
					self.timeouts.global_ms, self.timeouts.default_provider_ms
				),
			});
		}
		Ok(())
	}

	fn validate_sanity(&self) -> Result<(), ConfigValidationError> {
		let s = &self.sanity;
		let ordered = |low: f64, high: f64, what: &str| {
			if low > 0.0 && low < high {
				Ok(())
			} else {
				Err(ConfigValidationError::InvalidSanityBands {
					reason: format!("{} ({} .. {})", what, low, high),
				})
			}
		};
		ordered(s.same_symbol_min_ratio, s.suspicious_below_ratio, "same-symbol min below suspicious")?;
		ordered(s.suspicious_below_ratio, s.same_symbol_max_ratio, "suspicious below max")?;
		ordered(s.stablecoin_min_ratio, s.stablecoin_suspicious_below_ratio, "stablecoin min below suspicious")?;
		ordered(s.stablecoin_suspicious_below_ratio, s.stablecoin_max_ratio, "stablecoin suspicious below max")?;
		ordered(1.0, s.decimals_mismatch_ratio, "decimals mismatch ratio above 1")
	}

	fn validate_fallback(&self) -> Result<(), ConfigValidationError> {
		let f = &self.fallback;
		for (name, value) in [
			("same_symbol_multiplier", f.same_symbol_multiplier),
			("single_price_multiplier", f.single_price_multiplier),
		] {
			if !(value > 0.0 && value <= 1.0) {
				return Err(ConfigValidationError::InvalidFallback {
					reason: format!("{} must be in (0, 1], got {}", name, value),
				});
			}
		}
		if f.enabled && f.timeout_ms == 0 {
			return Err(ConfigValidationError::InvalidFallback {
				reason: "timeout_ms must be positive".to_string(),
			});
		}
		Ok(())
	}

	fn validate_quotes(&self) -> Result<(), ConfigValidationError> {
		let q = &self.quotes;
		if q.allowed_families.is_empty() {
			return Err(ConfigValidationError::InvalidQuotes {
				reason: "allowed_families is empty".to_string(),
			});
		}
		let unique: HashSet<_> = q.allowed_families.iter().collect();
		if unique.contains(&Family::Unsupported) {
			return Err(ConfigValidationError::InvalidQuotes {
				reason: "UNSUPPORTED cannot be an allowed family".to_string(),
			});
		}
		if q.default_slippage_bps > MAX_SLIPPAGE_BPS {
			return Err(ConfigValidationError::InvalidQuotes {
				reason: format!(
					"default_slippage_bps {} exceeds {}",
					q.default_slippage_bps, MAX_SLIPPAGE_BPS
				),
			});
		}
		Ok(())
	}
}
