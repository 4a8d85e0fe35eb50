//! Core aggregation service logic
//!
//! Validates and canonicalizes a request, answers from the caches when it
//! can, and otherwise fans out to every enabled provider once per canonical
//! key. The first quote in priority order that passes the sanity checks
//! wins; when none does, the price fallback produces an indicative estimate.

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};
use xswap_adapters::ProviderRegistry;
use xswap_config::Settings;
use xswap_types::constants::{is_zero_address, PLACEHOLDER_USER_ADDRESS};
use xswap_types::{
	to_base_units, AggregatedQuote, AggregationMetadata, AssetRegistry, BaseAmount, CacheStats,
	CacheStore, ErrorCode, Family, ProviderError, ProviderOutcome, QuoteError, QuoteInput,
	QuoteRequest, QuoteResult, QuoteSource, RejectedQuote, ResolvedToken, Side, SkippedProvider,
};

use crate::coalescing::{InFlightRequests, QuoteOutcome};
use crate::price_fallback::PriceFallback;
use crate::sanity::QuoteSanityChecker;

pub type AggregatorResult<T> = Result<T, QuoteError>;

pub const INDICATIVE_WARNING: &str = "No user address supplied; quote is indicative only";

/// Orchestrator tunables, usually derived from [`Settings`]
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
	pub quote_ttl: Duration,
	pub no_route_ttl: Duration,
	pub negative_ttl: Duration,
	pub global_timeout: Duration,
	pub allowed_families: Vec<Family>,
	pub default_slippage_bps: u32,
}

impl AggregatorConfig {
	pub fn from_settings(settings: &Settings) -> Self {
		Self {
			quote_ttl: Duration::from_secs(settings.cache.quote_ttl_secs),
			no_route_ttl: Duration::from_secs(settings.cache.no_route_ttl_secs),
			negative_ttl: Duration::from_secs(settings.cache.negative_ttl_secs),
			global_timeout: Duration::from_millis(settings.timeouts.global_ms),
			allowed_families: settings.quotes.allowed_families.clone(),
			default_slippage_bps: settings.quotes.default_slippage_bps,
		}
	}
}

impl Default for AggregatorConfig {
	fn default() -> Self {
		Self::from_settings(&Settings::default())
	}
}

/// A quote request with both tokens resolved and the amount in base units.
/// The route planner quotes its legs through this form.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuoteRequest {
	pub from: ResolvedToken,
	pub to: ResolvedToken,
	pub amount: BaseAmount,
	pub user_address: Option<String>,
	pub recipient: Option<String>,
	pub slippage_bps: Option<u32>,
}

impl ResolvedQuoteRequest {
	pub fn new(from: ResolvedToken, to: ResolvedToken, amount: BaseAmount) -> Self {
		Self {
			from,
			to,
			amount,
			user_address: None,
			recipient: None,
			slippage_bps: None,
		}
	}

	pub fn with_user(mut self, user_address: Option<String>) -> Self {
		self.user_address = user_address;
		self
	}

	pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
		self.recipient = recipient;
		self
	}

	pub fn with_slippage_bps(mut self, slippage_bps: Option<u32>) -> Self {
		self.slippage_bps = slippage_bps;
		self
	}
}

/// Trait for quote aggregation - enables mocking in planner and API tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregatorTrait: Send + Sync {
	/// Quote a caller-facing request (human amount, token and network ids)
	async fn get_quote(&self, request: &QuoteRequest) -> AggregatorResult<AggregatedQuote>;

	/// Quote an already-resolved request
	async fn quote_resolved(
		&self,
		request: ResolvedQuoteRequest,
	) -> AggregatorResult<AggregatedQuote>;

	async fn cache_stats(&self) -> CacheStats;

	async fn clear_caches(&self);
}

/// Service for aggregating quotes from multiple providers
#[derive(Debug, Clone)]
pub struct AggregatorService {
	assets: Arc<AssetRegistry>,
	providers: Arc<ProviderRegistry>,
	cache: Arc<dyn CacheStore>,
	in_flight: InFlightRequests,
	sanity: QuoteSanityChecker,
	fallback: PriceFallback,
	config: AggregatorConfig,
}

struct FanOutReport {
	outcomes: Vec<ProviderOutcome>,
	metadata: AggregationMetadata,
}

impl AggregatorService {
	pub fn new(
		assets: Arc<AssetRegistry>,
		providers: Arc<ProviderRegistry>,
		cache: Arc<dyn CacheStore>,
		sanity: QuoteSanityChecker,
		fallback: PriceFallback,
		config: AggregatorConfig,
	) -> Self {
		Self {
			assets,
			providers,
			cache,
			in_flight: InFlightRequests::new(),
			sanity,
			fallback,
			config,
		}
	}

	pub fn assets(&self) -> &Arc<AssetRegistry> {
		&self.assets
	}

	pub fn providers(&self) -> &Arc<ProviderRegistry> {
		&self.providers
	}

	pub fn config(&self) -> &AggregatorConfig {
		&self.config
	}

	/// Computations currently in flight
	pub fn in_flight_count(&self) -> usize {
		self.in_flight.len()
	}

	/// Whether the orchestrator accepts quotes touching this family
	pub fn allows_family(&self, family: Family) -> bool {
		self.config.allowed_families.contains(&family)
	}

	/// Resolve a caller-facing request against the asset registry
	pub fn resolve_request(&self, request: &QuoteRequest) -> AggregatorResult<ResolvedQuoteRequest> {
		request.validate()?;

		let from = self
			.assets
			.resolve(&request.from_token_id, &request.from_network_id)
			.map_err(|e| QuoteError::from_asset(e, Side::From))?;
		let to = self
			.assets
			.resolve(&request.to_token_id, &request.to_network_id)
			.map_err(|e| QuoteError::from_asset(e, Side::To))?;

		for (token, provided) in [(&from, request.from_decimals), (&to, request.to_decimals)] {
			if let Some(provided) = provided {
				if provided != token.decimals {
					return Err(QuoteError::TokenDecimalsMismatch {
						token_id: token.token_id.clone(),
						network_id: token.network_id.clone(),
						expected: token.decimals,
						provided,
					});
				}
			}
		}

		let amount = to_base_units(&request.amount, from.decimals).map_err(|e| {
			QuoteError::InvalidAmount {
				reason: e.to_string(),
			}
		})?;

		Ok(ResolvedQuoteRequest::new(from, to, amount)
			.with_user(request.user().map(str::to_string))
			.with_recipient(
				request
					.recipient
					.as_deref()
					.map(str::trim)
					.filter(|r| !r.is_empty())
					.map(str::to_string),
			)
			.with_slippage_bps(request.slippage_bps))
	}

	/// Validate a resolved request and build the canonical provider input
	pub fn prepare(&self, request: ResolvedQuoteRequest) -> AggregatorResult<QuoteInput> {
		if request.amount.is_zero() {
			return Err(QuoteError::InvalidAmount {
				reason: "amount must be greater than zero".to_string(),
			});
		}

		for token in [&request.from, &request.to] {
			if !self.allows_family(token.family) {
				return Err(QuoteError::UnsupportedNetwork {
					network_id: token.network_id.clone(),
					reason: format!("{} networks are not enabled for quoting", token.family),
				});
			}
		}
		check_address(&request.from)?;
		check_address(&request.to)?;

		let (user_address, indicative) = match request.user_address {
			Some(user) if !user.trim().is_empty() => (user.trim().to_string(), false),
			_ => (PLACEHOLDER_USER_ADDRESS.to_string(), true),
		};

		let mut input = QuoteInput::new(request.from, request.to, request.amount, &user_address)
			.with_slippage_bps(request.slippage_bps.unwrap_or(self.config.default_slippage_bps));
		if let Some(recipient) = request.recipient {
			input = input.with_recipient(recipient);
		}
		if indicative {
			input = input.indicative();
		}
		Ok(input)
	}

	/// Coalescing and cache key for a fully-resolved input
	pub fn canonical_key(input: &QuoteInput) -> String {
		format!(
			"{}:{}->{}:{}|{}|{}|{}|{}|{}",
			input.from.chain_key(),
			input.from.token_id,
			input.to.chain_key(),
			input.to.token_id,
			input.amount,
			normalize_address(&input.user_address, input.from.family),
			input
				.recipient
				.as_deref()
				.map(|r| normalize_address(r, input.to.family))
				.unwrap_or_else(|| "-".to_string()),
			if input.indicative { "indicative" } else { "firm" },
			input.slippage_bps
		)
	}

	async fn compute(self, input: QuoteInput, key: String) -> QuoteOutcome {
		let started = Instant::now();
		let report = self.fan_out(&input).await;
		let mut metadata = report.metadata;

		let mut candidates: Vec<&QuoteResult> = report
			.outcomes
			.iter()
			.filter_map(|outcome| match outcome {
				ProviderOutcome::Quoted(quote) => Some(quote),
				_ => None,
			})
			.collect();
		candidates.sort_by_key(|quote| {
			self.providers
				.priority_of(&quote.provider)
				.unwrap_or(u32::MAX)
		});

		let mut first_rejection: Option<QuoteError> = None;
		for quote in candidates {
			match self.sanity.check(&input.from, &input.to, quote) {
				Ok(warnings) => {
					info!(
						"Selected quote from {} for {} ({} -> {})",
						quote.provider, key, input.amount, quote.to_amount
					);
					metadata.duration_ms = started.elapsed().as_millis() as u64;
					let aggregated = self.aggregate(
						&input,
						quote.clone(),
						QuoteSource::Provider,
						warnings,
						metadata,
					);
					self.store_quote(&key, &aggregated).await;
					return Ok(aggregated);
				},
				Err(error) => {
					warn!("Rejected quote from {}: {}", quote.provider, error);
					metadata.rejected.push(RejectedQuote {
						provider: quote.provider.clone(),
						code: error.code(),
						reason: error.to_string(),
					});
					first_rejection.get_or_insert(error);
				},
			}
		}

		if let Some(estimate) = self
			.fallback
			.estimate(&input.from, &input.to, &input.amount)
			.await
		{
			metadata.duration_ms = started.elapsed().as_millis() as u64;
			let aggregated = self.aggregate(
				&input,
				estimate,
				QuoteSource::PriceFallback,
				Vec::new(),
				metadata,
			);
			self.store_quote(&key, &aggregated).await;
			return Ok(aggregated);
		}

		let error = match first_rejection {
			Some(error) => error,
			None => {
				let provider_errors: Vec<ProviderError> = metadata.errors.clone();
				QuoteError::NoRoute {
					reason: format!(
						"no provider could quote {} {} -> {} {}",
						input.from.symbol,
						input.from.network_id,
						input.to.symbol,
						input.to.network_id
					),
					provider_errors,
				}
			},
		};

		if error.code() == ErrorCode::NoRoute {
			if let Err(e) = self
				.cache
				.put_no_route(&key, error.clone(), self.config.no_route_ttl)
				.await
			{
				warn!("Failed to cache no-route result for {}: {}", key, e);
			}
		}
		info!("No usable quote for {}: {}", key, error);
		Err(error)
	}

	/// Query every enabled provider concurrently under the global deadline
	async fn fan_out(&self, input: &QuoteInput) -> FanOutReport {
		let started = Instant::now();
		let deadline = started + self.config.global_timeout;
		let pair_key = input.pair_key();
		let mut metadata = AggregationMetadata::default();
		let mut outcomes = Vec::new();
		let mut outstanding = BTreeSet::new();
		let mut tasks = FuturesUnordered::new();

		for provider in self.providers.enabled() {
			let provider_id = provider.id().to_string();
			metadata.providers_queried += 1;

			if self.is_negative(&provider_id, &pair_key).await {
				debug!("Provider {} is negative-cached for {}", provider_id, pair_key);
				outcomes.push(ProviderOutcome::Skipped {
					provider: provider_id,
					reason: "pair cached as unsupported".to_string(),
				});
				continue;
			}

			debug!("Dispatching quote to provider {}", provider_id);
			outstanding.insert(provider_id.clone());
			let providers = Arc::clone(&self.providers);
			let task_input = input.clone();
			let task_id = provider_id.clone();
			tasks.push(
				tokio::spawn(async move { providers.dispatch(&task_id, &task_input).await })
					.map(move |joined| (provider_id, joined)),
			);
		}

		loop {
			match tokio::time::timeout_at(deadline, tasks.next()).await {
				Ok(Some((provider_id, joined))) => {
					outstanding.remove(&provider_id);
					let outcome = joined.unwrap_or_else(|e| {
						ProviderOutcome::Failed(ProviderError::new(
							&provider_id,
							ErrorCode::ApiError,
							format!("provider task failed: {}", e),
						))
					});
					if let ProviderOutcome::Skipped { provider, reason } = &outcome {
						self.remember_unsupported(provider, &pair_key, reason).await;
					}
					outcomes.push(outcome);
				},
				Ok(None) => break,
				Err(_) => {
					warn!(
						"Global aggregation timeout reached after {}ms with {} providers outstanding",
						self.config.global_timeout.as_millis(),
						outstanding.len()
					);
					let timeout_ms = self.config.global_timeout.as_millis() as u64;
					for provider_id in std::mem::take(&mut outstanding) {
						outcomes.push(ProviderOutcome::Failed(ProviderError::timeout(
							&provider_id,
							timeout_ms,
						)));
					}
					break;
				},
			}
		}

		for outcome in &outcomes {
			match outcome {
				ProviderOutcome::Quoted(quote) => {
					debug!(
						"Provider {} quoted {} in {}ms",
						quote.provider, quote.to_amount, quote.latency_ms
					);
					metadata.providers_succeeded += 1;
				},
				ProviderOutcome::Skipped { provider, reason } => {
					metadata.providers_skipped += 1;
					metadata.skipped.push(SkippedProvider {
						provider: provider.clone(),
						reason: reason.clone(),
					});
				},
				ProviderOutcome::Failed(error) => {
					warn!("Provider {} failed: {}", error.provider, error.message);
					if error.is_timeout() {
						metadata.providers_timed_out += 1;
					} else {
						metadata.providers_failed += 1;
					}
					metadata.errors.push(error.clone());
				},
			}
		}
		metadata.duration_ms = started.elapsed().as_millis() as u64;

		info!(
			"Quote fan-out completed: {} quoted, {} skipped, {} failed, {} timed out of {} providers",
			metadata.providers_succeeded,
			metadata.providers_skipped,
			metadata.providers_failed,
			metadata.providers_timed_out,
			metadata.providers_queried
		);
		FanOutReport { outcomes, metadata }
	}

	fn aggregate(
		&self,
		input: &QuoteInput,
		quote: QuoteResult,
		source: QuoteSource,
		mut warnings: Vec<String>,
		metadata: AggregationMetadata,
	) -> AggregatedQuote {
		if input.indicative {
			warnings.insert(0, INDICATIVE_WARNING.to_string());
		}
		AggregatedQuote {
			in_amount: input.amount.to_decimal_string(input.from.decimals),
			out_amount: quote.to_amount.to_decimal_string(input.to.decimals),
			from: input.from.clone(),
			to: input.to.clone(),
			quote,
			source,
			warnings,
			metadata,
		}
	}

	async fn store_quote(&self, key: &str, quote: &AggregatedQuote) {
		if let Err(e) = self
			.cache
			.put_quote(key, quote.clone(), self.config.quote_ttl)
			.await
		{
			warn!("Failed to cache quote for {}: {}", key, e);
		}
	}

	async fn is_negative(&self, provider_id: &str, pair_key: &str) -> bool {
		self.cache
			.is_negative(provider_id, pair_key)
			.await
			.unwrap_or_else(|e| {
				warn!("Negative cache lookup failed: {}", e);
				false
			})
	}

	async fn remember_unsupported(&self, provider_id: &str, pair_key: &str, reason: &str) {
		if let Err(e) = self
			.cache
			.put_negative(provider_id, pair_key, reason, self.config.negative_ttl)
			.await
		{
			warn!("Failed to record unsupported pair for {}: {}", provider_id, e);
		}
	}

	async fn cached(&self, key: &str) -> Option<AggregatorResult<AggregatedQuote>> {
		match self.cache.get_quote(key).await {
			Ok(Some(mut quote)) => {
				debug!("Quote cache hit for {}", key);
				quote.metadata.served_from_cache = true;
				return Some(Ok(quote));
			},
			Ok(None) => {},
			Err(e) => warn!("Quote cache lookup failed: {}", e),
		}
		match self.cache.get_no_route(key).await {
			Ok(Some(error)) => {
				debug!("No-route cache hit for {}", key);
				Some(Err(error))
			},
			Ok(None) => None,
			Err(e) => {
				warn!("No-route cache lookup failed: {}", e);
				None
			},
		}
	}
}

#[async_trait]
impl AggregatorTrait for AggregatorService {
	async fn get_quote(&self, request: &QuoteRequest) -> AggregatorResult<AggregatedQuote> {
		let resolved = self.resolve_request(request)?;
		self.quote_resolved(resolved).await
	}

	async fn quote_resolved(
		&self,
		request: ResolvedQuoteRequest,
	) -> AggregatorResult<AggregatedQuote> {
		let input = self.prepare(request)?;
		let key = Self::canonical_key(&input);

		if let Some(cached) = self.cached(&key).await {
			return cached;
		}

		let service = self.clone();
		let computation_key = key.clone();
		let (outcome, coalesced) = self.in_flight.join_or_start(&key, move || {
			async move { service.compute(input, computation_key).await }.boxed()
		});

		let mut result = outcome.await;
		if coalesced {
			if let Ok(quote) = &mut result {
				quote.metadata.coalesced = true;
			}
		}
		result
	}

	async fn cache_stats(&self) -> CacheStats {
		self.cache.stats().await.unwrap_or_else(|e| {
			warn!("Cache stats unavailable: {}", e);
			CacheStats::default()
		})
	}

	async fn clear_caches(&self) {
		match self.cache.clear().await {
			Ok(()) => info!("Quote caches cleared"),
			Err(e) => warn!("Failed to clear quote caches: {}", e),
		}
	}
}

/// Native tokens must use the zero address on EVM and never elsewhere
fn check_address(token: &ResolvedToken) -> AggregatorResult<()> {
	let zero = is_zero_address(&token.address);
	let consistent = if token.family.is_evm() {
		zero == token.is_native
	} else {
		!zero
	};
	if consistent && !token.address.trim().is_empty() {
		return Ok(());
	}
	Err(QuoteError::TokenAddressMappingBug {
		reason: format!(
			"{} on {} resolved to {:?} (native: {})",
			token.token_id, token.network_id, token.address, token.is_native
		),
	})
}

/// EVM addresses are case-insensitive; other families are not
fn normalize_address(address: &str, family: Family) -> String {
	if family.is_evm() {
		address.to_ascii_lowercase()
	} else {
		address.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use xswap_config::FallbackSettings;
	use xswap_storage::MemoryStore;
	use xswap_types::{
		AdapterError, AdapterResult, ProviderAdapter, ProviderInfo, ProviderRuntimeConfig,
	};

	#[derive(Debug, Clone, Copy)]
	enum Behaviour {
		/// Output as a percentage of input (same-decimals pairs)
		Percent(u128),
		Fail,
		Unsupported,
		/// No route below the given base amount, 99% above it
		NoRouteBelow(u128),
	}

	#[derive(Debug)]
	struct ScriptedAdapter {
		info: ProviderInfo,
		behaviour: Behaviour,
		delay: Duration,
		calls: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl ProviderAdapter for ScriptedAdapter {
		fn provider_info(&self) -> &ProviderInfo {
			&self.info
		}

		async fn fetch_quote(
			&self,
			input: &QuoteInput,
			_config: &ProviderRuntimeConfig,
		) -> AdapterResult<QuoteResult> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			tokio::time::sleep(self.delay).await;
			match self.behaviour {
				Behaviour::Percent(pct) => {
					let amount: u128 = input.amount.as_str().parse().unwrap();
					Ok(QuoteResult::new(
						self.id(),
						input.amount.clone(),
						BaseAmount::from(amount * pct / 100),
					))
				},
				Behaviour::Fail => Err(AdapterError::from_http_failure(502, "")),
				Behaviour::Unsupported => Err(AdapterError::unsupported("no route")),
				Behaviour::NoRouteBelow(minimum) => {
					let amount: u128 = input.amount.as_str().parse().unwrap();
					if amount < minimum {
						return Err(AdapterError::no_route(
							"No available quotes for the requested transfer",
						));
					}
					Ok(QuoteResult::new(
						self.id(),
						input.amount.clone(),
						BaseAmount::from(amount * 99 / 100),
					))
				},
			}
		}
	}

	struct Provider {
		id: &'static str,
		priority: u32,
		behaviour: Behaviour,
		delay_ms: u64,
		timeout_ms: u64,
	}

	impl Provider {
		fn new(id: &'static str, priority: u32, behaviour: Behaviour) -> Self {
			Self {
				id,
				priority,
				behaviour,
				delay_ms: 10,
				timeout_ms: 5_000,
			}
		}

		fn delayed(mut self, delay_ms: u64, timeout_ms: u64) -> Self {
			self.delay_ms = delay_ms;
			self.timeout_ms = timeout_ms;
			self
		}
	}

	struct Harness {
		service: AggregatorService,
		calls: Vec<(&'static str, Arc<AtomicUsize>)>,
	}

	impl Harness {
		fn calls(&self, id: &str) -> usize {
			self.calls
				.iter()
				.find(|(provider, _)| *provider == id)
				.map(|(_, calls)| calls.load(Ordering::SeqCst))
				.unwrap_or(0)
		}
	}

	fn harness(providers: Vec<Provider>, fallback: PriceFallback) -> Harness {
		let mut registry = ProviderRegistry::new();
		let mut calls = Vec::new();
		for provider in providers {
			let counter = Arc::new(AtomicUsize::new(0));
			let adapter = ScriptedAdapter {
				info: ProviderInfo::new(
					provider.id,
					provider.id,
					vec![Family::Evm, Family::Solana],
					true,
				),
				behaviour: provider.behaviour,
				delay: Duration::from_millis(provider.delay_ms),
				calls: Arc::clone(&counter),
			};
			registry
				.register(
					Arc::new(adapter),
					ProviderRuntimeConfig::new(provider.id, "http://localhost", provider.timeout_ms),
					provider.priority,
					true,
				)
				.unwrap();
			calls.push((provider.id, counter));
		}

		let service = AggregatorService::new(
			Arc::new(AssetRegistry::builtin()),
			Arc::new(registry),
			Arc::new(MemoryStore::new()),
			QuoteSanityChecker::default(),
			fallback,
			AggregatorConfig::default(),
		);
		Harness { service, calls }
	}

	fn eth_bridge() -> QuoteRequest {
		QuoteRequest::new("1", "eth", "ethereum", "eth", "arbitrum")
			.with_user("0x1111111111111111111111111111111111111111")
	}

	fn same_symbol_fallback() -> PriceFallback {
		PriceFallback::new(None, FallbackSettings::default())
	}

	#[tokio::test(start_paused = true)]
	async fn test_priority_wins_over_speed() {
		let harness = harness(
			vec![
				Provider::new("fast", 2, Behaviour::Percent(99)).delayed(5, 5_000),
				Provider::new("trusted", 1, Behaviour::Percent(98)).delayed(500, 5_000),
			],
			PriceFallback::disabled(),
		);

		let quote = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert_eq!(quote.provider(), "trusted");
		assert_eq!(quote.source, QuoteSource::Provider);
		assert_eq!(quote.out_amount, "0.98");
		assert_eq!(quote.metadata.providers_succeeded, 2);
		assert!(!quote.is_indicative());
	}

	#[tokio::test(start_paused = true)]
	async fn test_rejected_candidate_falls_through_to_next() {
		let harness = harness(
			vec![
				Provider::new("magic", 1, Behaviour::Percent(150)),
				Provider::new("honest", 2, Behaviour::Percent(99)),
			],
			PriceFallback::disabled(),
		);

		let quote = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert_eq!(quote.provider(), "honest");
		assert_eq!(quote.metadata.rejected.len(), 1);
		assert_eq!(
			quote.metadata.rejected[0].code,
			ErrorCode::SuspiciousQuoteHighOutput
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_integrity_error_when_every_candidate_is_rejected() {
		let harness = harness(
			vec![Provider::new("magic", 1, Behaviour::Percent(150))],
			PriceFallback::disabled(),
		);
		let error = harness.service.get_quote(&eth_bridge()).await.unwrap_err();
		assert_eq!(error.code(), ErrorCode::SuspiciousQuoteHighOutput);
	}

	#[tokio::test(start_paused = true)]
	async fn test_all_failures_use_price_fallback() {
		let harness = harness(
			vec![
				Provider::new("a", 1, Behaviour::Fail),
				Provider::new("b", 2, Behaviour::Fail),
			],
			same_symbol_fallback(),
		);

		let quote = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert_eq!(quote.source, QuoteSource::PriceFallback);
		assert!(quote.is_indicative());
		assert_eq!(quote.quote.to_amount.as_str(), "995000000000000000");
		assert_eq!(quote.metadata.providers_failed, 2);
		assert_eq!(quote.metadata.errors.len(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_concurrent_identical_requests_coalesce() {
		let harness = harness(
			vec![Provider::new("slow", 1, Behaviour::Percent(99)).delayed(200, 5_000)],
			PriceFallback::disabled(),
		);

		let request = eth_bridge();
		let (a, b) = tokio::join!(
			harness.service.get_quote(&request),
			harness.service.get_quote(&request)
		);
		let (a, b) = (a.unwrap(), b.unwrap());
		assert_eq!(harness.calls("slow"), 1);
		assert_eq!(a.quote, b.quote);
		assert!(a.metadata.coalesced != b.metadata.coalesced);
	}

	#[tokio::test(start_paused = true)]
	async fn test_cache_hit_skips_fan_out() {
		let harness = harness(
			vec![Provider::new("p", 1, Behaviour::Percent(99))],
			PriceFallback::disabled(),
		);

		harness.service.get_quote(&eth_bridge()).await.unwrap();
		let second = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert!(second.metadata.served_from_cache);
		assert_eq!(harness.calls("p"), 1);

		tokio::time::advance(Duration::from_secs(31)).await;
		let third = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert!(!third.metadata.served_from_cache);
		assert_eq!(harness.calls("p"), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_no_route_is_cached_until_ttl() {
		let harness = harness(
			vec![Provider::new("down", 1, Behaviour::Fail)],
			PriceFallback::disabled(),
		);

		let error = harness.service.get_quote(&eth_bridge()).await.unwrap_err();
		assert_eq!(error.code(), ErrorCode::NoRoute);
		assert_eq!(error.provider_errors().len(), 1);

		harness.service.get_quote(&eth_bridge()).await.unwrap_err();
		assert_eq!(harness.calls("down"), 1);

		tokio::time::advance(Duration::from_secs(301)).await;
		harness.service.get_quote(&eth_bridge()).await.unwrap_err();
		assert_eq!(harness.calls("down"), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_unsupported_pair_is_negative_cached() {
		let harness = harness(
			vec![
				Provider::new("nope", 1, Behaviour::Unsupported),
				Provider::new("yes", 2, Behaviour::Percent(99)),
			],
			PriceFallback::disabled(),
		);

		let first = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert_eq!(first.metadata.providers_skipped, 1);

		// different amount, same pair
		let mut request = eth_bridge();
		request.amount = "2".to_string();
		let second = harness.service.get_quote(&request).await.unwrap();
		assert_eq!(second.metadata.skipped[0].reason, "pair cached as unsupported");
		assert_eq!(harness.calls("nope"), 1);
		assert_eq!(harness.calls("yes"), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_amount_dependent_no_route_does_not_block_the_pair() {
		let harness = harness(
			vec![Provider::new("lifi", 1, Behaviour::NoRouteBelow(10_000_000_000_000_000))],
			PriceFallback::disabled(),
		);

		let mut dust = eth_bridge();
		dust.amount = "0.001".to_string();
		let error = harness.service.get_quote(&dust).await.unwrap_err();
		assert_eq!(error.code(), ErrorCode::NoRoute);

		let quote = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert_eq!(quote.provider(), "lifi");
		assert_eq!(quote.out_amount, "0.99");
		assert_eq!(harness.calls("lifi"), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_global_deadline_turns_stragglers_into_timeouts() {
		let harness = harness(
			vec![
				Provider::new("stuck", 1, Behaviour::Percent(99)).delayed(60_000, 30_000),
				Provider::new("quick", 2, Behaviour::Percent(98)),
			],
			PriceFallback::disabled(),
		);

		let quote = harness.service.get_quote(&eth_bridge()).await.unwrap();
		assert_eq!(quote.provider(), "quick");
		assert_eq!(quote.metadata.providers_timed_out, 1);
		assert!(quote.metadata.errors[0].is_timeout());
	}

	#[tokio::test(start_paused = true)]
	async fn test_missing_user_makes_quote_indicative() {
		let harness = harness(
			vec![Provider::new("p", 1, Behaviour::Percent(99))],
			PriceFallback::disabled(),
		);
		let request = QuoteRequest::new("1", "eth", "ethereum", "eth", "base");
		let quote = harness.service.get_quote(&request).await.unwrap();
		assert!(quote.is_indicative());
		assert_eq!(quote.warnings[0], INDICATIVE_WARNING);
	}

	#[tokio::test]
	async fn test_input_validation() {
		let harness = harness(vec![], PriceFallback::disabled());
		let service = &harness.service;

		let zero = QuoteRequest::new("0", "eth", "ethereum", "eth", "base");
		assert_eq!(service.get_quote(&zero).await.unwrap_err().code(), ErrorCode::InvalidAmount);

		let garbage = QuoteRequest::new("1.2.3", "eth", "ethereum", "eth", "base");
		assert_eq!(service.get_quote(&garbage).await.unwrap_err().code(), ErrorCode::InvalidAmount);

		let unknown = QuoteRequest::new("1", "eth", "ethereum", "eth", "fantom");
		assert_eq!(
			service.get_quote(&unknown).await.unwrap_err().code(),
			ErrorCode::UnsupportedNetwork
		);

		let tron = QuoteRequest::new("1", "usdt", "tron", "usdt", "ethereum");
		assert_eq!(
			service.get_quote(&tron).await.unwrap_err().code(),
			ErrorCode::UnsupportedNetwork
		);

		let mut hinted = QuoteRequest::new("1", "usdt", "bsc", "usdt", "ethereum");
		hinted.from_decimals = Some(6);
		assert_eq!(
			service.get_quote(&hinted).await.unwrap_err().code(),
			ErrorCode::TokenDecimalsMismatch
		);

		let bad_token = QuoteRequest::new("1", "trx", "ethereum", "eth", "base");
		assert_eq!(
			service.get_quote(&bad_token).await.unwrap_err().code(),
			ErrorCode::InvalidFromToken
		);
	}

	#[test]
	fn test_canonical_key_ignores_evm_address_case() {
		let harness = harness(vec![], PriceFallback::disabled());
		let service = &harness.service;

		let lower = service
			.prepare(
				service
					.resolve_request(&eth_bridge().with_user("0xabcdef0000000000000000000000000000000001"))
					.unwrap(),
			)
			.unwrap();
		let upper = service
			.prepare(
				service
					.resolve_request(&eth_bridge().with_user("0xABCDEF0000000000000000000000000000000001"))
					.unwrap(),
			)
			.unwrap();
		assert_eq!(
			AggregatorService::canonical_key(&lower),
			AggregatorService::canonical_key(&upper)
		);

		let indicative = service
			.prepare(
				service
					.resolve_request(&QuoteRequest::new("1", "eth", "ethereum", "eth", "arbitrum"))
					.unwrap(),
			)
			.unwrap();
		assert_ne!(
			AggregatorService::canonical_key(&lower),
			AggregatorService::canonical_key(&indicative)
		);
	}

	#[test]
	fn test_address_consistency_check() {
		let registry = AssetRegistry::builtin();
		let mut eth = registry.resolve("eth", "ethereum").unwrap();
		assert!(check_address(&eth).is_ok());

		eth.is_native = false;
		assert!(check_address(&eth).is_err());

		let mut sol = registry.resolve("sol", "solana").unwrap();
		assert!(check_address(&sol).is_ok());
		sol.address = xswap_types::constants::ZERO_ADDRESS.to_string();
		assert_eq!(
			check_address(&sol).unwrap_err().code(),
			ErrorCode::TokenAddressMappingBug
		);
	}
}
