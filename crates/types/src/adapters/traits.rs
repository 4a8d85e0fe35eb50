//! Core provider adapter trait

use async_trait::async_trait;
use std::fmt::Debug;
use tokio::time::Instant;
use tracing::debug;

use super::{
	AdapterError, AdapterResult, ProviderError, ProviderInfo, ProviderOutcome,
	ProviderRuntimeConfig, QuoteInput, QuoteResult, Support,
};

/// Core trait for provider adapter implementations
///
/// One implementation per upstream bridge or DEX API. Implementors provide
/// [`fetch_quote`](ProviderAdapter::fetch_quote); the fan-out layer calls
/// [`quote`](ProviderAdapter::quote), which adds the timeout boundary and
/// turns every failure into data.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
	/// Static provider description
	fn provider_info(&self) -> &ProviderInfo;

	/// Provider ID (for registration and priority lookup)
	fn id(&self) -> &str {
		&self.provider_info().provider_id
	}

	fn name(&self) -> &str {
		&self.provider_info().name
	}

	/// Cheap local check run before any I/O.
	///
	/// Default accepts inputs whose both families are served by the provider.
	fn supports(&self, input: &QuoteInput) -> Support {
		let info = self.provider_info();
		if !info.serves(input.from.family) || !info.serves(input.to.family) {
			return Support::unsupported(format!(
				"{} does not serve {} -> {}",
				info.provider_id, input.from.family, input.to.family
			));
		}
		if input.is_cross_chain() && !info.cross_chain {
			return Support::unsupported(format!(
				"{} only quotes same-network swaps",
				info.provider_id
			));
		}
		Support::Supported
	}

	/// Query the upstream API. Pairs the provider can never serve should be
	/// reported as [`AdapterError::UnsupportedPair`]; "no route right now"
	/// answers as [`AdapterError::NoRoute`].
	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult>;

	/// Health check for the provider
	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		Ok(true)
	}

	/// Quote under a bounded timeout; never returns an error
	async fn quote(&self, input: &QuoteInput, config: &ProviderRuntimeConfig) -> ProviderOutcome {
		let provider = self.id().to_string();

		if let Support::Unsupported(reason) = self.supports(input) {
			debug!("Skipping provider {}: {}", provider, reason);
			return ProviderOutcome::Skipped { provider, reason };
		}

		let started = Instant::now();
		match tokio::time::timeout(config.timeout(), self.fetch_quote(input, config)).await {
			Ok(Ok(mut result)) => {
				if result.to_amount.is_zero() {
					return ProviderOutcome::Failed(ProviderError::from_adapter_error(
						&provider,
						&AdapterError::MissingOutputAmount,
					));
				}
				result.provider = provider;
				result.latency_ms = started.elapsed().as_millis() as u64;
				if input.indicative {
					result.is_indicative = true;
				}
				ProviderOutcome::Quoted(result)
			},
			Ok(Err(AdapterError::UnsupportedPair { reason })) => {
				debug!("Provider {} does not support pair: {}", provider, reason);
				ProviderOutcome::Skipped { provider, reason }
			},
			Ok(Err(error)) => {
				ProviderOutcome::Failed(ProviderError::from_adapter_error(&provider, &error))
			},
			Err(_) => ProviderOutcome::Failed(ProviderError::timeout(&provider, config.timeout_ms)),
		}
	}
}
