//! Provider registry
//!
//! Holds every configured adapter with its runtime config, enabled flag and
//! priority. Lower priority numbers are more trusted; iteration order is
//! always ascending priority.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use xswap_types::{
	AdapterFactoryError, AdapterFactoryResult, ErrorCode, Family, ProviderAdapter, ProviderError,
	ProviderOutcome, ProviderRuntimeConfig, QuoteInput,
};

#[derive(Debug, Clone)]
pub struct RegisteredProvider {
	pub adapter: Arc<dyn ProviderAdapter>,
	pub config: ProviderRuntimeConfig,
	pub priority: u32,
	pub enabled: bool,
}

impl RegisteredProvider {
	pub fn id(&self) -> &str {
		&self.config.provider_id
	}

	/// Whether this provider can move assets between the two families
	pub fn bridges(&self, from: Family, to: Family) -> bool {
		let info = self.adapter.provider_info();
		info.cross_chain && info.serves(from) && info.serves(to)
	}
}

/// Public view of a registered provider
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
	pub provider_id: String,
	pub name: String,
	pub enabled: bool,
	pub priority: u32,
	pub timeout_ms: u64,
	pub families: Vec<Family>,
	pub cross_chain: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
	providers: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register an adapter under its runtime config's provider id
	pub fn register(
		&mut self,
		adapter: Arc<dyn ProviderAdapter>,
		config: ProviderRuntimeConfig,
		priority: u32,
		enabled: bool,
	) -> AdapterFactoryResult<()> {
		if self.get(&config.provider_id).is_some() {
			return Err(AdapterFactoryError::AlreadyRegistered {
				adapter_id: config.provider_id,
			});
		}

		debug!(
			"Registering provider {} (priority {}, enabled: {})",
			config.provider_id, priority, enabled
		);
		self.providers.push(RegisteredProvider {
			adapter,
			config,
			priority,
			enabled,
		});
		self.providers.sort_by(|a, b| {
			a.priority
				.cmp(&b.priority)
				.then_with(|| a.config.provider_id.cmp(&b.config.provider_id))
		});
		Ok(())
	}

	pub fn with_provider(
		mut self,
		adapter: Arc<dyn ProviderAdapter>,
		config: ProviderRuntimeConfig,
		priority: u32,
		enabled: bool,
	) -> AdapterFactoryResult<Self> {
		self.register(adapter, config, priority, enabled)?;
		Ok(self)
	}

	pub fn get(&self, provider_id: &str) -> Option<&RegisteredProvider> {
		self.providers.iter().find(|p| p.id() == provider_id)
	}

	pub fn priority_of(&self, provider_id: &str) -> Option<u32> {
		self.get(provider_id).map(|p| p.priority)
	}

	/// All providers in priority order
	pub fn all(&self) -> &[RegisteredProvider] {
		&self.providers
	}

	/// Enabled providers in priority order
	pub fn enabled(&self) -> impl Iterator<Item = &RegisteredProvider> {
		self.providers.iter().filter(|p| p.enabled)
	}

	pub fn enabled_count(&self) -> usize {
		self.enabled().count()
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}

	/// Whether any enabled provider bridges between the two families
	pub fn has_bridge(&self, from: Family, to: Family) -> bool {
		self.enabled().any(|p| p.bridges(from, to))
	}

	/// Quote through one provider by id; unknown and disabled ids are failures
	pub async fn dispatch(&self, provider_id: &str, input: &QuoteInput) -> ProviderOutcome {
		match self.get(provider_id) {
			None => ProviderOutcome::Failed(ProviderError::new(
				provider_id,
				ErrorCode::AdapterMissing,
				format!("no adapter registered for {}", provider_id),
			)),
			Some(provider) if !provider.enabled => {
				ProviderOutcome::Failed(ProviderError::new(
					provider_id,
					ErrorCode::ProviderDisabled,
					format!("provider {} is disabled", provider_id),
				))
			},
			Some(provider) => provider.adapter.quote(input, &provider.config).await,
		}
	}

	pub fn summaries(&self) -> Vec<ProviderSummary> {
		self.providers
			.iter()
			.map(|p| {
				let info = p.adapter.provider_info();
				ProviderSummary {
					provider_id: p.id().to_string(),
					name: info.name.clone(),
					enabled: p.enabled,
					priority: p.priority,
					timeout_ms: p.config.timeout_ms,
					families: info.families.clone(),
					cross_chain: info.cross_chain,
				}
			})
			.collect()
	}

	/// Health of every enabled provider; errors count as unhealthy
	pub async fn health_check_all(&self) -> Vec<(String, bool)> {
		let checks = self.enabled().map(|p| async move {
			let healthy = match p.adapter.health_check(&p.config).await {
				Ok(healthy) => healthy,
				Err(e) => {
					warn!("Health check for provider {} failed: {}", p.id(), e);
					false
				},
			};
			(p.id().to_string(), healthy)
		});
		join_all(checks).await
	}
}
