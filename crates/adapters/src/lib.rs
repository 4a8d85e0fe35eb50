//! xswap Adapters
//!
//! Upstream bridge and DEX adapters for the xswap aggregator, plus the
//! registry that dispatches quotes to them.

pub mod across_adapter;
pub mod client_cache;
pub mod debridge_adapter;
pub mod fields;
pub mod http;
pub mod jupiter_adapter;
pub mod lifi_adapter;
pub mod params;
pub mod registry;
pub mod relay_adapter;
pub mod stonfi_adapter;

use std::sync::Arc;

pub use across_adapter::AcrossAdapter;
pub use client_cache::{AuthConfig, ClientCache, ClientConfig};
pub use debridge_adapter::DebridgeAdapter;
pub use jupiter_adapter::JupiterAdapter;
pub use lifi_adapter::LifiAdapter;
pub use registry::{ProviderRegistry, ProviderSummary, RegisteredProvider};
pub use relay_adapter::RelayAdapter;
pub use stonfi_adapter::StonfiAdapter;
pub use xswap_types::{
	AdapterError, AdapterFactoryError, AdapterFactoryResult, AdapterResult, ProviderAdapter,
};

/// Factory for creating provider adapters by adapter type
#[derive(Debug, Clone)]
pub struct AdapterFactory {
	cache: ClientCache,
}

impl AdapterFactory {
	/// Adapter types understood by [`AdapterFactory::create`]
	pub const SUPPORTED_TYPES: [&'static str; 6] =
		["lifi", "across", "relay", "debridge", "jupiter", "stonfi"];

	pub fn new() -> Self {
		Self::with_cache(ClientCache::for_adapter())
	}

	pub fn with_cache(cache: ClientCache) -> Self {
		Self { cache }
	}

	/// Create an adapter of the given type, registered under `provider_id`
	pub fn create(
		&self,
		adapter_type: &str,
		provider_id: &str,
	) -> AdapterFactoryResult<Arc<dyn ProviderAdapter>> {
		let cache = self.cache.clone();
		let with_id = |mut info: xswap_types::ProviderInfo| {
			info.provider_id = provider_id.to_string();
			info
		};

		let created: AdapterResult<Arc<dyn ProviderAdapter>> =
			match adapter_type.trim().to_ascii_lowercase().as_str() {
				"lifi" => LifiAdapter::with_cache(with_id(LifiAdapter::default_info()), cache)
					.map(|a| Arc::new(a) as Arc<dyn ProviderAdapter>),
				"across" => AcrossAdapter::with_cache(with_id(AcrossAdapter::default_info()), cache)
					.map(|a| Arc::new(a) as Arc<dyn ProviderAdapter>),
				"relay" => RelayAdapter::with_cache(with_id(RelayAdapter::default_info()), cache)
					.map(|a| Arc::new(a) as Arc<dyn ProviderAdapter>),
				"debridge" => {
					DebridgeAdapter::with_cache(with_id(DebridgeAdapter::default_info()), cache)
						.map(|a| Arc::new(a) as Arc<dyn ProviderAdapter>)
				},
				"jupiter" => {
					JupiterAdapter::with_cache(with_id(JupiterAdapter::default_info()), cache)
						.map(|a| Arc::new(a) as Arc<dyn ProviderAdapter>)
				},
				"stonfi" => StonfiAdapter::with_cache(with_id(StonfiAdapter::default_info()), cache)
					.map(|a| Arc::new(a) as Arc<dyn ProviderAdapter>),
				_ => {
					return Err(AdapterFactoryError::UnknownAdapterType {
						adapter_type: adapter_type.to_string(),
					})
				},
			};

		created.map_err(|e| AdapterFactoryError::CreationFailed {
			adapter_type: adapter_type.to_string(),
			reason: e.to_string(),
		})
	}
}

impl Default for AdapterFactory {
	fn default() -> Self {
		Self::new()
	}
}
