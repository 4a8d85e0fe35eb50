//! xswap Aggregator Library
//!
//! Cross-chain swap quote aggregator: fans quote requests out to bridge and
//! DEX providers, plans multi-leg routes across chain families through hub
//! networks, and tracks the execution of planned routes.

// Core domain types - the most commonly used types
pub use xswap_types::{
	// External dependencies for convenience
	chrono,
	serde_json,
	AggregatedQuote,
	AssetRegistry,
	BaseAmount,
	ErrorCode,
	Execution,
	ExecutionError,
	ExecutionResponse,
	Family,
	Network,
	ProviderAdapter,
	ProviderOutcome,
	QuoteError,
	QuoteRequest,
	QuoteResponse,
	RoutePlan,
	RoutePlanError,
	RoutePlanRequest,
	StepStatus,
	Token,
};

// Service layer
pub use xswap_service::{
	AggregatorConfig, AggregatorService, AggregatorTrait, ChainStatusChecker, ExecutionService,
	HubRoutePlanner, PriceOracle, RpcStatusChecker,
};

// Storage layer
pub use xswap_storage::{CacheStore, ExecutionStore, MemoryStore, Storage};

// API layer
pub use xswap_api::{create_router, AppState};

// Adapters
pub use xswap_adapters::{AdapterFactory, ProviderRegistry};

// Config
pub use xswap_config::{load_config, log_service_info, log_startup_complete, Settings};

pub mod models {
	pub use xswap_types::*;
}

pub mod storage {
	pub use xswap_storage::*;
}

pub mod config {
	pub use xswap_config::*;
}

pub mod adapters {
	pub use xswap_adapters::*;
}

pub mod api {
	pub use xswap_api::*;
}

pub mod service {
	pub use xswap_service::*;
}

pub mod mocks;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use xswap_adapters::client_cache::{global_client_cache, ClientCache};
use xswap_api::RateLimiter;
use xswap_config::{LogFormat, LoggingSettings};
use xswap_service::{PriceFallback, QuoteSanityChecker};
use xswap_types::ProviderRuntimeConfig;

// Re-export external dependencies for examples
pub use async_trait;
pub use reqwest;

/// Adapter registered in code rather than through settings
struct CustomProvider {
	adapter: Arc<dyn ProviderAdapter>,
	config: ProviderRuntimeConfig,
	priority: u32,
}

/// Builder pattern for configuring the aggregator
pub struct AggregatorBuilder<S = MemoryStore>
where
	S: Storage + Clone + 'static,
{
	settings: Option<Settings>,
	storage: S,
	assets: Option<AssetRegistry>,
	custom_providers: Vec<CustomProvider>,
	use_configured_providers: bool,
	price_oracle: Option<Arc<dyn PriceOracle>>,
	status_checker: Option<Arc<dyn ChainStatusChecker>>,
}

impl<S> AggregatorBuilder<S>
where
	S: Storage + Clone + 'static,
{
	/// Create a new aggregator builder with the provided storage
	pub fn with_storage(storage: S) -> Self {
		Self {
			settings: None,
			storage,
			assets: None,
			custom_providers: Vec::new(),
			use_configured_providers: true,
			price_oracle: None,
			status_checker: None,
		}
	}
}

// Default constructor using MemoryStore for convenience
impl Default for AggregatorBuilder<MemoryStore> {
	fn default() -> Self {
		Self::new()
	}
}

impl AggregatorBuilder<MemoryStore> {
	/// Create a new aggregator builder with default memory storage
	pub fn new() -> Self {
		Self::with_storage(MemoryStore::new())
	}

	/// Create aggregator builder from configuration using default memory storage
	pub fn from_config(settings: Settings) -> Self {
		Self::new().with_settings(settings)
	}
}

impl<S> AggregatorBuilder<S>
where
	S: Storage + Clone + 'static,
{
	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Replace the built-in asset catalogue
	pub fn with_assets(mut self, assets: AssetRegistry) -> Self {
		self.assets = Some(assets);
		self
	}

	/// Register an adapter alongside the configured providers
	pub fn with_provider(
		mut self,
		adapter: Arc<dyn ProviderAdapter>,
		config: ProviderRuntimeConfig,
		priority: u32,
	) -> Self {
		self.custom_providers.push(CustomProvider {
			adapter,
			config,
			priority,
		});
		self
	}

	/// Only use adapters registered through [`AggregatorBuilder::with_provider`]
	pub fn without_configured_providers(mut self) -> Self {
		self.use_configured_providers = false;
		self
	}

	/// Price source for the fallback estimate, instead of the configured URL
	pub fn with_price_oracle(mut self, oracle: Arc<dyn PriceOracle>) -> Self {
		self.price_oracle = Some(oracle);
		self
	}

	/// Confirmation checker, instead of the configured RPC endpoints
	pub fn with_status_checker(mut self, checker: Arc<dyn ChainStatusChecker>) -> Self {
		self.status_checker = Some(checker);
		self
	}

	/// Build the provider registry from settings and custom adapters.
	/// Disabled providers are registered so they show up in listings.
	fn build_provider_registry(
		&self,
		settings: &Settings,
	) -> Result<ProviderRegistry, Box<dyn std::error::Error>> {
		let mut registry = ProviderRegistry::new();

		if self.use_configured_providers {
			let factory = AdapterFactory::new();
			let mut configured: Vec<_> = settings.providers.0.iter().collect();
			configured.sort_by_key(|(id, p)| (p.priority, (*id).clone()));

			for (provider_id, provider) in configured {
				let adapter = factory
					.create(&provider.adapter, provider_id)
					.map_err(|e| format!("Provider '{}': {}", provider_id, e))?;
				registry.register(
					adapter,
					provider.runtime_config(provider_id, &settings.timeouts),
					provider.priority,
					provider.enabled,
				)?;
			}
		}

		for custom in &self.custom_providers {
			registry.register(
				Arc::clone(&custom.adapter),
				custom.config.clone(),
				custom.priority,
				true,
			)?;
		}

		info!(
			"Provider registry ready: {} registered, {} enabled",
			registry.len(),
			registry.enabled_count()
		);
		Ok(registry)
	}

	/// Start the aggregator and return the configured router with state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.clone().unwrap_or_default();
		settings
			.validate()
			.map_err(|e| format!("Invalid configuration: {}", e))?;

		let assets = Arc::new(self.assets.clone().unwrap_or_else(AssetRegistry::builtin));
		let providers = Arc::new(self.build_provider_registry(&settings)?);
		let storage = Arc::new(self.storage.clone());

		let fallback = match &self.price_oracle {
			Some(oracle) => PriceFallback::new(Some(Arc::clone(oracle)), settings.fallback.clone()),
			None => PriceFallback::from_settings(&settings.fallback),
		};
		let aggregator = Arc::new(AggregatorService::new(
			Arc::clone(&assets),
			Arc::clone(&providers),
			Arc::clone(&storage) as Arc<dyn CacheStore>,
			QuoteSanityChecker::new(settings.sanity.clone()),
			fallback,
			AggregatorConfig::from_settings(&settings),
		));

		let planner = Arc::new(HubRoutePlanner::new(
			Arc::clone(&assets),
			Arc::clone(&aggregator) as Arc<dyn AggregatorTrait>,
			Arc::clone(&providers),
			settings.routing.clone(),
			&settings.quotes,
		));

		let checker = match &self.status_checker {
			Some(checker) => Arc::clone(checker),
			None => Arc::new(RpcStatusChecker::new(
				settings.rpc.clone(),
				Duration::from_millis(settings.timeouts.default_provider_ms),
			)?) as Arc<dyn ChainStatusChecker>,
		};
		let executions = Arc::new(ExecutionService::new(
			Arc::clone(&storage) as Arc<dyn ExecutionStore>,
			checker,
		));

		let app_state = AppState {
			aggregator: aggregator as Arc<dyn AggregatorTrait>,
			planner,
			executions,
			providers,
			assets,
			storage: storage as Arc<dyn Storage>,
			debug: settings.is_debug(),
		};

		let rate_cfg = &settings.environment.rate_limiting;
		let limiter = if rate_cfg.enabled {
			info!(
				"Rate limiting enabled: {} requests/minute, burst {}",
				rate_cfg.requests_per_minute, rate_cfg.burst_size
			);
			let limiter = Arc::new(RateLimiter::new(rate_cfg));
			limiter.spawn_cleanup();
			Some(limiter)
		} else {
			None
		};

		let router = xswap_api::create_router_with_rate_limit(limiter).with_state(app_state.clone());

		Ok((router, app_state))
	}

	/// Start the complete server with all defaults and setup.
	///
	/// Loads `.env`, loads configuration, initializes tracing, starts cache
	/// cleanup, then binds and serves the application.
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config().unwrap_or_else(|e| {
				eprintln!("Failed to load configuration, using defaults: {}", e);
				Settings::default()
			}),
		};

		init_tracing(&settings.logging)?;
		log_service_info();
		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);
		xswap_config::log_provider_summary(&settings);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;
		let cleanup_every = Duration::from_secs(settings.cache.cleanup_interval_secs.max(1));

		self.settings = Some(settings);
		let (app, state) = self.start().await?;
		spawn_cache_cleanup(Arc::clone(&state.storage), cleanup_every);
		spawn_client_cleanup(global_client_cache(), cleanup_every);

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr);
		info!("API endpoints available:");
		info!("  GET  /health");
		info!("  GET  /ready");
		info!("  POST /api/v1/quotes");
		info!("  POST /api/v1/routes");
		info!("  POST /api/v1/executions");
		info!("  GET  /api/v1/executions/{{id}}");
		info!("  POST /api/v1/executions/{{id}}/poll");
		info!("  GET  /api/v1/providers");
		info!("  GET  /api/v1/networks");
		info!("  GET  /api/v1/tokens");

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown_signal())
			.await?;
		xswap_config::log_service_shutdown();

		Ok(())
	}
}

/// Initialize tracing from logging settings. `RUST_LOG` takes precedence
/// over the configured level.
pub fn init_tracing(logging: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

	match logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);
			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			} else {
				subscriber.try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter);
			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			} else {
				subscriber.try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter);
			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			} else {
				subscriber.try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			}
		},
	}

	info!(
		"Logging configuration applied: level={}, format={:?}, structured={}",
		logging.level, logging.format, logging.structured
	);
	Ok(())
}

/// Periodically drop expired cache entries
fn spawn_cache_cleanup(cache: Arc<dyn Storage>, every: Duration) -> tokio::task::JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(every);
		loop {
			ticker.tick().await;
			match cache.purge_expired().await {
				Ok(0) => {},
				Ok(removed) => tracing::debug!("Purged {} expired cache entries", removed),
				Err(e) => warn!("Cache cleanup failed: {}", e),
			}
		}
	})
}

/// Periodically drop pooled HTTP clients past their TTL
fn spawn_client_cleanup(
	clients: &'static ClientCache,
	every: Duration,
) -> tokio::task::JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(every);
		loop {
			ticker.tick().await;
			let removed = clients.cleanup_expired();
			if removed > 0 {
				tracing::debug!("Dropped {} expired HTTP clients", removed);
			}
		}
	})
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received");
}
