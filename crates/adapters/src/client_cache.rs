//! HTTP client cache for connection reuse
//!
//! Provides per-provider client instances with connection pooling and keep-alive.

use dashmap::DashMap;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use xswap_types::{AdapterError, AdapterResult, ProviderRuntimeConfig, SecretString};

pub const USER_AGENT: &str = "xswap-aggregator/1.0";

/// Configuration for creating pooled HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	/// Base endpoint for the provider
	pub base_url: String,
	/// Provider identifier for cache differentiation
	pub provider_id: String,
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	/// Connection keep-alive timeout
	pub keep_alive_timeout_ms: u64,
	/// Default headers (auth, custom)
	pub headers: Vec<(String, String)>,
}

impl From<&ProviderRuntimeConfig> for ClientConfig {
	fn from(provider_config: &ProviderRuntimeConfig) -> Self {
		let mut headers = vec![
			("User-Agent".to_string(), USER_AGENT.to_string()),
			("Content-Type".to_string(), "application/json".to_string()),
			("Accept".to_string(), "application/json".to_string()),
		];

		if let Some(custom_headers) = &provider_config.headers {
			let mut custom: Vec<_> = custom_headers
				.iter()
				.map(|(key, value)| (key.clone(), value.clone()))
				.collect();
			// HashMap order is random; keep the cache key stable
			custom.sort();
			headers.extend(custom);
		}

		Self {
			base_url: provider_config.endpoint.clone(),
			provider_id: provider_config.provider_id.clone(),
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers,
		}
	}
}

/// How a provider expects its API key
#[derive(Debug, Clone)]
pub enum AuthConfig {
	/// No authentication
	None,
	/// API key in a provider-specific header
	ApiKey { header: String, key: SecretString },
}

impl AuthConfig {
	/// Header auth when a key is configured
	pub fn api_key(header: &str, key: Option<&SecretString>) -> Self {
		match key {
			Some(key) => Self::ApiKey {
				header: header.to_string(),
				key: key.clone(),
			},
			None => Self::None,
		}
	}

	pub(crate) fn apply(&self, config: &mut ClientConfig) {
		match self {
			AuthConfig::None => {},
			AuthConfig::ApiKey { header, key } => {
				config
					.headers
					.push((header.clone(), key.expose_secret().to_string()));
			},
		}
	}
}

/// Cached client with creation timestamp for TTL management
#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients keyed by provider configuration, with TTL
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with default 30-minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	/// Create a new client cache with custom TTL
	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create a pooled client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> AdapterResult<Arc<Client>> {
		self.clients.remove_if(config, |_, cached_client| {
			let is_expired = cached_client.is_expired(self.ttl);
			if is_expired {
				warn!(
					"Client cache expired for {} (age: {:?}), will create new client",
					config.base_url,
					cached_client.created_at.elapsed()
				);
			}
			is_expired
		});

		if let Some(cached_client) = self.clients.get(config) {
			debug!(
				"Reusing cached client for {} (age: {:?})",
				config.base_url,
				cached_client.created_at.elapsed()
			);
			return Ok(cached_client.client.clone());
		}

		debug!("Creating new client for {}", config.base_url);
		let cached_client = CachedClient::new(build_client(config)?);
		let client = cached_client.client.clone();

		use dashmap::mapref::entry::Entry;

		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => {
				// Lost the race, use the winner's client
				debug!(
					"Another task created client for {}, using existing",
					config.base_url
				);
				Ok(entry.get().client.clone())
			},
			Entry::Vacant(entry) => {
				entry.insert(cached_client);
				Ok(client)
			},
		}
	}

	/// Get or create a client carrying the provider's authentication headers
	pub fn get_client_with_auth(
		&self,
		provider_config: &ProviderRuntimeConfig,
		auth_config: &AuthConfig,
	) -> AdapterResult<Arc<Client>> {
		let mut config = ClientConfig::from(provider_config);
		auth_config.apply(&mut config);
		self.get_client(&config)
	}

	/// Remove all expired clients from the cache
	pub fn cleanup_expired(&self) -> usize {
		let mut removed_count = 0;

		self.clients.retain(|config, cached_client| {
			let is_expired = cached_client.is_expired(self.ttl);
			if is_expired {
				removed_count += 1;
				debug!("Removed expired client for {}", config.base_url);
			}
			!is_expired
		});

		removed_count
	}

	pub fn clear(&self) {
		let count = self.clients.len();
		self.clients.clear();
		debug!("Cleared all {} clients from cache", count);
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Shared process-wide cache; the recommended choice for adapters
	pub fn for_adapter() -> Self {
		global_client_cache().clone()
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

/// Build an uncached client with the given default headers
pub fn build_client(config: &ClientConfig) -> AdapterResult<Client> {
	let mut header_map = reqwest::header::HeaderMap::new();
	for (key, value) in &config.headers {
		if let (Ok(header_name), Ok(header_value)) = (
			reqwest::header::HeaderName::from_bytes(key.as_bytes()),
			reqwest::header::HeaderValue::from_str(value),
		) {
			header_map.insert(header_name, header_value);
		}
	}

	ClientBuilder::new()
		.pool_max_idle_per_host(config.max_idle_per_host)
		.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
		.tcp_keepalive(Duration::from_secs(60))
		.default_headers(header_map)
		.build()
		.map_err(AdapterError::HttpError)
}

lazy_static::lazy_static! {
	static ref GLOBAL_CLIENT_CACHE: ClientCache = ClientCache::new();
}

/// Get the global client cache instance
pub fn global_client_cache() -> &'static ClientCache {
	&GLOBAL_CLIENT_CACHE
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn runtime_config(provider_id: &str) -> ProviderRuntimeConfig {
		ProviderRuntimeConfig::new(provider_id, "https://api.example.com/", 1_000)
	}

	#[test]
	fn test_client_config_from_runtime_config() {
		let mut headers = HashMap::new();
		headers.insert("X-Partner".to_string(), "xswap".to_string());
		let config = runtime_config("relay").with_headers(headers);

		let client_config = ClientConfig::from(&config);

		assert_eq!(client_config.base_url, "https://api.example.com");
		assert_eq!(client_config.provider_id, "relay");
		assert_eq!(client_config.max_idle_per_host, 10);
		assert!(client_config
			.headers
			.contains(&("X-Partner".to_string(), "xswap".to_string())));
	}

	#[tokio::test]
	async fn test_client_cache_reuse() {
		let cache = ClientCache::new();
		let config = ClientConfig::from(&runtime_config("lifi"));

		let client1 = cache.get_client(&config).unwrap();
		let client2 = cache.get_client(&config).unwrap();

		assert!(Arc::ptr_eq(&client1, &client2));
		assert_eq!(cache.len(), 1);
	}

	#[tokio::test]
	async fn test_client_cache_ttl_expiration() {
		let cache = ClientCache::with_ttl(Duration::from_millis(50));
		let config = ClientConfig::from(&runtime_config("across"));

		let client1 = cache.get_client(&config).unwrap();
		std::thread::sleep(Duration::from_millis(100));
		let client2 = cache.get_client(&config).unwrap();

		assert!(!Arc::ptr_eq(&client1, &client2));
		assert_eq!(cache.cleanup_expired(), 0);
	}

	#[tokio::test]
	async fn test_cleanup_drops_idle_expired_clients() {
		let cache = ClientCache::with_ttl(Duration::from_millis(50));
		cache
			.get_client(&ClientConfig::from(&runtime_config("across")))
			.unwrap();
		cache
			.get_client(&ClientConfig::from(&runtime_config("relay")))
			.unwrap();
		assert_eq!(cache.cleanup_expired(), 0);

		std::thread::sleep(Duration::from_millis(100));
		assert_eq!(cache.cleanup_expired(), 2);
		assert!(cache.is_empty());
	}

	#[tokio::test]
	async fn test_cache_clones_share_entries() {
		let cache1 = ClientCache::new();
		let cache2 = cache1.clone();
		let config = ClientConfig::from(&runtime_config("jupiter"));

		let client1 = cache1.get_client(&config).unwrap();
		let client2 = cache2.get_client(&config).unwrap();

		assert!(Arc::ptr_eq(&client1, &client2));
		cache2.clear();
		assert!(cache1.is_empty());
	}

	#[tokio::test]
	async fn test_auth_headers_split_cache_entries() {
		let cache = ClientCache::new();
		let config = runtime_config("debridge");
		let key_a = SecretString::new("key-a");
		let key_b = SecretString::new("key-b");

		let with_a = AuthConfig::api_key("x-api-key", Some(&key_a));
		let client1 = cache.get_client_with_auth(&config, &with_a).unwrap();
		let client2 = cache.get_client_with_auth(&config, &with_a).unwrap();
		assert!(Arc::ptr_eq(&client1, &client2));

		let with_b = AuthConfig::api_key("x-api-key", Some(&key_b));
		let client3 = cache.get_client_with_auth(&config, &with_b).unwrap();
		assert!(!Arc::ptr_eq(&client1, &client3));

		let anonymous = AuthConfig::api_key("x-api-key", None);
		assert!(matches!(anonymous, AuthConfig::None));
		let client4 = cache.get_client_with_auth(&config, &anonymous).unwrap();
		assert!(!Arc::ptr_eq(&client1, &client4));
		assert_eq!(cache.len(), 3);
	}
}
