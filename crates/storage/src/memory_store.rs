//! In-memory storage implementation using DashMap with TTL support

use crate::traits::{CacheStats, CacheStore, ExecutionStore, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::info;
use xswap_types::{AggregatedQuote, Execution, QuoteError};

#[derive(Debug, Clone)]
struct CacheEntry<T> {
	value: T,
	expires_at: Instant,
}

impl<T> CacheEntry<T> {
	fn new(value: T, ttl: Duration) -> Self {
		Self {
			value,
			expires_at: Instant::now() + ttl,
		}
	}

	fn is_expired(&self, now: Instant) -> bool {
		now >= self.expires_at
	}
}

type Namespace<T> = Arc<DashMap<String, CacheEntry<T>>>;

/// In-memory quote caches and execution records
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	quotes: Namespace<AggregatedQuote>,
	no_routes: Namespace<QuoteError>,
	negatives: Namespace<String>,
	executions: Arc<DashMap<String, Execution>>,
	hits: Arc<AtomicU64>,
	misses: Arc<AtomicU64>,
}

impl MemoryStore {
	/// Create a new memory store instance
	pub fn new() -> Self {
		Self::default()
	}

	fn purge_all_expired(&self) -> usize {
		let now = Instant::now();
		let before = self.quotes.len() + self.no_routes.len() + self.negatives.len();
		self.quotes.retain(|_, entry| !entry.is_expired(now));
		self.no_routes.retain(|_, entry| !entry.is_expired(now));
		self.negatives.retain(|_, entry| !entry.is_expired(now));
		let after = self.quotes.len() + self.no_routes.len() + self.negatives.len();
		before.saturating_sub(after)
	}

	fn record(&self, hit: bool) {
		let counter = if hit { &self.hits } else { &self.misses };
		counter.fetch_add(1, Ordering::Relaxed);
	}

	fn negative_key(provider_id: &str, pair_key: &str) -> String {
		format!("{}|{}", provider_id, pair_key)
	}
}

/// Live value under `key`; expired entries are evicted on read
fn live<T: Clone>(map: &DashMap<String, CacheEntry<T>>, key: &str) -> Option<T> {
	let now = Instant::now();
	{
		let entry = map.get(key)?;
		if !entry.is_expired(now) {
			return Some(entry.value.clone());
		}
	}
	map.remove_if(key, |_, entry| entry.is_expired(now));
	None
}

#[async_trait]
impl CacheStore for MemoryStore {
	async fn get_quote(&self, key: &str) -> StorageResult<Option<AggregatedQuote>> {
		let value = live(&self.quotes, key);
		self.record(value.is_some());
		Ok(value)
	}

	async fn put_quote(&self, key: &str, quote: AggregatedQuote, ttl: Duration) -> StorageResult<()> {
		self.quotes
			.insert(key.to_string(), CacheEntry::new(quote, ttl));
		Ok(())
	}

	async fn get_no_route(&self, key: &str) -> StorageResult<Option<QuoteError>> {
		let value = live(&self.no_routes, key);
		if value.is_some() {
			self.record(true);
		}
		Ok(value)
	}

	async fn put_no_route(&self, key: &str, error: QuoteError, ttl: Duration) -> StorageResult<()> {
		self.no_routes
			.insert(key.to_string(), CacheEntry::new(error, ttl));
		Ok(())
	}

	async fn is_negative(&self, provider_id: &str, pair_key: &str) -> StorageResult<bool> {
		Ok(live(&self.negatives, &Self::negative_key(provider_id, pair_key)).is_some())
	}

	async fn put_negative(
		&self,
		provider_id: &str,
		pair_key: &str,
		reason: &str,
		ttl: Duration,
	) -> StorageResult<()> {
		self.negatives.insert(
			Self::negative_key(provider_id, pair_key),
			CacheEntry::new(reason.to_string(), ttl),
		);
		Ok(())
	}

	async fn purge_expired(&self) -> StorageResult<usize> {
		Ok(self.purge_all_expired())
	}

	async fn clear(&self) -> StorageResult<()> {
		self.quotes.clear();
		self.no_routes.clear();
		self.negatives.clear();
		self.hits.store(0, Ordering::Relaxed);
		self.misses.store(0, Ordering::Relaxed);
		info!("Quote caches cleared");
		Ok(())
	}

	async fn stats(&self) -> StorageResult<CacheStats> {
		Ok(CacheStats {
			quote_entries: self.quotes.len(),
			no_route_entries: self.no_routes.len(),
			negative_entries: self.negatives.len(),
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
		})
	}
}

#[async_trait]
impl ExecutionStore for MemoryStore {
	async fn create_execution(&self, execution: Execution) -> StorageResult<()> {
		match self.executions.entry(execution.id.clone()) {
			dashmap::mapref::entry::Entry::Occupied(_) => Err(StorageError::AlreadyExists {
				id: execution.id,
			}),
			dashmap::mapref::entry::Entry::Vacant(slot) => {
				slot.insert(execution);
				Ok(())
			},
		}
	}

	async fn get_execution(&self, execution_id: &str) -> StorageResult<Option<Execution>> {
		Ok(self
			.executions
			.get(execution_id)
			.map(|entry| entry.value().clone()))
	}

	async fn update_execution(&self, execution: Execution) -> StorageResult<()> {
		match self.executions.get_mut(&execution.id) {
			Some(mut entry) => {
				*entry = execution;
				Ok(())
			},
			None => Err(StorageError::NotFound { id: execution.id }),
		}
	}

	async fn list_executions(&self) -> StorageResult<Vec<Execution>> {
		let mut executions: Vec<Execution> = self
			.executions
			.iter()
			.map(|entry| entry.value().clone())
			.collect();
		executions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(executions)
	}

	async fn remove_execution(&self, execution_id: &str) -> StorageResult<bool> {
		Ok(self.executions.remove(execution_id).is_some())
	}

	async fn execution_count(&self) -> StorageResult<usize> {
		Ok(self.executions.len())
	}
}

#[async_trait]
impl Storage for MemoryStore {}
