//! Storage traits for pluggable cache and execution stores

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

use super::StorageResult;
use crate::executions::Execution;
use crate::quotes::{AggregatedQuote, QuoteError};

/// Snapshot of cache occupancy and effectiveness
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
	pub quote_entries: usize,
	pub no_route_entries: usize,
	pub negative_entries: usize,
	pub hits: u64,
	pub misses: u64,
}

/// Three independent TTL namespaces: successful quotes, NO_ROUTE outcomes,
/// and provider-pair negatives. Expired entries are never returned.
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
	async fn get_quote(&self, key: &str) -> StorageResult<Option<AggregatedQuote>>;

	async fn put_quote(&self, key: &str, quote: AggregatedQuote, ttl: Duration) -> StorageResult<()>;

	async fn get_no_route(&self, key: &str) -> StorageResult<Option<QuoteError>>;

	async fn put_no_route(&self, key: &str, error: QuoteError, ttl: Duration) -> StorageResult<()>;

	/// Whether a provider is known not to serve a pair
	async fn is_negative(&self, provider_id: &str, pair_key: &str) -> StorageResult<bool>;

	async fn put_negative(
		&self,
		provider_id: &str,
		pair_key: &str,
		reason: &str,
		ttl: Duration,
	) -> StorageResult<()>;

	/// Drop expired entries from every namespace, returning how many went
	async fn purge_expired(&self) -> StorageResult<usize>;

	/// Reset all namespaces and counters
	async fn clear(&self) -> StorageResult<()>;

	async fn stats(&self) -> StorageResult<CacheStats>;
}

#[async_trait]
pub trait ExecutionStore: Send + Sync + Debug {
	async fn create_execution(&self, execution: Execution) -> StorageResult<()>;

	async fn get_execution(&self, execution_id: &str) -> StorageResult<Option<Execution>>;

	/// Replace an existing execution; fails with `NotFound` when absent
	async fn update_execution(&self, execution: Execution) -> StorageResult<()>;

	async fn list_executions(&self) -> StorageResult<Vec<Execution>>;

	async fn remove_execution(&self, execution_id: &str) -> StorageResult<bool>;

	async fn execution_count(&self) -> StorageResult<usize>;
}

/// Main storage trait that combines all storage operations
#[async_trait]
pub trait StorageTrait: CacheStore + ExecutionStore {
	/// Health check for the storage system
	async fn health_check(&self) -> StorageResult<bool> {
		Ok(true)
	}
}
