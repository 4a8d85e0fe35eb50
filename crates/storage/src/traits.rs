//! Storage traits for pluggable storage implementations

// Re-export the storage traits from types crate
pub use xswap_types::storage::{
	CacheStats, CacheStore, ExecutionStore, StorageError, StorageResult, StorageTrait as Storage,
};
