//! xswap Storage
//!
//! Storage implementations for the cross-chain swap aggregator: the quote
//! caches and the execution store, kept in process memory.

pub mod memory_store;
pub mod traits;

pub use memory_store::MemoryStore;
pub use traits::{CacheStats, CacheStore, ExecutionStore, Storage, StorageError, StorageResult};
