//! Request coalescing
//!
//! At most one aggregate computation runs per canonical key. The computation
//! is spawned, so it completes (and fills the cache) even when every caller
//! that was waiting on it goes away.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};
use xswap_types::{AggregatedQuote, QuoteError};

pub type QuoteOutcome = Result<AggregatedQuote, QuoteError>;
pub type SharedQuote = Shared<BoxFuture<'static, QuoteOutcome>>;

#[derive(Clone)]
struct InFlight {
	generation: u64,
	outcome: SharedQuote,
}

/// Map from canonical key to the pending shared computation
#[derive(Clone, Default)]
pub struct InFlightRequests {
	pending: Arc<DashMap<String, InFlight>>,
	next_generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for InFlightRequests {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InFlightRequests")
			.field("pending", &self.pending.len())
			.finish()
	}
}

impl InFlightRequests {
	pub fn new() -> Self {
		Self::default()
	}

	/// Join the computation running for `key`, or start one with `start`.
	///
	/// Returns the shared outcome and whether an existing computation was
	/// joined. The check-and-insert is atomic under the map's shard lock.
	pub fn join_or_start<F>(&self, key: &str, start: F) -> (SharedQuote, bool)
	where
		F: FnOnce() -> BoxFuture<'static, QuoteOutcome>,
	{
		match self.pending.entry(key.to_string()) {
			Entry::Occupied(entry) => {
				debug!("Joining in-flight computation for {}", key);
				(entry.get().outcome.clone(), true)
			},
			Entry::Vacant(entry) => {
				let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
				let pending = Arc::clone(&self.pending);
				let owned_key = key.to_string();
				let computation = start();

				let handle = tokio::spawn(async move {
					let outcome = computation.await;
					// only remove our own generation; a newer one may own the key
					pending.remove_if(&owned_key, |_, in_flight| in_flight.generation == generation);
					outcome
				});

				let outcome = async move {
					handle.await.unwrap_or_else(|e| {
						error!("Quote computation task failed: {}", e);
						Err(QuoteError::internal(format!("quote computation failed: {}", e)))
					})
				}
				.boxed()
				.shared();

				entry.insert(InFlight {
					generation,
					outcome: outcome.clone(),
				});
				(outcome, false)
			},
		}
	}

	/// Number of computations currently running
	pub fn len(&self) -> usize {
		self.pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}
}
