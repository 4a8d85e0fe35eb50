use std::sync::Arc;

use xswap_adapters::ProviderRegistry;
use xswap_service::{AggregatorTrait, ExecutionService, HubRoutePlanner};
use xswap_storage::Storage;
use xswap_types::AssetRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub aggregator: Arc<dyn AggregatorTrait>,
	pub planner: Arc<HubRoutePlanner>,
	pub executions: Arc<ExecutionService>,
	pub providers: Arc<ProviderRegistry>,
	pub assets: Arc<AssetRegistry>,
	pub storage: Arc<dyn Storage>,
	/// Expose internal error detail in responses
	pub debug: bool,
}
