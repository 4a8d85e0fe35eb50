//! Test server for integration tests

use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use xswap_aggregator::async_trait::async_trait;
use xswap_aggregator::mocks::MockProviderAdapter;
use xswap_aggregator::models::ExecutionResult;
use xswap_aggregator::service::ChainTxStatus;
use xswap_aggregator::{AggregatorBuilder, AppState, ChainStatusChecker, Family, Settings};

/// Chain checker answering every lookup with the same status
#[derive(Debug)]
pub struct ScriptedChecker {
	status: ChainTxStatus,
	pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedChecker {
	pub fn confirming() -> Self {
		Self::answering(ChainTxStatus::Confirmed)
	}

	pub fn answering(status: ChainTxStatus) -> Self {
		Self {
			status,
			calls: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl ChainStatusChecker for ScriptedChecker {
	async fn check(
		&self,
		_family: Family,
		_network_id: &str,
		_tx_hash: &str,
	) -> ExecutionResult<ChainTxStatus> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.status.clone())
	}
}

/// Test server bound to an ephemeral port
pub struct TestServer {
	pub base_url: String,
	pub handle: JoinHandle<()>,
	#[allow(dead_code)]
	pub state: AppState,
}

#[allow(dead_code)]
impl TestServer {
	/// Default settings without network-dependent collaborators
	pub fn settings() -> Settings {
		let mut settings = Settings::default();
		settings.fallback.enabled = false;
		settings.fallback.price_service_url = None;
		settings
	}

	/// Builder with only the given mock providers and a confirming checker
	pub fn builder(providers: &[(MockProviderAdapter, u32)]) -> AggregatorBuilder {
		providers.iter().fold(
			AggregatorBuilder::new()
				.with_settings(Self::settings())
				.without_configured_providers()
				.with_status_checker(Arc::new(ScriptedChecker::confirming())),
			|builder, (adapter, priority)| {
				builder.with_provider(
					Arc::new(adapter.clone()),
					adapter.runtime_config(),
					*priority,
				)
			},
		)
	}

	/// Server without any provider
	pub async fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with_providers(&[]).await
	}

	pub async fn spawn_with_providers(
		providers: &[(MockProviderAdapter, u32)],
	) -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with(Self::builder(providers)).await
	}

	pub async fn spawn_with(builder: AggregatorBuilder) -> Result<Self, Box<dyn std::error::Error>> {
		let (app, state) = builder.start().await?;
		Self::spawn_server_with_app(app, state).await
	}

	async fn spawn_server_with_app(
		app: Router,
		state: AppState,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let base_url = format!("http://{}:{}", addr.ip(), addr.port());

		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		// Give server time to start
		tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

		Ok(Self {
			base_url,
			handle,
			state,
		})
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	pub fn abort(self) {
		self.handle.abort();
	}
}
