//! Mock providers for examples and testing
//!
//! Adapters that answer without any network I/O. Each one counts its calls
//! so tests can assert how often the fan-out reached it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use xswap_types::serde_json::Value;
use xswap_types::{
	to_base_units, AdapterError, AdapterResult, BaseAmount, Family, ProviderAdapter, ProviderInfo,
	ProviderRuntimeConfig, QuoteInput, QuoteResult,
};

#[derive(Debug, Clone)]
pub enum MockBehaviour {
	/// Return `ratio_bps / 10_000` of the input, rescaled to output decimals
	Quote { ratio_bps: u128 },
	/// Fail with the given HTTP status
	Fail { status: u16 },
	/// Report the pair as unsupported
	Unsupported,
}

/// Configurable in-process provider
#[derive(Debug, Clone)]
pub struct MockProviderAdapter {
	info: ProviderInfo,
	behaviour: MockBehaviour,
	delay: Duration,
	transaction: Option<Value>,
	calls: Arc<AtomicUsize>,
}

impl MockProviderAdapter {
	/// Cross-chain provider serving the given families, answering at 99.5%
	pub fn new(provider_id: &str, families: Vec<Family>) -> Self {
		Self {
			info: ProviderInfo::new(provider_id, &format!("Mock {}", provider_id), families, true),
			behaviour: MockBehaviour::Quote { ratio_bps: 9_950 },
			delay: Duration::ZERO,
			transaction: None,
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// EVM-only provider
	pub fn evm(provider_id: &str) -> Self {
		Self::new(provider_id, vec![Family::Evm])
	}

	pub fn same_chain_only(mut self) -> Self {
		self.info.cross_chain = false;
		self
	}

	pub fn with_ratio_bps(mut self, ratio_bps: u128) -> Self {
		self.behaviour = MockBehaviour::Quote { ratio_bps };
		self
	}

	pub fn failing(mut self, status: u16) -> Self {
		self.behaviour = MockBehaviour::Fail { status };
		self
	}

	pub fn unsupported(mut self) -> Self {
		self.behaviour = MockBehaviour::Unsupported;
		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	/// Transaction payload attached to every quote
	pub fn with_transaction(mut self, transaction: Value) -> Self {
		self.transaction = Some(transaction);
		self
	}

	/// Shared call counter, still readable after the adapter is registered
	pub fn calls(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.calls)
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Runtime config suitable for registering this adapter
	pub fn runtime_config(&self) -> ProviderRuntimeConfig {
		ProviderRuntimeConfig::new(&self.info.provider_id, "http://mock.invalid", 5_000)
	}

	fn output_for(&self, input: &QuoteInput, ratio_bps: u128) -> AdapterResult<BaseAmount> {
		let human = input.amount.to_decimal_string(input.from.decimals);
		let rescaled = to_base_units(&human, input.to.decimals)
			.map_err(|e| AdapterError::invalid_response(e.to_string()))?;
		let rescaled: u128 = rescaled
			.as_str()
			.parse()
			.map_err(|_| AdapterError::invalid_response("amount out of range"))?;
		Ok(BaseAmount::from(rescaled.saturating_mul(ratio_bps) / 10_000))
	}
}

#[async_trait]
impl ProviderAdapter for MockProviderAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn fetch_quote(
		&self,
		input: &QuoteInput,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<QuoteResult> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}

		match &self.behaviour {
			MockBehaviour::Quote { ratio_bps } => {
				let out = self.output_for(input, *ratio_bps)?;
				Ok(QuoteResult::new(&self.info.provider_id, input.amount.clone(), out)
					.with_duration(Some(30))
					.with_transaction(self.transaction.clone()))
			},
			MockBehaviour::Fail { status } => {
				Err(AdapterError::from_http_failure(*status, "mock failure"))
			},
			MockBehaviour::Unsupported => {
				Err(AdapterError::unsupported("mock does not route this pair"))
			},
		}
	}
}
