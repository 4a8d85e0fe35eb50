//! Execution orchestrator
//!
//! Turns a route plan into per-step unsigned transactions and drives each
//! step through its confirmation state machine. Updates to one execution
//! are serialized by a per-execution lock that only exists while a caller
//! holds or waits on it; the execution-level status is always derived from
//! the steps.

use chrono::Utc;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use xswap_types::{
	Execution, ExecutionError, ExecutionResult, ExecutionStepState, ExecutionStore, Family,
	RoutePlan, StepStatus, StorageError,
};

use super::status_checker::{ChainStatusChecker, ChainTxStatus};
use super::tx_builder::build_unsigned_transaction;

#[derive(Clone)]
pub struct ExecutionService {
	store: Arc<dyn ExecutionStore>,
	checker: Arc<dyn ChainStatusChecker>,
	locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ExecutionService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ExecutionService")
			.field("store", &self.store)
			.field("locked_executions", &self.locks.len())
			.finish()
	}
}

impl ExecutionService {
	pub fn new(store: Arc<dyn ExecutionStore>, checker: Arc<dyn ChainStatusChecker>) -> Self {
		Self {
			store,
			checker,
			locks: Arc::new(DashMap::new()),
		}
	}

	/// Create an execution with one unsigned transaction per step.
	///
	/// A step whose transaction cannot be built is marked failed; the other
	/// steps are still built. The plan arrives from the caller, so its step
	/// order and wallet requirements are re-derived rather than trusted.
	pub async fn create_execution(
		&self,
		mut plan: RoutePlan,
		wallets: BTreeMap<Family, String>,
	) -> ExecutionResult<Execution> {
		validate_plan(&plan)?;
		plan.required_wallets = plan.derived_wallets();
		let missing = plan.missing_wallets(&wallets);
		if !missing.is_empty() {
			return Err(ExecutionError::WalletMissing { missing });
		}

		let mut steps = Vec::with_capacity(plan.steps.len());
		for step in &plan.steps {
			let mut state =
				ExecutionStepState::new(step.index, step.kind, step.family(), step.provider.clone());
			match build_unsigned_transaction(step, &wallets) {
				Ok(transaction) => state.unsigned_tx = Some(transaction),
				Err(e) => {
					warn!("Could not build transaction for step {}: {}", step.index, e);
					state.fail(e.to_string())?;
				},
			}
			steps.push(state);
		}
		if let Some(first) = steps.first_mut() {
			if first.status == StepStatus::Pending {
				first.transition(StepStatus::SignRequired, None)?;
			}
		}

		let now = Utc::now();
		let execution = Execution {
			id: Uuid::new_v4().to_string(),
			plan,
			wallets,
			steps,
			current_step_index: 0,
			created_at: now,
			updated_at: now,
		};
		self.store
			.create_execution(execution.clone())
			.await
			.map_err(storage_error)?;

		info!(
			"Created execution {} for plan {} ({} steps, status {})",
			execution.id,
			execution.plan.id,
			execution.steps.len(),
			execution.status()
		);
		Ok(execution)
	}

	pub async fn get_execution(&self, execution_id: &str) -> ExecutionResult<Execution> {
		self.store
			.get_execution(execution_id)
			.await
			.map_err(storage_error)?
			.ok_or_else(|| ExecutionError::NotFound {
				execution_id: execution_id.to_string(),
			})
	}

	/// Record the hash of a signed and broadcast step
	pub async fn submit_step(
		&self,
		execution_id: &str,
		index: usize,
		tx_hash: &str,
	) -> ExecutionResult<Execution> {
		let tx_hash = tx_hash.trim();
		if tx_hash.is_empty() {
			return Err(ExecutionError::MissingTxHash { index });
		}

		self.update(execution_id, |execution| {
			if index != execution.current_step_index {
				return Err(ExecutionError::NotCurrentStep {
					index,
					current: execution.current_step_index,
				});
			}
			let step = execution.step_mut(index)?;
			step.transition(StepStatus::Submitted, Some(format!("submitted {}", tx_hash)))?;
			step.tx_hash = Some(tx_hash.to_string());
			info!("Execution {} step {} submitted as {}", execution_id, index, tx_hash);
			Ok(())
		})
		.await
	}

	/// Mark a step failed, e.g. when the user rejects the signature
	pub async fn fail_step(
		&self,
		execution_id: &str,
		index: usize,
		reason: &str,
	) -> ExecutionResult<Execution> {
		self.update(execution_id, |execution| {
			execution.step_mut(index)?.fail(reason)?;
			info!("Execution {} step {} failed: {}", execution_id, index, reason);
			Ok(())
		})
		.await
	}

	/// Re-check every submitted step with a known hash and advance on
	/// confirmation. Lookup errors leave the step untouched.
	pub async fn poll_execution_status(&self, execution_id: &str) -> ExecutionResult<Execution> {
		let lock = self.lock_existing(execution_id).await?;
		let result = {
			let _guard = lock.lock().await;
			self.poll_locked(execution_id).await
		};
		self.release(execution_id, lock);
		result
	}

	pub async fn execution_count(&self) -> ExecutionResult<usize> {
		self.store.execution_count().await.map_err(storage_error)
	}

	async fn poll_locked(&self, execution_id: &str) -> ExecutionResult<Execution> {
		let mut execution = self.get_execution(execution_id).await?;
		let mut changed = false;

		for index in 0..execution.steps.len() {
			let step = &execution.steps[index];
			let Some(tx_hash) = step.tx_hash.clone() else {
				continue;
			};
			if step.status != StepStatus::Submitted {
				continue;
			}
			let family = step.family;
			let network_id = execution
				.plan
				.steps
				.get(index)
				.map(|planned| planned.from.network_id.clone())
				.unwrap_or_default();

			let status = match self.checker.check(family, &network_id, &tx_hash).await {
				Ok(status) => status,
				Err(e) => {
					warn!(
						"Status check for execution {} step {} failed: {}",
						execution_id, index, e
					);
					continue;
				},
			};
			debug!("Execution {} step {} is {:?}", execution_id, index, status);

			let step = execution.step_mut(index)?;
			match status {
				ChainTxStatus::Pending => {},
				ChainTxStatus::Confirmed => {
					step.transition(StepStatus::Confirmed, None)?;
					step.transition(StepStatus::Completed, None)?;
					changed = true;
					if index == execution.current_step_index && execution.advance()? {
						info!(
							"Execution {} advanced to step {}",
							execution_id, execution.current_step_index
						);
					}
				},
				ChainTxStatus::Failed(reason) => {
					step.fail(reason)?;
					changed = true;
				},
			}
		}

		if changed {
			execution.touch();
			self.store
				.update_execution(execution.clone())
				.await
				.map_err(storage_error)?;
			info!("Execution {} is {}", execution_id, execution.status());
		}
		Ok(execution)
	}

	async fn update<F>(&self, execution_id: &str, apply: F) -> ExecutionResult<Execution>
	where
		F: FnOnce(&mut Execution) -> ExecutionResult<()>,
	{
		let lock = self.lock_existing(execution_id).await?;
		let result = {
			let _guard = lock.lock().await;
			self.update_locked(execution_id, apply).await
		};
		self.release(execution_id, lock);
		result
	}

	async fn update_locked<F>(&self, execution_id: &str, apply: F) -> ExecutionResult<Execution>
	where
		F: FnOnce(&mut Execution) -> ExecutionResult<()>,
	{
		let mut execution = self.get_execution(execution_id).await?;
		apply(&mut execution)?;
		execution.touch();
		self.store
			.update_execution(execution.clone())
			.await
			.map_err(storage_error)?;
		Ok(execution)
	}

	/// Unknown ids fail here and never get a lock entry
	async fn lock_existing(&self, execution_id: &str) -> ExecutionResult<Arc<Mutex<()>>> {
		self.get_execution(execution_id).await?;
		Ok(self
			.locks
			.entry(execution_id.to_string())
			.or_default()
			.clone())
	}

	/// Drop the map entry once no other caller holds or waits on it
	fn release(&self, execution_id: &str, lock: Arc<Mutex<()>>) {
		drop(lock);
		self.locks
			.remove_if(execution_id, |_, held| Arc::strong_count(held) == 1);
	}
}

fn validate_plan(plan: &RoutePlan) -> ExecutionResult<()> {
	if plan.steps.is_empty() {
		return Err(ExecutionError::invalid_plan("plan has no steps"));
	}
	if let Some((position, step)) = plan
		.steps
		.iter()
		.enumerate()
		.find(|(position, step)| step.index != *position)
	{
		return Err(ExecutionError::invalid_plan(format!(
			"step at position {} has index {}",
			position, step.index
		)));
	}
	Ok(())
}

fn storage_error(error: StorageError) -> ExecutionError {
	ExecutionError::Storage(error.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::execution::status_checker::MockChainStatusChecker;
	use serde_json::json;
	use xswap_storage::MemoryStore;
	use xswap_types::{
		AssetRegistry, BaseAmount, ErrorCode, QuoteResult, RouteStep, StepEndpoint, StepKind,
	};

	const EVM_WALLET: &str = "0x1111111111111111111111111111111111111111";
	const SOLANA_WALLET: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

	fn step(
		index: usize,
		from: (&str, &str),
		to: (&str, &str),
		transaction: Option<serde_json::Value>,
	) -> RouteStep {
		let registry = AssetRegistry::builtin();
		let from = registry.resolve(from.0, from.1).unwrap();
		let to = registry.resolve(to.0, to.1).unwrap();
		let mut wallets_required = vec![from.family];
		if to.family != from.family {
			wallets_required.push(to.family);
		}
		RouteStep {
			index,
			kind: StepKind::Bridge,
			from: StepEndpoint::from(&from),
			to: StepEndpoint::from(&to),
			amount_in: None,
			amount_in_base: None,
			estimated_out: None,
			estimated_out_base: None,
			provider: Some("relay".into()),
			quote: Some(
				QuoteResult::new("relay", BaseAmount::from(100u64), BaseAmount::from(99u64))
					.with_transaction(transaction),
			),
			wallets_required,
			implemented: true,
			is_indicative: false,
			warnings: vec![],
		}
	}

	fn plan(steps: Vec<RouteStep>) -> RoutePlan {
		RoutePlan {
			id: "plan-1".into(),
			from_family: steps[0].from.family,
			to_family: steps[steps.len() - 1].to.family,
			via_hub: None,
			required_wallets: RoutePlan::wallets_for(&steps),
			steps,
			warnings: vec![],
			estimated_output: None,
			estimated_output_base: None,
			is_indicative: false,
			created_at: Utc::now(),
		}
	}

	fn two_step_plan() -> RoutePlan {
		plan(vec![
			step(
				0,
				("usdc", "solana"),
				("usdc", "arbitrum"),
				Some(json!({"swapTransaction": "AQIDBA=="})),
			),
			step(
				1,
				("usdc", "arbitrum"),
				("eth", "arbitrum"),
				Some(json!({"transactionRequest": {"to": "0xrouter", "data": "0x01"}})),
			),
		])
	}

	fn wallets() -> BTreeMap<Family, String> {
		BTreeMap::from([
			(Family::Evm, EVM_WALLET.to_string()),
			(Family::Solana, SOLANA_WALLET.to_string()),
		])
	}

	fn service(checker: MockChainStatusChecker) -> ExecutionService {
		ExecutionService::new(Arc::new(MemoryStore::new()), Arc::new(checker))
	}

	#[tokio::test]
	async fn test_create_builds_every_step() {
		let service = service(MockChainStatusChecker::new());
		let execution = service
			.create_execution(two_step_plan(), wallets())
			.await
			.unwrap();

		assert_eq!(execution.status(), StepStatus::SignRequired);
		assert_eq!(execution.steps[0].status, StepStatus::SignRequired);
		assert_eq!(execution.steps[1].status, StepStatus::Pending);
		assert!(execution.steps.iter().all(|s| s.unsigned_tx.is_some()));
		assert_eq!(service.execution_count().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_build_failure_marks_only_that_step() {
		let service = service(MockChainStatusChecker::new());
		let mut plan = two_step_plan();
		plan.steps[1].quote = None;

		let execution = service.create_execution(plan, wallets()).await.unwrap();
		assert_eq!(execution.steps[0].status, StepStatus::SignRequired);
		assert!(execution.steps[0].unsigned_tx.is_some());
		assert_eq!(execution.steps[1].status, StepStatus::Failed);
		assert!(execution.steps[1].error.is_some());
		assert_eq!(execution.status(), StepStatus::Failed);
	}

	#[tokio::test]
	async fn test_missing_wallet_is_rejected() {
		let service = service(MockChainStatusChecker::new());
		let mut wallets = wallets();
		wallets.remove(&Family::Solana);
		let error = service
			.create_execution(two_step_plan(), wallets)
			.await
			.unwrap_err();
		assert_eq!(error.code(), ErrorCode::WalletMissingForRoute);
	}

	#[tokio::test]
	async fn test_forged_wallet_claims_are_rederived() {
		let service = service(MockChainStatusChecker::new());
		let mut plan = two_step_plan();
		plan.required_wallets = vec![];
		for step in &mut plan.steps {
			step.wallets_required = vec![];
		}
		let mut wallets = wallets();
		wallets.remove(&Family::Solana);

		let error = service.create_execution(plan, wallets).await.unwrap_err();
		assert_eq!(
			error,
			ExecutionError::WalletMissing {
				missing: vec![Family::Solana]
			}
		);
		assert_eq!(service.execution_count().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_malformed_plans_are_rejected() {
		let service = service(MockChainStatusChecker::new());

		let mut empty = two_step_plan();
		empty.steps.clear();
		let error = service.create_execution(empty, wallets()).await.unwrap_err();
		assert!(matches!(error, ExecutionError::InvalidPlan { .. }));

		let mut gapped = two_step_plan();
		gapped.steps[1].index = 5;
		let error = service.create_execution(gapped, wallets()).await.unwrap_err();
		assert!(matches!(error, ExecutionError::InvalidPlan { .. }));

		let mut duplicated = two_step_plan();
		duplicated.steps[1].index = 0;
		let error = service
			.create_execution(duplicated, wallets())
			.await
			.unwrap_err();
		assert_eq!(error.code(), ErrorCode::InvalidStepTransition);
		assert_eq!(service.execution_count().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_lock_entries_do_not_outlive_calls() {
		let service = service(MockChainStatusChecker::new());
		for n in 0..100 {
			let id = format!("unknown-{}", n);
			let error = service.poll_execution_status(&id).await.unwrap_err();
			assert_eq!(error.code(), ErrorCode::ExecutionNotFound);
			assert!(service.fail_step(&id, 0, "x").await.is_err());
		}
		assert!(service.locks.is_empty());

		let id = service
			.create_execution(two_step_plan(), wallets())
			.await
			.unwrap()
			.id;
		service.poll_execution_status(&id).await.unwrap();
		service.submit_step(&id, 0, "sig1").await.unwrap();
		assert!(service.submit_step(&id, 1, "0xhash").await.is_err());
		assert!(service.locks.is_empty());
	}

	#[tokio::test]
	async fn test_poll_advances_through_steps() {
		let mut checker = MockChainStatusChecker::new();
		checker
			.expect_check()
			.withf(|family, network_id, tx_hash| {
				*family == Family::Solana && network_id == "solana" && tx_hash == "sig1"
			})
			.times(2)
			.returning({
				let mut calls = 0;
				move |_, _, _| {
					calls += 1;
					Ok(if calls == 1 {
						ChainTxStatus::Pending
					} else {
						ChainTxStatus::Confirmed
					})
				}
			});
		checker
			.expect_check()
			.withf(|family, network_id, tx_hash| {
				*family == Family::Evm && network_id == "arbitrum" && tx_hash == "0xhash2"
			})
			.times(1)
			.returning(|_, _, _| Ok(ChainTxStatus::Confirmed));

		let service = service(checker);
		let id = service
			.create_execution(two_step_plan(), wallets())
			.await
			.unwrap()
			.id;

		// nothing submitted yet: no lookups
		let execution = service.poll_execution_status(&id).await.unwrap();
		assert_eq!(execution.status(), StepStatus::SignRequired);

		service.submit_step(&id, 0, "sig1").await.unwrap();
		let execution = service.poll_execution_status(&id).await.unwrap();
		assert_eq!(execution.status(), StepStatus::Submitted);

		let execution = service.poll_execution_status(&id).await.unwrap();
		assert_eq!(execution.current_step_index, 1);
		assert_eq!(execution.steps[0].status, StepStatus::Completed);
		assert_eq!(execution.status(), StepStatus::SignRequired);

		service.submit_step(&id, 1, "0xhash2").await.unwrap();
		let execution = service.poll_execution_status(&id).await.unwrap();
		assert_eq!(execution.status(), StepStatus::Completed);
	}

	#[tokio::test]
	async fn test_chain_failure_fails_step() {
		let mut checker = MockChainStatusChecker::new();
		checker
			.expect_check()
			.returning(|_, _, _| Ok(ChainTxStatus::Failed("transaction reverted".into())));

		let service = service(checker);
		let id = service
			.create_execution(two_step_plan(), wallets())
			.await
			.unwrap()
			.id;
		service.submit_step(&id, 0, "sig1").await.unwrap();

		let execution = service.poll_execution_status(&id).await.unwrap();
		assert_eq!(execution.status(), StepStatus::Failed);
		assert_eq!(
			execution.steps[0].error.as_deref(),
			Some("transaction reverted")
		);
	}

	#[tokio::test]
	async fn test_status_check_errors_leave_step_submitted() {
		let mut checker = MockChainStatusChecker::new();
		checker.expect_check().returning(|_, _, _| {
			Err(ExecutionError::StatusCheck {
				reason: "rpc down".into(),
			})
		});

		let service = service(checker);
		let id = service
			.create_execution(two_step_plan(), wallets())
			.await
			.unwrap()
			.id;
		service.submit_step(&id, 0, "sig1").await.unwrap();

		let execution = service.poll_execution_status(&id).await.unwrap();
		assert_eq!(execution.status(), StepStatus::Submitted);
	}

	#[tokio::test]
	async fn test_step_reporting_rules() {
		let service = service(MockChainStatusChecker::new());
		let id = service
			.create_execution(two_step_plan(), wallets())
			.await
			.unwrap()
			.id;

		let error = service.submit_step(&id, 1, "0xhash").await.unwrap_err();
		assert!(matches!(error, ExecutionError::NotCurrentStep { index: 1, current: 0 }));

		let error = service.submit_step(&id, 0, "  ").await.unwrap_err();
		assert!(matches!(error, ExecutionError::MissingTxHash { .. }));

		let error = service.submit_step("missing", 0, "0xhash").await.unwrap_err();
		assert_eq!(error.code(), ErrorCode::ExecutionNotFound);

		let execution = service.fail_step(&id, 0, "user rejected").await.unwrap();
		assert_eq!(execution.status(), StepStatus::Failed);

		let error = service.submit_step(&id, 0, "0xhash").await.unwrap_err();
		assert_eq!(error.code(), ErrorCode::InvalidStepTransition);
	}
}
