//! Execution records and the step-level confirmation state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod errors;
pub mod transaction;

pub use errors::ExecutionError;
pub use transaction::{TonMessage, UnsignedTransaction};

use crate::models::Family;
use crate::routes::{RoutePlan, StepKind};

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Step lifecycle: `PENDING -> SIGN_REQUIRED -> SUBMITTED -> CONFIRMED -> COMPLETED`,
/// with `FAILED` reachable from any state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
	Pending,
	SignRequired,
	Submitted,
	Confirmed,
	Completed,
	Failed,
}

impl StepStatus {
	pub fn can_transition_to(&self, next: StepStatus) -> bool {
		use StepStatus::*;
		match (self, next) {
			(Failed, _) => false,
			(_, Failed) => true,
			(Pending, SignRequired)
			| (SignRequired, Submitted)
			| (Submitted, Confirmed)
			| (Confirmed, Completed) => true,
			_ => false,
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, StepStatus::Completed | StepStatus::Failed)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			StepStatus::Pending => "PENDING",
			StepStatus::SignRequired => "SIGN_REQUIRED",
			StepStatus::Submitted => "SUBMITTED",
			StepStatus::Confirmed => "CONFIRMED",
			StepStatus::Completed => "COMPLETED",
			StepStatus::Failed => "FAILED",
		}
	}
}

impl fmt::Display for StepStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
	pub from: StepStatus,
	pub to: StepStatus,
	pub at: DateTime<Utc>,
	pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStepState {
	pub index: usize,
	pub kind: StepKind,
	pub family: Family,
	pub provider: Option<String>,
	pub status: StepStatus,
	pub tx_hash: Option<String>,
	pub unsigned_tx: Option<UnsignedTransaction>,
	pub error: Option<String>,
	#[serde(default)]
	pub history: Vec<StatusChange>,
	pub updated_at: DateTime<Utc>,
}

impl ExecutionStepState {
	pub fn new(index: usize, kind: StepKind, family: Family, provider: Option<String>) -> Self {
		Self {
			index,
			kind,
			family,
			provider,
			status: StepStatus::Pending,
			tx_hash: None,
			unsigned_tx: None,
			error: None,
			history: Vec::new(),
			updated_at: Utc::now(),
		}
	}

	pub fn transition(&mut self, next: StepStatus, reason: Option<String>) -> ExecutionResult<()> {
		if !self.status.can_transition_to(next) {
			return Err(ExecutionError::InvalidTransition {
				index: self.index,
				from: self.status,
				to: next,
			});
		}
		let now = Utc::now();
		self.history.push(StatusChange {
			from: self.status,
			to: next,
			at: now,
			reason: reason.clone(),
		});
		if next == StepStatus::Failed {
			self.error = reason;
		}
		self.status = next;
		self.updated_at = now;
		Ok(())
	}

	pub fn fail(&mut self, reason: impl Into<String>) -> ExecutionResult<()> {
		self.transition(StepStatus::Failed, Some(reason.into()))
	}
}

/// Execution of a route plan. The execution-level status is derived from the
/// step states on every read and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
	pub id: String,
	pub plan: RoutePlan,
	pub wallets: BTreeMap<Family, String>,
	pub steps: Vec<ExecutionStepState>,
	pub current_step_index: usize,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Execution {
	pub fn status(&self) -> StepStatus {
		if self.steps.iter().all(|s| s.status == StepStatus::Completed) {
			return StepStatus::Completed;
		}
		if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
			return StepStatus::Failed;
		}
		self.current_step()
			.map(|step| step.status)
			.unwrap_or(StepStatus::Pending)
	}

	pub fn current_step(&self) -> Option<&ExecutionStepState> {
		self.steps.get(self.current_step_index)
	}

	pub fn step_mut(&mut self, index: usize) -> ExecutionResult<&mut ExecutionStepState> {
		let execution_id = self.id.clone();
		self.steps
			.get_mut(index)
			.ok_or(ExecutionError::StepOutOfRange {
				execution_id,
				index,
			})
	}

	/// Move past a completed current step and open the next one for signing.
	/// Returns whether the index moved.
	pub fn advance(&mut self) -> ExecutionResult<bool> {
		let completed = self
			.current_step()
			.map(|step| step.status == StepStatus::Completed)
			.unwrap_or(false);
		if !completed || self.current_step_index + 1 >= self.steps.len() {
			return Ok(false);
		}

		self.current_step_index += 1;
		let next = self.step_mut(self.current_step_index)?;
		if next.status == StepStatus::Pending {
			next.transition(StepStatus::SignRequired, None)?;
		}
		self.touch();
		Ok(true)
	}

	pub fn touch(&mut self) {
		self.updated_at = Utc::now();
	}
}

/// Wire shape of an execution, with the derived status materialized
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
	pub id: String,
	pub status: StepStatus,
	pub current_step_index: usize,
	pub steps: Vec<ExecutionStepState>,
	pub plan: RoutePlan,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&Execution> for ExecutionResponse {
	fn from(execution: &Execution) -> Self {
		Self {
			id: execution.id.clone(),
			status: execution.status(),
			current_step_index: execution.current_step_index,
			steps: execution.steps.clone(),
			plan: execution.plan.clone(),
			created_at: execution.created_at,
			updated_at: execution.updated_at,
		}
	}
}
