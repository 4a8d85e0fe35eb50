//! Error types for execution operations

use thiserror::Error;

use super::StepStatus;
use crate::errors::ErrorCode;
use crate::models::Family;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
	#[error("Execution not found: {execution_id}")]
	NotFound { execution_id: String },

	#[error("Execution {execution_id} has no step {index}")]
	StepOutOfRange { execution_id: String, index: usize },

	#[error("Step {index} cannot move from {from} to {to}")]
	InvalidTransition {
		index: usize,
		from: StepStatus,
		to: StepStatus,
	},

	#[error("Step {index} is not the active step (active: {current})")]
	NotCurrentStep { index: usize, current: usize },

	#[error("Step {index} has no transaction hash")]
	MissingTxHash { index: usize },

	#[error("Invalid route plan: {reason}")]
	InvalidPlan { reason: String },

	#[error("Execution requires wallets for {missing:?}")]
	WalletMissing { missing: Vec<Family> },

	#[error("Failed to build transaction: {reason}")]
	Build { reason: String },

	#[error("Status check failed: {reason}")]
	StatusCheck { reason: String },

	#[error("Storage error: {0}")]
	Storage(String),
}

impl ExecutionError {
	pub fn code(&self) -> ErrorCode {
		match self {
			ExecutionError::NotFound { .. } => ErrorCode::ExecutionNotFound,
			ExecutionError::StepOutOfRange { .. }
			| ExecutionError::InvalidTransition { .. }
			| ExecutionError::NotCurrentStep { .. }
			| ExecutionError::MissingTxHash { .. }
			| ExecutionError::InvalidPlan { .. } => ErrorCode::InvalidStepTransition,
			ExecutionError::WalletMissing { .. } => ErrorCode::WalletMissingForRoute,
			ExecutionError::Build { .. }
			| ExecutionError::StatusCheck { .. }
			| ExecutionError::Storage(_) => ErrorCode::ApiError,
		}
	}

	pub fn invalid_plan(reason: impl Into<String>) -> Self {
		ExecutionError::InvalidPlan {
			reason: reason.into(),
		}
	}

	pub fn build(reason: impl Into<String>) -> Self {
		ExecutionError::Build {
			reason: reason.into(),
		}
	}
}
