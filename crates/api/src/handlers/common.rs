use axum::{http::StatusCode, Json};
use serde::Serialize;
use xswap_types::{ErrorCode, ExecutionError, RoutePlanError};

/// Error response format shared by handlers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	pub timestamp: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
			timestamp: chrono::Utc::now().timestamp(),
			details: None,
		}
	}

	pub fn with_details(mut self, details: serde_json::Value) -> Self {
		self.details = Some(details);
		self
	}
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a request-level error code
pub fn status_for(code: ErrorCode) -> StatusCode {
	if code.is_input_error() {
		return StatusCode::BAD_REQUEST;
	}
	if code.is_integrity_error() {
		return StatusCode::BAD_GATEWAY;
	}
	match code {
		ErrorCode::NoRoute | ErrorCode::AdapterMissing | ErrorCode::ExecutionNotFound => {
			StatusCode::NOT_FOUND
		},
		ErrorCode::WalletMissingForRoute => StatusCode::UNPROCESSABLE_ENTITY,
		ErrorCode::InvalidStepTransition => StatusCode::CONFLICT,
		ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
		ErrorCode::NetworkError | ErrorCode::InvalidResponse => StatusCode::BAD_GATEWAY,
		ErrorCode::ProviderDisabled | ErrorCode::ApiKeyRequired => StatusCode::SERVICE_UNAVAILABLE,
		_ => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

/// Internal failures are reported generically unless debug output is on
fn redacted(code: ErrorCode, message: String, debug: bool) -> String {
	if code == ErrorCode::ApiError && !debug {
		"Internal error".to_string()
	} else {
		message
	}
}

pub fn route_error(error: &RoutePlanError, debug: bool) -> ApiError {
	let code = error.code();
	let details = match error {
		RoutePlanError::AdapterMissing { missing, trail } => Some(serde_json::json!({
			"missingAdapters": missing,
			"trail": trail,
		})),
		RoutePlanError::LegFailed {
			leg,
			trail,
			missing_adapters,
			error,
		} => Some(serde_json::json!({
			"leg": leg,
			"legErrorCode": error.code(),
			"missingAdapters": missing_adapters,
			"trail": trail,
		})),
		RoutePlanError::WalletMissing { required, missing } => Some(serde_json::json!({
			"requiredWallets": required,
			"missingWallets": missing,
		})),
		RoutePlanError::NoRoute { from, to } => Some(serde_json::json!({
			"fromFamily": from,
			"toFamily": to,
		})),
		RoutePlanError::Quote(_) => None,
	};

	let mut body = ErrorResponse::new(code.as_str(), redacted(code, error.to_string(), debug));
	if let Some(details) = details {
		body = body.with_details(details);
	}
	(status_for(code), Json(body))
}

pub fn execution_error(error: &ExecutionError, debug: bool) -> ApiError {
	let code = error.code();
	let mut body = ErrorResponse::new(code.as_str(), redacted(code, error.to_string(), debug));
	if let ExecutionError::WalletMissing { missing } = error {
		body = body.with_details(serde_json::json!({ "missingWallets": missing }));
	}
	(status_for(code), Json(body))
}

#[cfg(test)]
mod tests {
	use super::*;
	use xswap_types::{Family, QuoteError, StepStatus};

	#[test]
	fn test_status_mapping() {
		assert_eq!(status_for(ErrorCode::InvalidAmount), StatusCode::BAD_REQUEST);
		assert_eq!(status_for(ErrorCode::TokenDecimalsMismatch), StatusCode::BAD_REQUEST);
		assert_eq!(status_for(ErrorCode::NoRoute), StatusCode::NOT_FOUND);
		assert_eq!(status_for(ErrorCode::SuspiciousQuote), StatusCode::BAD_GATEWAY);
		assert_eq!(
			status_for(ErrorCode::WalletMissingForRoute),
			StatusCode::UNPROCESSABLE_ENTITY
		);
		assert_eq!(status_for(ErrorCode::ExecutionNotFound), StatusCode::NOT_FOUND);
		assert_eq!(status_for(ErrorCode::InvalidStepTransition), StatusCode::CONFLICT);
		assert_eq!(status_for(ErrorCode::ApiError), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn test_route_errors_carry_details() {
		let (status, Json(body)) = route_error(
			&RoutePlanError::WalletMissing {
				required: vec![Family::Evm, Family::Solana],
				missing: vec![Family::Solana],
			},
			false,
		);
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body.error, "WALLET_MISSING_FOR_ROUTE");
		let details = body.details.unwrap();
		assert_eq!(details["missingWallets"], serde_json::json!(["SOLANA"]));

		let (status, Json(body)) =
			route_error(&RoutePlanError::Quote(QuoteError::internal("secret")), false);
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body.message, "Internal error");
	}

	#[test]
	fn test_execution_errors() {
		let (status, Json(body)) = execution_error(
			&ExecutionError::NotFound {
				execution_id: "abc".into(),
			},
			false,
		);
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body.error, "EXECUTION_NOT_FOUND");

		let (status, _) = execution_error(
			&ExecutionError::InvalidTransition {
				index: 0,
				from: StepStatus::Pending,
				to: StepStatus::Submitted,
			},
			false,
		);
		assert_eq!(status, StatusCode::CONFLICT);

		let (_, Json(body)) = execution_error(&ExecutionError::Storage("disk on fire".into()), true);
		assert!(body.message.contains("disk on fire"));
	}
}
