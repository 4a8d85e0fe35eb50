//! Quote response model for API layer

use serde::{Deserialize, Serialize};

use super::{AggregatedQuote, AggregationMetadata, QuoteError, QuoteRequest, QuoteSource};
use crate::errors::ErrorCode;

/// Caller-facing quote response. Fee fields are individually nullable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
	pub ok: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request_id: Option<String>,
	pub provider: Option<String>,
	pub from_network_id: String,
	pub to_network_id: String,
	pub from_token_id: String,
	pub to_token_id: String,
	pub from_chain_id: Option<u64>,
	pub to_chain_id: Option<u64>,
	pub from_token_address: Option<String>,
	pub to_token_address: Option<String>,
	pub in_amount: Option<String>,
	pub out_amount: Option<String>,
	pub out_amount_base: Option<String>,
	pub out_amount_min_base: Option<String>,
	pub is_indicative: bool,
	#[serde(rename = "estimatedGasUSD")]
	pub estimated_gas_usd: Option<f64>,
	#[serde(rename = "providerFeeUSD")]
	pub provider_fee_usd: Option<f64>,
	#[serde(rename = "bridgeFeeUSD")]
	pub bridge_fee_usd: Option<f64>,
	#[serde(rename = "totalFeeUSD")]
	pub total_fee_usd: Option<f64>,
	pub estimated_duration_secs: Option<u64>,
	pub source: Option<QuoteSource>,
	pub warnings: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transaction: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_code: Option<ErrorCode>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub debug: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metadata: Option<AggregationMetadata>,
}

impl QuoteResponse {
	fn echo(request: &QuoteRequest) -> Self {
		Self {
			ok: false,
			request_id: request.request_id.clone(),
			provider: None,
			from_network_id: request.from_network_id.clone(),
			to_network_id: request.to_network_id.clone(),
			from_token_id: request.from_token_id.clone(),
			to_token_id: request.to_token_id.clone(),
			from_chain_id: None,
			to_chain_id: None,
			from_token_address: None,
			to_token_address: None,
			in_amount: None,
			out_amount: None,
			out_amount_base: None,
			out_amount_min_base: None,
			is_indicative: false,
			estimated_gas_usd: None,
			provider_fee_usd: None,
			bridge_fee_usd: None,
			total_fee_usd: None,
			estimated_duration_secs: None,
			source: None,
			warnings: Vec::new(),
			transaction: None,
			error: None,
			error_code: None,
			debug: None,
			metadata: None,
		}
	}

	pub fn success(request: &QuoteRequest, quote: &AggregatedQuote) -> Self {
		let fees = &quote.quote.fees;
		let mut warnings = quote.warnings.clone();
		for warning in &quote.quote.warnings {
			if !warnings.contains(warning) {
				warnings.push(warning.clone());
			}
		}

		Self {
			ok: true,
			provider: Some(quote.provider().to_string()),
			from_chain_id: quote.from.chain_id,
			to_chain_id: quote.to.chain_id,
			from_token_address: Some(quote.from.address.clone()),
			to_token_address: Some(quote.to.address.clone()),
			in_amount: Some(quote.in_amount.clone()),
			out_amount: Some(quote.out_amount.clone()),
			out_amount_base: Some(quote.quote.to_amount.to_string()),
			out_amount_min_base: quote.quote.to_amount_min.as_ref().map(|a| a.to_string()),
			is_indicative: quote.is_indicative(),
			estimated_gas_usd: fees.gas_usd(),
			provider_fee_usd: fees.protocol_usd(),
			bridge_fee_usd: fees.bridge_usd(),
			total_fee_usd: fees.total_usd(),
			estimated_duration_secs: quote.quote.estimated_duration_secs,
			source: Some(quote.source),
			warnings,
			transaction: quote.quote.transaction.clone(),
			metadata: Some(quote.metadata.clone()),
			..Self::echo(request)
		}
	}

	/// Failure body. Internal details and provider diagnostics only appear
	/// when `debug` is set.
	pub fn failure(request: &QuoteRequest, error: &QuoteError, debug: bool) -> Self {
		let message = match error {
			QuoteError::Internal { .. } if !debug => "Internal error".to_string(),
			_ => error.to_string(),
		};
		let debug_payload = if debug {
			Some(serde_json::json!({
				"detail": error.to_string(),
				"providerErrors": error.provider_errors(),
			}))
		} else {
			None
		};

		Self {
			error: Some(message),
			error_code: Some(error.code()),
			debug: debug_payload,
			..Self::echo(request)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::adapters::{FeeBreakdown, FeeItem, FeeKind, QuoteResult};
	use crate::assets::AssetRegistry;
	use crate::models::BaseAmount;

	fn aggregated() -> AggregatedQuote {
		let registry = AssetRegistry::builtin();
		let quote = QuoteResult::new(
			"lifi",
			BaseAmount::from(1_000_000u64),
			BaseAmount::from(998_000u64),
		)
		.with_fees(
			FeeBreakdown::default()
				.with(FeeItem::usd(FeeKind::Gas, Some(0.4)))
				.with(FeeItem::usd(FeeKind::Bridge, Some(0.6))),
		);
		AggregatedQuote {
			quote,
			from: registry.resolve("usdc", "ethereum").unwrap(),
			to: registry.resolve("usdc", "base").unwrap(),
			in_amount: "1".into(),
			out_amount: "0.998".into(),
			source: QuoteSource::Provider,
			warnings: vec![],
			metadata: AggregationMetadata::default(),
		}
	}

	#[test]
	fn test_success_response_wire_names() {
		let request = QuoteRequest::new("1", "usdc", "ethereum", "usdc", "base");
		let response = QuoteResponse::success(&request, &aggregated());
		let json = serde_json::to_value(&response).unwrap();

		assert_eq!(json["ok"], true);
		assert_eq!(json["outAmountBase"], "998000");
		assert_eq!(json["estimatedGasUSD"], 0.4);
		assert_eq!(json["bridgeFeeUSD"], 0.6);
		assert!(json["providerFeeUSD"].is_null());
		assert_eq!(json["totalFeeUSD"], 1.0);
		assert_eq!(json["fromChainId"], 1);
		assert!(json.get("errorCode").is_none());
	}

	#[test]
	fn test_internal_errors_are_redacted_without_debug() {
		let request = QuoteRequest::new("1", "usdc", "ethereum", "usdc", "base");
		let error = QuoteError::internal("database password is hunter2");

		let response = QuoteResponse::failure(&request, &error, false);
		assert!(!response.ok);
		assert_eq!(response.error.as_deref(), Some("Internal error"));
		assert_eq!(response.error_code, Some(ErrorCode::ApiError));
		assert!(response.debug.is_none());

		let response = QuoteResponse::failure(&request, &error, true);
		assert!(response.error.unwrap().contains("hunter2"));
		assert!(response.debug.is_some());
	}
}
