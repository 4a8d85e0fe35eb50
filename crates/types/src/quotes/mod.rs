//! Aggregated quote domain model

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod request;
pub mod response;

pub use errors::{QuoteError, Side};
pub use request::QuoteRequest;
pub use response::QuoteResponse;

use crate::adapters::{ProviderError, QuoteResult};
use crate::assets::ResolvedToken;
use crate::errors::ErrorCode;

/// Result type for quote validation operations
pub type QuoteValidationResult<T> = Result<T, QuoteError>;

/// Where the winning quote came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
	Provider,
	PriceFallback,
}

/// A provider quote dropped by the sanity checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RejectedQuote {
	pub provider: String,
	pub code: ErrorCode,
	pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedProvider {
	pub provider: String,
	pub reason: String,
}

/// How a quote was produced
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregationMetadata {
	pub providers_queried: usize,
	pub providers_succeeded: usize,
	pub providers_skipped: usize,
	pub providers_failed: usize,
	pub providers_timed_out: usize,
	pub duration_ms: u64,
	pub served_from_cache: bool,
	pub coalesced: bool,
	#[serde(default)]
	pub rejected: Vec<RejectedQuote>,
	#[serde(default)]
	pub skipped: Vec<SkippedProvider>,
	#[serde(default)]
	pub errors: Vec<ProviderError>,
}

/// Winning quote for a request, with both tokens resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedQuote {
	pub quote: QuoteResult,
	pub from: ResolvedToken,
	pub to: ResolvedToken,
	/// Human-readable input amount
	pub in_amount: String,
	/// Human-readable output amount, computed with registry decimals
	pub out_amount: String,
	pub source: QuoteSource,
	#[serde(default)]
	pub warnings: Vec<String>,
	#[serde(default)]
	pub metadata: AggregationMetadata,
}

impl AggregatedQuote {
	pub fn is_indicative(&self) -> bool {
		self.quote.is_indicative
	}

	pub fn provider(&self) -> &str {
		&self.quote.provider
	}
}
