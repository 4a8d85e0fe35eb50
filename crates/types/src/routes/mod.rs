//! Multi-leg route plans

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub mod errors;
pub mod matrix;

pub use errors::{LegAttempt, LegStatus, RoutePlanError};
pub use matrix::{LegTemplate, RouteMatrix, RouteRule};

use crate::adapters::QuoteResult;
use crate::assets::ResolvedToken;
use crate::models::{BaseAmount, Family};

pub type RoutePlanResult<T> = Result<T, RoutePlanError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
	Swap,
	Bridge,
	OffchainSwap,
	Transfer,
	Approve,
	Wrap,
	Unwrap,
}

/// One side of a route step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepEndpoint {
	pub network_id: String,
	pub family: Family,
	pub chain_id: Option<u64>,
	pub token_id: String,
	pub symbol: String,
	pub address: String,
	pub decimals: u8,
}

impl From<&ResolvedToken> for StepEndpoint {
	fn from(token: &ResolvedToken) -> Self {
		Self {
			network_id: token.network_id.clone(),
			family: token.family,
			chain_id: token.chain_id,
			token_id: token.token_id.clone(),
			symbol: token.symbol.clone(),
			address: token.address.clone(),
			decimals: token.decimals,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
	pub index: usize,
	pub kind: StepKind,
	pub from: StepEndpoint,
	pub to: StepEndpoint,
	/// Human-readable input; unknown after an unquoted leg
	pub amount_in: Option<String>,
	pub amount_in_base: Option<BaseAmount>,
	pub estimated_out: Option<String>,
	pub estimated_out_base: Option<BaseAmount>,
	pub provider: Option<String>,
	pub quote: Option<QuoteResult>,
	/// Families whose wallet must sign or receive for this step
	pub wallets_required: Vec<Family>,
	/// False for steps no adapter can execute (offchain legs)
	pub implemented: bool,
	pub is_indicative: bool,
	#[serde(default)]
	pub warnings: Vec<String>,
}

impl RouteStep {
	pub fn family(&self) -> Family {
		self.from.family
	}

	pub fn is_quoted(&self) -> bool {
		self.quote.is_some()
	}
}

/// Finalized plan. Built fresh per request and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
	pub id: String,
	pub from_family: Family,
	pub to_family: Family,
	/// Hub network id for 3-step routes
	pub via_hub: Option<String>,
	pub steps: Vec<RouteStep>,
	pub required_wallets: Vec<Family>,
	#[serde(default)]
	pub warnings: Vec<String>,
	pub estimated_output: Option<String>,
	pub estimated_output_base: Option<BaseAmount>,
	pub is_indicative: bool,
	pub created_at: DateTime<Utc>,
}

impl RoutePlan {
	/// Union of wallets required by the given steps, ordered
	pub fn wallets_for(steps: &[RouteStep]) -> Vec<Family> {
		steps
			.iter()
			.flat_map(|step| step.wallets_required.iter().copied())
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect()
	}

	/// Wallets the plan's steps need, counting each step's own endpoints
	/// whatever `required_wallets` claims
	pub fn derived_wallets(&self) -> Vec<Family> {
		self.steps
			.iter()
			.flat_map(|step| {
				step.wallets_required
					.iter()
					.copied()
					.chain([step.from.family, step.to.family])
			})
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect()
	}

	pub fn missing_wallets(&self, wallets: &BTreeMap<Family, String>) -> Vec<Family> {
		self.required_wallets
			.iter()
			.filter(|family| {
				wallets
					.get(family)
					.map(|address| address.trim().is_empty())
					.unwrap_or(true)
			})
			.copied()
			.collect()
	}

	pub fn is_fully_implemented(&self) -> bool {
		self.steps.iter().all(|step| step.implemented)
	}
}

/// API request body for /api/v1/routes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanRequest {
	pub amount: String,
	pub from_token_id: String,
	pub to_token_id: String,
	pub from_network_id: String,
	pub to_network_id: String,
	/// Connected wallet address per family
	#[serde(default)]
	pub wallets: BTreeMap<Family, String>,
	pub slippage_bps: Option<u32>,
	pub request_id: Option<String>,
}

impl RoutePlanRequest {
	pub fn new(
		amount: &str,
		from_token_id: &str,
		from_network_id: &str,
		to_token_id: &str,
		to_network_id: &str,
	) -> Self {
		Self {
			amount: amount.to_string(),
			from_token_id: from_token_id.to_string(),
			to_token_id: to_token_id.to_string(),
			from_network_id: from_network_id.to_string(),
			to_network_id: to_network_id.to_string(),
			..Default::default()
		}
	}

	pub fn with_wallet(mut self, family: Family, address: &str) -> Self {
		self.wallets.insert(family, address.to_string());
		self
	}

	pub fn wallet(&self, family: Family) -> Option<&str> {
		self.wallets
			.get(&family)
			.map(|address| address.trim())
			.filter(|address| !address.is_empty())
	}
}
