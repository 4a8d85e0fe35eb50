//! Canonical provider request/response models
//!
//! Every adapter translates a [`QuoteInput`] into its upstream request shape
//! and the upstream response back into a [`QuoteResult`].

use serde::{Deserialize, Serialize};

use crate::assets::ResolvedToken;
use crate::models::{BaseAmount, Family};

// ================================
// REQUEST MODELS
// ================================

/// Fully-resolved input handed to provider adapters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
	pub from: ResolvedToken,
	pub to: ResolvedToken,
	/// Amount in base units of `from`
	pub amount: BaseAmount,
	/// Sender; a placeholder EOA when the caller supplied none
	pub user_address: String,
	/// Receiver on the destination chain, defaults to the sender
	pub recipient: Option<String>,
	pub slippage_bps: u32,
	/// Set when the user address is a placeholder; the quote cannot be executed
	pub indicative: bool,
}

impl QuoteInput {
	pub fn new(from: ResolvedToken, to: ResolvedToken, amount: BaseAmount, user_address: &str) -> Self {
		Self {
			from,
			to,
			amount,
			user_address: user_address.to_string(),
			recipient: None,
			slippage_bps: crate::constants::limits::DEFAULT_SLIPPAGE_BPS,
			indicative: false,
		}
	}

	pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
		self.recipient = Some(recipient.into());
		self
	}

	pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
		self.slippage_bps = slippage_bps;
		self
	}

	pub fn indicative(mut self) -> Self {
		self.indicative = true;
		self
	}

	pub fn is_cross_chain(&self) -> bool {
		self.from.network_id != self.to.network_id
	}

	pub fn receiver(&self) -> &str {
		self.recipient.as_deref().unwrap_or(&self.user_address)
	}

	/// Slippage as a fraction (50 bps -> 0.005)
	pub fn slippage_fraction(&self) -> f64 {
		self.slippage_bps as f64 / 10_000.0
	}

	/// Provider-independent key of the token pair, used by the negative cache
	pub fn pair_key(&self) -> String {
		format!(
			"{}:{}->{}:{}",
			self.from.chain_key(),
			self.from.address.to_ascii_lowercase(),
			self.to.chain_key(),
			self.to.address.to_ascii_lowercase()
		)
	}
}

// ================================
// RESPONSE MODELS
// ================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
	Gas,
	Protocol,
	Bridge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeItem {
	pub kind: FeeKind,
	/// Amount in the fee token's base units when the provider reports it
	pub amount: Option<String>,
	pub token_symbol: Option<String>,
	pub usd: Option<f64>,
}

impl FeeItem {
	pub fn usd(kind: FeeKind, usd: Option<f64>) -> Self {
		Self {
			kind,
			amount: None,
			token_symbol: None,
			usd,
		}
	}
}

/// Typed fee breakdown; each category's USD value is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeeBreakdown {
	pub items: Vec<FeeItem>,
}

impl FeeBreakdown {
	pub fn push(&mut self, item: FeeItem) {
		self.items.push(item);
	}

	pub fn with(mut self, item: FeeItem) -> Self {
		self.items.push(item);
		self
	}

	/// Sum of known USD values for a category; `None` when none are known
	pub fn usd_for(&self, kind: FeeKind) -> Option<f64> {
		self.items
			.iter()
			.filter(|item| item.kind == kind)
			.filter_map(|item| item.usd)
			.fold(None, |acc, usd| Some(acc.unwrap_or(0.0) + usd))
	}

	pub fn gas_usd(&self) -> Option<f64> {
		self.usd_for(FeeKind::Gas)
	}

	pub fn protocol_usd(&self) -> Option<f64> {
		self.usd_for(FeeKind::Protocol)
	}

	pub fn bridge_usd(&self) -> Option<f64> {
		self.usd_for(FeeKind::Bridge)
	}

	pub fn total_usd(&self) -> Option<f64> {
		[self.gas_usd(), self.protocol_usd(), self.bridge_usd()]
			.into_iter()
			.flatten()
			.fold(None, |acc, usd| Some(acc.unwrap_or(0.0) + usd))
	}
}

/// One hop inside a provider's own route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStep {
	/// Provider-reported kind ("swap", "cross", "bridge", ...)
	pub kind: String,
	pub tool: Option<String>,
	pub from_chain: Option<String>,
	pub to_chain: Option<String>,
}

/// Canonical quote returned by a provider adapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
	pub provider: String,
	pub from_amount: BaseAmount,
	/// Output in base units of the destination token; never zero once accepted
	pub to_amount: BaseAmount,
	pub to_amount_min: Option<BaseAmount>,
	#[serde(default)]
	pub fees: FeeBreakdown,
	#[serde(default)]
	pub steps: Vec<ProviderStep>,
	pub is_indicative: bool,
	pub latency_ms: u64,
	pub estimated_duration_secs: Option<u64>,
	/// Provider transaction payload used to build unsigned transactions
	pub transaction: Option<serde_json::Value>,
	#[serde(default)]
	pub warnings: Vec<String>,
}

impl QuoteResult {
	pub fn new(provider: &str, from_amount: BaseAmount, to_amount: BaseAmount) -> Self {
		Self {
			provider: provider.to_string(),
			from_amount,
			to_amount,
			to_amount_min: None,
			fees: FeeBreakdown::default(),
			steps: Vec::new(),
			is_indicative: false,
			latency_ms: 0,
			estimated_duration_secs: None,
			transaction: None,
			warnings: Vec::new(),
		}
	}

	pub fn with_min_amount(mut self, to_amount_min: Option<BaseAmount>) -> Self {
		self.to_amount_min = to_amount_min;
		self
	}

	pub fn with_fees(mut self, fees: FeeBreakdown) -> Self {
		self.fees = fees;
		self
	}

	pub fn with_steps(mut self, steps: Vec<ProviderStep>) -> Self {
		self.steps = steps;
		self
	}

	pub fn with_duration(mut self, seconds: Option<u64>) -> Self {
		self.estimated_duration_secs = seconds;
		self
	}

	pub fn with_transaction(mut self, transaction: Option<serde_json::Value>) -> Self {
		self.transaction = transaction;
		self
	}

	pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
		self.warnings.push(warning.into());
		self
	}

	pub fn indicative(mut self) -> Self {
		self.is_indicative = true;
		self
	}
}

// ================================
// PROVIDER METADATA
// ================================

/// Static description of a provider adapter implementation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
	pub provider_id: String,
	pub name: String,
	pub version: String,
	/// Families this provider can quote on at all
	pub families: Vec<Family>,
	/// Whether the provider moves assets between networks
	pub cross_chain: bool,
}

impl ProviderInfo {
	pub fn new(provider_id: &str, name: &str, families: Vec<Family>, cross_chain: bool) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			name: name.to_string(),
			version: "1.0.0".to_string(),
			families,
			cross_chain,
		}
	}

	pub fn serves(&self, family: Family) -> bool {
		self.families.contains(&family)
	}
}

/// Result of an adapter's local pre-check on an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Support {
	Supported,
	Unsupported(String),
}

impl Support {
	pub fn unsupported(reason: impl Into<String>) -> Self {
		Support::Unsupported(reason.into())
	}
}
