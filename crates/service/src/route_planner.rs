//! Hub route planner
//!
//! Same-family swaps are a single quoted step. Cross-family swaps follow the
//! routing matrix: an optional swap into the canonical bridge token, one or
//! two bridge hops (the second passing through the EVM hub), and an optional
//! swap out of the bridge token. Legs are quoted in order with each leg's
//! estimated output feeding the next.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use xswap_adapters::ProviderRegistry;
use xswap_config::{QuoteSettings, RoutingSettings};
use xswap_types::{
	to_base_units, AggregatedQuote, AssetRegistry, BaseAmount, Family, LegAttempt, LegStatus,
	LegTemplate, QuoteError, ResolvedToken, RouteMatrix, RoutePlan, RoutePlanError,
	RoutePlanRequest, RoutePlanResult, RouteStep, Side, StepEndpoint, StepKind,
};

use crate::aggregator::{AggregatorTrait, ResolvedQuoteRequest};

/// A leg before quoting
#[derive(Debug, Clone)]
struct PlannedLeg {
	kind: StepKind,
	from: ResolvedToken,
	to: ResolvedToken,
}

impl PlannedLeg {
	fn is_offchain(&self) -> bool {
		self.kind == StepKind::OffchainSwap
	}

	fn describe(&self) -> String {
		format!(
			"{} {}:{} -> {}:{}",
			self.kind_label(),
			self.from.network_id,
			self.from.token_id,
			self.to.network_id,
			self.to.token_id
		)
	}

	fn kind_label(&self) -> &'static str {
		match self.kind {
			StepKind::Swap => "swap",
			StepKind::Bridge => "bridge",
			StepKind::OffchainSwap => "offchain swap",
			_ => "step",
		}
	}

	fn attempt(&self, index: usize, status: LegStatus) -> LegAttempt {
		LegAttempt {
			index,
			kind: self.kind,
			from_network: self.from.network_id.clone(),
			to_network: self.to.network_id.clone(),
			from_token: self.from.token_id.clone(),
			to_token: self.to.token_id.clone(),
			status,
			provider: None,
			error_code: None,
			message: None,
		}
	}

	/// Families that sign on the source side or receive on the destination
	fn wallets(&self) -> Vec<Family> {
		let mut wallets = vec![self.from.family];
		if self.to.family != self.from.family {
			wallets.push(self.to.family);
		}
		wallets
	}
}

pub struct HubRoutePlanner {
	assets: Arc<AssetRegistry>,
	quotes: Arc<dyn AggregatorTrait>,
	providers: Arc<ProviderRegistry>,
	matrix: RouteMatrix,
	routing: RoutingSettings,
	allowed_families: Vec<Family>,
}

impl std::fmt::Debug for HubRoutePlanner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HubRoutePlanner")
			.field("matrix", &self.matrix)
			.field("routing", &self.routing)
			.field("allowed_families", &self.allowed_families)
			.finish()
	}
}

impl HubRoutePlanner {
	pub fn new(
		assets: Arc<AssetRegistry>,
		quotes: Arc<dyn AggregatorTrait>,
		providers: Arc<ProviderRegistry>,
		routing: RoutingSettings,
		quote_settings: &QuoteSettings,
	) -> Self {
		Self {
			assets,
			quotes,
			providers,
			matrix: RouteMatrix::default(),
			routing,
			allowed_families: quote_settings.allowed_families.clone(),
		}
	}

	pub fn with_matrix(mut self, matrix: RouteMatrix) -> Self {
		self.matrix = matrix;
		self
	}

	/// Build a validated plan for the request
	pub async fn plan(&self, request: &RoutePlanRequest) -> RoutePlanResult<RoutePlan> {
		let from = self
			.assets
			.resolve(&request.from_token_id, &request.from_network_id)
			.map_err(|e| QuoteError::from_asset(e, Side::From))?;
		let to = self
			.assets
			.resolve(&request.to_token_id, &request.to_network_id)
			.map_err(|e| QuoteError::from_asset(e, Side::To))?;

		let amount = to_base_units(&request.amount, from.decimals).map_err(|e| {
			QuoteError::InvalidAmount {
				reason: e.to_string(),
			}
		})?;
		if amount.is_zero() {
			return Err(QuoteError::InvalidAmount {
				reason: "amount must be greater than zero".to_string(),
			}
			.into());
		}

		let (via_hub, legs) = if from.family == to.family {
			let kind = if from.network_id == to.network_id {
				StepKind::Swap
			} else {
				StepKind::Bridge
			};
			(None, vec![PlannedLeg { kind, from, to }])
		} else {
			self.cross_family_legs(&from, &to)?
		};

		let plan = self.quote_legs(request, amount, via_hub, legs).await?;

		let missing = plan.missing_wallets(&request.wallets);
		if !missing.is_empty() {
			warn!(
				"Route plan {} requires wallets {:?}; missing {:?}",
				plan.id, plan.required_wallets, missing
			);
			return Err(RoutePlanError::WalletMissing {
				required: plan.required_wallets,
				missing,
			});
		}
		Ok(plan)
	}

	/// Legs for a cross-family pair, validated against the matrix and registry
	fn cross_family_legs(
		&self,
		from: &ResolvedToken,
		to: &ResolvedToken,
	) -> RoutePlanResult<(Option<String>, Vec<PlannedLeg>)> {
		let rule = self
			.matrix
			.lookup(from.family, to.family)
			.ok_or(RoutePlanError::NoRoute {
				from: from.family,
				to: to.family,
			})?;

		let source_bridge = self.bridge_token(&from.network_id, from.family, Side::From)?;
		let destination_bridge = self.bridge_token(&to.network_id, to.family, Side::To)?;

		let mut legs = Vec::new();
		if source_bridge.token_id != from.token_id {
			legs.push(self.swap_leg(from.clone(), source_bridge.clone()));
		}

		let no_route = || RoutePlanError::NoRoute {
			from: from.family,
			to: to.family,
		};
		let first_hop = rule.legs.first().copied().ok_or_else(no_route)?;
		let via_hub = if rule.via_hub {
			let second_hop = rule.legs.get(1).copied().ok_or_else(no_route)?;
			let hub = self.routing.evm_hub.clone();
			let hub_bridge = self.bridge_token(&hub, Family::Evm, Side::To)?;
			legs.push(hop(first_hop, source_bridge, hub_bridge.clone()));
			legs.push(hop(second_hop, hub_bridge, destination_bridge.clone()));
			Some(hub)
		} else {
			legs.push(hop(first_hop, source_bridge, destination_bridge.clone()));
			None
		};

		if destination_bridge.token_id != to.token_id {
			legs.push(self.swap_leg(destination_bridge, to.clone()));
		}

		let missing: Vec<String> = legs
			.iter()
			.filter(|leg| {
				leg.kind == StepKind::Bridge
					&& !self.providers.has_bridge(leg.from.family, leg.to.family)
			})
			.map(PlannedLeg::describe)
			.collect();
		if !missing.is_empty() {
			warn!("No adapter available for {:?}", missing);
			let trail = legs
				.iter()
				.enumerate()
				.map(|(index, leg)| leg.attempt(index, LegStatus::NotAttempted))
				.collect();
			return Err(RoutePlanError::AdapterMissing { missing, trail });
		}

		debug!(
			"Planned {} legs for {} -> {}{}",
			legs.len(),
			from.family,
			to.family,
			via_hub
				.as_deref()
				.map(|hub| format!(" via {}", hub))
				.unwrap_or_default()
		);
		Ok((via_hub, legs))
	}

	fn bridge_token(
		&self,
		network_id: &str,
		family: Family,
		side: Side,
	) -> RoutePlanResult<ResolvedToken> {
		let token_id = self.routing.bridge_token_for(network_id, family);
		self.assets
			.resolve(&token_id, network_id)
			.map_err(|e| QuoteError::from_asset(e, side).into())
	}

	/// Swaps on families the orchestrator does not quote are offchain
	fn swap_leg(&self, from: ResolvedToken, to: ResolvedToken) -> PlannedLeg {
		let kind = if self.allowed_families.contains(&from.family) {
			StepKind::Swap
		} else {
			StepKind::OffchainSwap
		};
		PlannedLeg { kind, from, to }
	}

	async fn quote_legs(
		&self,
		request: &RoutePlanRequest,
		amount: BaseAmount,
		via_hub: Option<String>,
		legs: Vec<PlannedLeg>,
	) -> RoutePlanResult<RoutePlan> {
		let mut steps = Vec::with_capacity(legs.len());
		let mut trail = Vec::with_capacity(legs.len());
		let mut warnings = Vec::new();
		let mut carried = Some(amount);

		for (index, leg) in legs.iter().enumerate() {
			if leg.is_offchain() {
				let message = format!(
					"Step {} ({}) has no integrated adapter and must be completed off-platform",
					index + 1,
					leg.describe()
				);
				warnings.push(message.clone());
				let mut attempt = leg.attempt(index, LegStatus::Offchain);
				attempt.message = Some(message);
				trail.push(attempt);
				steps.push(unquoted_step(index, leg, carried.take(), false));
				continue;
			}

			let Some(amount_in) = carried.take() else {
				warnings.push(format!(
					"Step {} ({}) cannot be estimated until the preceding offchain step completes",
					index + 1,
					leg.describe()
				));
				trail.push(leg.attempt(index, LegStatus::Unquoted));
				steps.push(unquoted_step(index, leg, None, true));
				continue;
			};

			let quote_request =
				ResolvedQuoteRequest::new(leg.from.clone(), leg.to.clone(), amount_in.clone())
					.with_user(request.wallet(leg.from.family).map(str::to_string))
					.with_recipient(
						(leg.to.family != leg.from.family)
							.then(|| request.wallet(leg.to.family).map(str::to_string))
							.flatten(),
					)
					.with_slippage_bps(request.slippage_bps);

			match self.quotes.quote_resolved(quote_request).await {
				Ok(quote) => {
					debug!(
						"Leg {} ({}) quoted by {}: {}",
						index,
						leg.describe(),
						quote.provider(),
						quote.out_amount
					);
					let mut attempt = leg.attempt(index, LegStatus::Quoted);
					attempt.provider = Some(quote.provider().to_string());
					trail.push(attempt);
					carried = Some(quote.quote.to_amount.clone());
					warnings.extend(quote.warnings.iter().cloned());
					steps.push(quoted_step(index, leg, amount_in, quote));
				},
				Err(error) => {
					warn!("Leg {} ({}) failed: {}", index, leg.describe(), error);
					let mut attempt = leg.attempt(index, LegStatus::Failed);
					attempt.error_code = Some(error.code());
					attempt.message = Some(error.to_string());
					trail.push(attempt);
					trail.extend(
						legs.iter()
							.enumerate()
							.skip(index + 1)
							.map(|(later, leg)| leg.attempt(later, LegStatus::NotAttempted)),
					);
					let missing_adapters = if leg.kind == StepKind::Bridge {
						vec![leg.describe()]
					} else {
						Vec::new()
					};
					return Err(RoutePlanError::LegFailed {
						leg: index,
						error,
						trail,
						missing_adapters,
					});
				},
			}
		}

		let (estimated_output, estimated_output_base) = match (carried, steps.last()) {
			(Some(output), Some(last)) => (
				Some(output.to_decimal_string(last.to.decimals)),
				Some(output),
			),
			_ => (None, None),
		};
		let is_indicative = estimated_output.is_none() || steps.iter().any(|s| s.is_indicative);
		let (from_family, to_family) = match (steps.first(), steps.last()) {
			(Some(first), Some(last)) => (first.from.family, last.to.family),
			_ => (Family::Unsupported, Family::Unsupported),
		};

		let plan = RoutePlan {
			id: Uuid::new_v4().to_string(),
			from_family,
			to_family,
			via_hub,
			required_wallets: RoutePlan::wallets_for(&steps),
			steps,
			warnings,
			estimated_output,
			estimated_output_base,
			is_indicative,
			created_at: Utc::now(),
		};
		info!(
			"Built route plan {} ({} -> {}, {} steps, indicative: {})",
			plan.id,
			plan.from_family,
			plan.to_family,
			plan.steps.len(),
			plan.is_indicative
		);
		Ok(plan)
	}
}

fn hop(template: LegTemplate, from: ResolvedToken, to: ResolvedToken) -> PlannedLeg {
	let kind = match template {
		LegTemplate::Bridge => StepKind::Bridge,
		LegTemplate::Offchain => StepKind::OffchainSwap,
	};
	PlannedLeg { kind, from, to }
}

fn quoted_step(
	index: usize,
	leg: &PlannedLeg,
	amount_in: BaseAmount,
	quote: AggregatedQuote,
) -> RouteStep {
	RouteStep {
		index,
		kind: leg.kind,
		from: StepEndpoint::from(&leg.from),
		to: StepEndpoint::from(&leg.to),
		amount_in: Some(amount_in.to_decimal_string(leg.from.decimals)),
		amount_in_base: Some(amount_in),
		estimated_out: Some(quote.out_amount.clone()),
		estimated_out_base: Some(quote.quote.to_amount.clone()),
		provider: Some(quote.provider().to_string()),
		is_indicative: quote.is_indicative(),
		warnings: quote.warnings.clone(),
		wallets_required: leg.wallets(),
		implemented: true,
		quote: Some(quote.quote),
	}
}

/// Step without an estimate: offchain, or after an offchain step
fn unquoted_step(
	index: usize,
	leg: &PlannedLeg,
	amount_in: Option<BaseAmount>,
	implemented: bool,
) -> RouteStep {
	RouteStep {
		index,
		kind: leg.kind,
		from: StepEndpoint::from(&leg.from),
		to: StepEndpoint::from(&leg.to),
		amount_in: amount_in
			.as_ref()
			.map(|amount| amount.to_decimal_string(leg.from.decimals)),
		amount_in_base: amount_in,
		estimated_out: None,
		estimated_out_base: None,
		provider: None,
		quote: None,
		wallets_required: leg.wallets(),
		implemented,
		is_indicative: true,
		warnings: Vec::new(),
	}
}
