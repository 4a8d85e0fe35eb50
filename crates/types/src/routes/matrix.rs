//! Static family-to-family routing matrix

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Family;

/// Cross-family hop shape inside a rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegTemplate {
	/// Bridge through a registered adapter
	Bridge,
	/// No adapter exists; the user completes this hop off-platform
	Offchain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
	pub via_hub: bool,
	/// Cross-family hops in order; two hops always pass through the hub
	pub legs: Vec<LegTemplate>,
	pub supported: bool,
}

impl RouteRule {
	fn direct(leg: LegTemplate) -> Self {
		Self {
			via_hub: false,
			legs: vec![leg],
			supported: true,
		}
	}

	fn via_hub(first: LegTemplate, second: LegTemplate) -> Self {
		Self {
			via_hub: true,
			legs: vec![first, second],
			supported: true,
		}
	}

	fn unsupported() -> Self {
		Self {
			via_hub: false,
			legs: Vec::new(),
			supported: false,
		}
	}
}

#[derive(Debug, Clone)]
pub struct RouteMatrix {
	rules: HashMap<(Family, Family), RouteRule>,
}

impl RouteMatrix {
	pub fn empty() -> Self {
		Self {
			rules: HashMap::new(),
		}
	}

	pub fn with_rule(mut self, from: Family, to: Family, rule: RouteRule) -> Self {
		self.rules.insert((from, to), rule);
		self
	}

	/// Rule for a cross-family pair; `None` means no route
	pub fn lookup(&self, from: Family, to: Family) -> Option<&RouteRule> {
		self.rules.get(&(from, to)).filter(|rule| rule.supported)
	}
}

impl Default for RouteMatrix {
	fn default() -> Self {
		use Family::*;
		use LegTemplate::*;

		Self::empty()
			.with_rule(Evm, Solana, RouteRule::direct(Bridge))
			.with_rule(Solana, Evm, RouteRule::direct(Bridge))
			.with_rule(Evm, Ton, RouteRule::direct(Offchain))
			.with_rule(Ton, Evm, RouteRule::direct(Offchain))
			.with_rule(Evm, Tron, RouteRule::direct(Offchain))
			.with_rule(Tron, Evm, RouteRule::direct(Offchain))
			.with_rule(Solana, Tron, RouteRule::direct(Offchain))
			.with_rule(Tron, Solana, RouteRule::direct(Offchain))
			.with_rule(Solana, Ton, RouteRule::via_hub(Bridge, Offchain))
			.with_rule(Ton, Solana, RouteRule::via_hub(Offchain, Bridge))
			.with_rule(Ton, Tron, RouteRule::unsupported())
			.with_rule(Tron, Ton, RouteRule::unsupported())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_matrix_is_symmetric_in_support() {
		let matrix = RouteMatrix::default();
		for from in Family::ROUTABLE {
			for to in Family::ROUTABLE {
				if from == to {
					continue;
				}
				assert_eq!(
					matrix.lookup(from, to).is_some(),
					matrix.lookup(to, from).is_some(),
					"{} <-> {}",
					from,
					to
				);
			}
		}
	}

	#[test]
	fn test_hub_rules() {
		let matrix = RouteMatrix::default();
		let rule = matrix.lookup(Family::Solana, Family::Ton).unwrap();
		assert!(rule.via_hub);
		assert_eq!(rule.legs, vec![LegTemplate::Bridge, LegTemplate::Offchain]);

		assert!(matrix.lookup(Family::Ton, Family::Tron).is_none());
		assert!(matrix.lookup(Family::Evm, Family::Unsupported).is_none());
	}
}
