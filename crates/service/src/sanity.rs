//! Quote sanity checks
//!
//! Provider quotes are compared against the input using registry decimals.
//! Stable-value pairs (same normalized symbol, or stablecoin to stablecoin)
//! must land inside a ratio band; anything outside is a provider bug, not a
//! price.

use xswap_config::SanitySettings;
use xswap_types::{normalize_symbol, QuoteError, QuoteResult, ResolvedToken};

/// How a pair is expected to price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairClass {
	/// Both sides are stablecoins
	Stable,
	/// Same asset on both sides (e.g. ETH -> WETH on another chain)
	SameSymbol,
	/// Unrelated assets; only the zero-output check applies
	Unrelated,
}

impl PairClass {
	pub fn of(from: &ResolvedToken, to: &ResolvedToken) -> Self {
		if from.is_stablecoin && to.is_stablecoin {
			PairClass::Stable
		} else if normalize_symbol(&from.symbol) == normalize_symbol(&to.symbol) {
			PairClass::SameSymbol
		} else {
			PairClass::Unrelated
		}
	}
}

#[derive(Debug, Clone)]
pub struct QuoteSanityChecker {
	settings: SanitySettings,
}

impl QuoteSanityChecker {
	pub fn new(settings: SanitySettings) -> Self {
		Self { settings }
	}

	pub fn settings(&self) -> &SanitySettings {
		&self.settings
	}

	/// Accept or reject a provider quote. Accepted quotes may come back with
	/// warnings when they sit in the soft band.
	pub fn check(
		&self,
		from: &ResolvedToken,
		to: &ResolvedToken,
		quote: &QuoteResult,
	) -> Result<Vec<String>, QuoteError> {
		let provider = quote.provider.clone();
		if quote.to_amount.is_zero() {
			return Err(QuoteError::SuspiciousQuote {
				provider,
				ratio: 0.0,
			});
		}

		let class = PairClass::of(from, to);
		if class == PairClass::Unrelated {
			return Ok(Vec::new());
		}

		let amount_in = quote.from_amount.to_f64(from.decimals);
		let amount_out = quote.to_amount.to_f64(to.decimals);
		if amount_in <= 0.0 {
			return Err(QuoteError::SuspiciousQuote {
				provider,
				ratio: 0.0,
			});
		}
		let ratio = amount_out / amount_in;

		let mismatch = self.settings.decimals_mismatch_ratio;
		if ratio > mismatch || ratio < 1.0 / mismatch {
			return Err(QuoteError::DecimalsMismatchSuspected { provider, ratio });
		}

		let (min, max, soft) = match class {
			PairClass::Stable => (
				self.settings.stablecoin_min_ratio,
				self.settings.stablecoin_max_ratio,
				self.settings.stablecoin_suspicious_below_ratio,
			),
			_ => (
				self.settings.same_symbol_min_ratio,
				self.settings.same_symbol_max_ratio,
				self.settings.suspicious_below_ratio,
			),
		};

		if ratio > max {
			return Err(QuoteError::SuspiciousQuoteHighOutput { provider, ratio });
		}
		if ratio < min {
			return Err(QuoteError::SuspiciousQuote { provider, ratio });
		}
		if ratio < soft {
			return Ok(vec![format!(
				"Output is {:.2}% of input for a {} -> {} swap; check fees before signing",
				ratio * 100.0,
				from.symbol,
				to.symbol
			)]);
		}
		Ok(Vec::new())
	}
}

impl Default for QuoteSanityChecker {
	fn default() -> Self {
		Self::new(SanitySettings::default())
	}
}
