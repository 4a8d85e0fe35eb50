//! Base-unit amounts and decimal conversion
//!
//! Amounts travel through the system as decimal strings so arbitrarily large
//! base-unit values (wei, lamports, nanotons) keep full precision. Conversion
//! between human-readable and base-unit strings is pure digit manipulation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
	#[error("amount is empty")]
	Empty,
	#[error("amount must not be negative: {0}")]
	Negative(String),
	#[error("invalid decimal amount: {0}")]
	InvalidFormat(String),
}

/// Integer amount in a token's smallest denomination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseAmount(String);

impl BaseAmount {
	/// Parse and canonicalize (strip leading zeros) a base-unit string
	pub fn parse(value: &str) -> Result<Self, AmountError> {
		let value = value.trim();
		if value.is_empty() {
			return Err(AmountError::Empty);
		}
		if value.starts_with('-') {
			return Err(AmountError::Negative(value.to_string()));
		}
		if !value.chars().all(|c| c.is_ascii_digit()) {
			return Err(AmountError::InvalidFormat(value.to_string()));
		}
		Ok(Self(strip_leading_zeros(value)))
	}

	pub fn zero() -> Self {
		Self("0".to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_zero(&self) -> bool {
		self.0 == "0"
	}

	/// Human-readable rendering under the given decimals
	pub fn to_decimal_string(&self, decimals: u8) -> String {
		// Always canonical digits, so formatting cannot fail
		format_units(&self.0, decimals)
	}

	/// Lossy float view used only by heuristics, never for settlement math
	pub fn to_f64(&self, decimals: u8) -> f64 {
		self.to_decimal_string(decimals).parse().unwrap_or(0.0)
	}
}

impl fmt::Display for BaseAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<u64> for BaseAmount {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

impl From<u128> for BaseAmount {
	fn from(value: u128) -> Self {
		Self(value.to_string())
	}
}

impl Serialize for BaseAmount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for BaseAmount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		BaseAmount::parse(&value).map_err(serde::de::Error::custom)
	}
}

/// Convert a human-readable decimal amount into base units.
///
/// Fractional digits beyond `decimals` are truncated (rounded toward zero).
pub fn to_base_units(amount: &str, decimals: u8) -> Result<BaseAmount, AmountError> {
	let amount = amount.trim();
	if amount.is_empty() {
		return Err(AmountError::Empty);
	}
	if amount.starts_with('-') {
		return Err(AmountError::Negative(amount.to_string()));
	}

	let (int_part, frac_part) = match amount.split_once('.') {
		Some((int_part, frac_part)) => (int_part, frac_part),
		None => (amount, ""),
	};

	let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
	if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
	{
		return Err(AmountError::InvalidFormat(amount.to_string()));
	}

	let decimals = decimals as usize;
	let mut digits = String::with_capacity(int_part.len() + decimals);
	digits.push_str(int_part);
	if frac_part.len() >= decimals {
		digits.push_str(&frac_part[..decimals]);
	} else {
		digits.push_str(frac_part);
		digits.extend(std::iter::repeat('0').take(decimals - frac_part.len()));
	}

	Ok(BaseAmount(strip_leading_zeros(&digits)))
}

/// Convert a base-unit integer string into a human-readable decimal string
/// with trailing fractional zeros removed.
pub fn from_base_units(base: &str, decimals: u8) -> Result<String, AmountError> {
	let amount = BaseAmount::parse(base)?;
	Ok(format_units(amount.as_str(), decimals))
}

fn format_units(digits: &str, decimals: u8) -> String {
	let decimals = decimals as usize;
	if decimals == 0 {
		return digits.to_string();
	}

	let padded = if digits.len() <= decimals {
		format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
	} else {
		digits.to_string()
	};

	let split = padded.len() - decimals;
	let (int_part, frac_part) = padded.split_at(split);
	let frac_part = frac_part.trim_end_matches('0');

	if frac_part.is_empty() {
		int_part.to_string()
	} else {
		format!("{}.{}", int_part, frac_part)
	}
}

fn strip_leading_zeros(digits: &str) -> String {
	let stripped = digits.trim_start_matches('0');
	if stripped.is_empty() {
		"0".to_string()
	} else {
		stripped.to_string()
	}
}
