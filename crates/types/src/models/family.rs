//! Blockchain family classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Execution environment class of a network.
///
/// Families have incompatible addressing and transaction semantics, so a swap
/// whose endpoints belong to different families needs a multi-leg route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Family {
	Evm,
	Solana,
	Ton,
	Tron,
	Unsupported,
}

impl Family {
	/// All families that can carry a route step
	pub const ROUTABLE: [Family; 4] = [Family::Evm, Family::Solana, Family::Ton, Family::Tron];

	pub fn is_evm(&self) -> bool {
		matches!(self, Family::Evm)
	}

	pub fn is_supported(&self) -> bool {
		!matches!(self, Family::Unsupported)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Family::Evm => "EVM",
			Family::Solana => "SOLANA",
			Family::Ton => "TON",
			Family::Tron => "TRON",
			Family::Unsupported => "UNSUPPORTED",
		}
	}
}

impl fmt::Display for Family {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Family {
	type Err = std::convert::Infallible;

	/// Parsing never fails: anything unrecognised is `Unsupported`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.trim().to_ascii_uppercase().as_str() {
			"EVM" => Family::Evm,
			"SOLANA" | "SOL" => Family::Solana,
			"TON" => Family::Ton,
			"TRON" | "TRX" => Family::Tron,
			_ => Family::Unsupported,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_family_parsing_is_total() {
		assert_eq!("evm".parse::<Family>().unwrap(), Family::Evm);
		assert_eq!("Solana".parse::<Family>().unwrap(), Family::Solana);
		assert_eq!("TRX".parse::<Family>().unwrap(), Family::Tron);
		assert_eq!("cosmos".parse::<Family>().unwrap(), Family::Unsupported);
		assert_eq!("".parse::<Family>().unwrap(), Family::Unsupported);
	}

	#[test]
	fn test_family_serde_uses_screaming_case() {
		let json = serde_json::to_string(&Family::Solana).unwrap();
		assert_eq!(json, "\"SOLANA\"");
		let family: Family = serde_json::from_str("\"TON\"").unwrap();
		assert_eq!(family, Family::Ton);
	}
}
