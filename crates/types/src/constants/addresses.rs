//! Address conventions that differ between chain families

/// EVM native-token convention. Never valid outside the EVM family.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Non-zero EOA substituted when the caller supplies no user address.
/// Quotes built with it are indicative only.
pub const PLACEHOLDER_USER_ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";

/// Wrapped SOL mint, the representation of native SOL in swap APIs
pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Native TON representation used by TON DEX APIs
pub const TON_NATIVE_ADDRESS: &str = "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c";

/// Native TRX representation (base58 of the all-zero account)
pub const TRON_NATIVE_ADDRESS: &str = "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb";

pub fn is_zero_address(address: &str) -> bool {
	address.eq_ignore_ascii_case(ZERO_ADDRESS)
}

/// Wrapped-native token on an EVM chain, used by providers that cannot
/// route the native asset directly.
pub fn wrapped_native_address(chain_id: u64) -> Option<&'static str> {
	match chain_id {
		1 => Some("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
		42161 => Some("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
		10 | 8453 => Some("0x4200000000000000000000000000000000000006"),
		137 => Some("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
		56 => Some("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
		43114 => Some("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7"),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_zero_address_detection_is_case_insensitive() {
		assert!(is_zero_address(ZERO_ADDRESS));
		assert!(is_zero_address("0X0000000000000000000000000000000000000000"));
		assert!(!is_zero_address(PLACEHOLDER_USER_ADDRESS));
	}

	#[test]
	fn test_wrapped_native_lookup() {
		assert_eq!(
			wrapped_native_address(8453),
			Some("0x4200000000000000000000000000000000000006")
		);
		assert_eq!(wrapped_native_address(999_999), None);
	}
}
