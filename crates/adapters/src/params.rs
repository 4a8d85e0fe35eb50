//! Request parameters shared by several provider APIs

use xswap_types::{AdapterError, AdapterResult, Family, QuoteInput, ResolvedToken};

/// Native SOL in APIs that model it as the system program rather than wSOL
pub const SOLANA_SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

/// Sender to put on the wire.
///
/// The placeholder user is an EVM address; indicative quotes starting on
/// another family go out without a sender.
pub fn sender(input: &QuoteInput) -> Option<&str> {
	if input.indicative && !input.from.family.is_evm() {
		None
	} else {
		Some(input.user_address.as_str())
	}
}

/// Receiver to put on the wire; omitted when the sender's address cannot
/// be valid on the destination family.
pub fn receiver(input: &QuoteInput) -> Option<&str> {
	if let Some(recipient) = input.recipient.as_deref() {
		return Some(recipient);
	}
	if input.from.family == input.to.family {
		sender(input)
	} else {
		None
	}
}

/// Numeric chain id of an EVM token
pub fn evm_chain_id(token: &ResolvedToken) -> AdapterResult<u64> {
	match (token.family, token.chain_id) {
		(Family::Evm, Some(chain_id)) => Ok(chain_id),
		_ => Err(AdapterError::unsupported(format!(
			"{} is not an EVM network",
			token.network_id
		))),
	}
}

/// Chain id for providers that give Solana a synthetic numeric id
pub fn chain_id_with_solana(token: &ResolvedToken, solana_chain_id: u64) -> AdapterResult<u64> {
	match token.family {
		Family::Solana => Ok(solana_chain_id),
		_ => evm_chain_id(token),
	}
}

/// Token address with native SOL rewritten to the system program
pub fn system_program_native(token: &ResolvedToken) -> &str {
	if token.family == Family::Solana && token.is_native {
		SOLANA_SYSTEM_PROGRAM
	} else {
		&token.address
	}
}
