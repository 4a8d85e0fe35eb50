//! Unsigned transaction construction
//!
//! Providers attach their ready-to-sign payload to the quote in whatever
//! shape their API uses. This module pulls out the fields each family's
//! wallet needs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use std::collections::BTreeMap;
use xswap_adapters::fields::{first, pick_string, pick_u64};
use xswap_types::{ExecutionError, ExecutionResult, Family, RouteStep, TonMessage, UnsignedTransaction};

/// Build the unsigned transaction for one plan step
pub fn build_unsigned_transaction(
	step: &RouteStep,
	wallets: &BTreeMap<Family, String>,
) -> ExecutionResult<UnsignedTransaction> {
	if !step.implemented {
		return Err(ExecutionError::build(format!(
			"step {} is an offchain swap with no executable transaction",
			step.index
		)));
	}
	let quote = step.quote.as_ref().ok_or_else(|| {
		ExecutionError::build(format!("step {} has no quote to execute", step.index))
	})?;
	let payload = quote.transaction.as_ref().ok_or_else(|| {
		ExecutionError::build(format!(
			"provider {} returned no transaction for step {}",
			quote.provider, step.index
		))
	})?;

	let family = step.from.family;
	let signer = wallets
		.get(&family)
		.map(|address| address.trim())
		.filter(|address| !address.is_empty())
		.ok_or(ExecutionError::WalletMissing {
			missing: vec![family],
		})?
		.to_string();

	match family {
		Family::Evm => evm_transaction(step, payload, signer),
		Family::Solana => solana_transaction(payload, signer),
		Family::Ton => ton_transaction(payload, signer),
		Family::Tron => tron_transaction(payload, signer),
		Family::Unsupported => Err(ExecutionError::build(format!(
			"network {} has no transaction format",
			step.from.network_id
		))),
	}
}

/// EVM call, read from `tx`, then `transactionRequest`, then the top level
fn evm_transaction(
	step: &RouteStep,
	payload: &Value,
	signer: String,
) -> ExecutionResult<UnsignedTransaction> {
	let tx = first(payload, &["tx", "transactionRequest"]).unwrap_or(payload);

	let to = pick_string(tx, &["to"])
		.ok_or_else(|| ExecutionError::build("EVM transaction has no target address"))?;
	let data = pick_string(tx, &["data", "input", "calldata"]).unwrap_or_else(|| "0x".to_string());
	let value = match pick_string(tx, &["value"]) {
		Some(value) => quantity_to_decimal(&value)?,
		None => "0".to_string(),
	};
	let gas_limit = pick_string(tx, &["gasLimit", "gas"])
		.map(|gas| quantity_to_decimal(&gas))
		.transpose()?;
	let chain_id = step
		.from
		.chain_id
		.or_else(|| pick_u64(tx, &["chainId"]))
		.ok_or_else(|| ExecutionError::build("EVM transaction has no chain id"))?;

	Ok(UnsignedTransaction::Evm {
		chain_id,
		from: signer,
		to,
		data,
		value,
		gas_limit,
	})
}

/// Base64 versioned transaction; hex payloads are re-encoded
fn solana_transaction(payload: &Value, signer: String) -> ExecutionResult<UnsignedTransaction> {
	let encoded = match payload {
		Value::String(encoded) => Some(encoded.trim().to_string()),
		_ => pick_string(
			payload,
			&["swapTransaction", "transaction", "serializedTransaction", "data", "tx.data"],
		),
	}
	.filter(|encoded| !encoded.is_empty())
	.ok_or_else(|| ExecutionError::build("Solana payload has no serialized transaction"))?;

	let transaction = match encoded.strip_prefix("0x") {
		Some(hex_body) => {
			let bytes = hex::decode(hex_body)
				.map_err(|e| ExecutionError::build(format!("invalid hex transaction: {}", e)))?;
			STANDARD.encode(bytes)
		},
		None => {
			STANDARD
				.decode(&encoded)
				.map_err(|e| ExecutionError::build(format!("invalid base64 transaction: {}", e)))?;
			encoded
		},
	};

	Ok(UnsignedTransaction::Solana {
		signer,
		transaction,
	})
}

fn ton_transaction(payload: &Value, signer: String) -> ExecutionResult<UnsignedTransaction> {
	let raw_messages = first(payload, &["messages", "tx.messages"])
		.and_then(Value::as_array)
		.ok_or_else(|| ExecutionError::build("TON payload has no messages"))?;

	let messages = raw_messages
		.iter()
		.map(|message| {
			let address = pick_string(message, &["address", "to"])
				.ok_or_else(|| ExecutionError::build("TON message has no destination"))?;
			let amount = pick_string(message, &["amount", "value"])
				.ok_or_else(|| ExecutionError::build("TON message has no amount"))?;
			Ok(TonMessage {
				address,
				amount: quantity_to_decimal(&amount)?,
				payload: pick_string(message, &["payload", "body"]),
			})
		})
		.collect::<ExecutionResult<Vec<_>>>()?;
	if messages.is_empty() {
		return Err(ExecutionError::build("TON payload has no messages"));
	}

	Ok(UnsignedTransaction::Ton {
		signer,
		messages,
		valid_until: pick_u64(payload, &["validUntil", "valid_until"]).map(|v| v as i64),
	})
}

fn tron_transaction(payload: &Value, signer: String) -> ExecutionResult<UnsignedTransaction> {
	let raw_data_hex = pick_string(payload, &["raw_data_hex", "transaction.raw_data_hex"]);
	let raw_data = first(payload, &["raw_data", "transaction.raw_data"]).cloned();
	if raw_data_hex.is_none() && raw_data.is_none() {
		return Err(ExecutionError::build("TRON payload has no raw transaction"));
	}
	Ok(UnsignedTransaction::Tron {
		signer,
		raw_data_hex,
		raw_data,
	})
}

/// Decimal string for a quantity given as decimal or 0x-prefixed hex
fn quantity_to_decimal(quantity: &str) -> ExecutionResult<String> {
	let quantity = quantity.trim();
	let parsed = match quantity
		.strip_prefix("0x")
		.or_else(|| quantity.strip_prefix("0X"))
	{
		Some("") => Ok(0),
		Some(hex_digits) => u128::from_str_radix(hex_digits, 16),
		None => quantity.parse::<u128>(),
	};
	parsed
		.map(|value| value.to_string())
		.map_err(|_| ExecutionError::build(format!("invalid quantity {:?}", quantity)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use xswap_types::{AssetRegistry, BaseAmount, QuoteResult, StepEndpoint, StepKind};

	const EVM_WALLET: &str = "0x1111111111111111111111111111111111111111";
	const SOLANA_WALLET: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

	fn step(from: (&str, &str), to: (&str, &str), payload: Option<Value>) -> RouteStep {
		let registry = AssetRegistry::builtin();
		let from = registry.resolve(from.0, from.1).unwrap();
		let to = registry.resolve(to.0, to.1).unwrap();
		let quote = QuoteResult::new("relay", BaseAmount::from(1_000u64), BaseAmount::from(990u64))
			.with_transaction(payload);
		RouteStep {
			index: 0,
			kind: StepKind::Bridge,
			from: StepEndpoint::from(&from),
			to: StepEndpoint::from(&to),
			amount_in: None,
			amount_in_base: None,
			estimated_out: None,
			estimated_out_base: None,
			provider: Some("relay".into()),
			quote: Some(quote),
			wallets_required: vec![from.family],
			implemented: true,
			is_indicative: false,
			warnings: vec![],
		}
	}

	fn wallets() -> BTreeMap<Family, String> {
		BTreeMap::from([
			(Family::Evm, EVM_WALLET.to_string()),
			(Family::Solana, SOLANA_WALLET.to_string()),
		])
	}

	#[test]
	fn test_evm_payload_locations_in_order() {
		let nested = step(
			("usdc", "ethereum"),
			("usdc", "base"),
			Some(json!({"tx": {"to": "0xdln", "data": "0xabcd", "value": "0x0de0b6b3a7640000"}})),
		);
		match build_unsigned_transaction(&nested, &wallets()).unwrap() {
			UnsignedTransaction::Evm {
				chain_id,
				from,
				to,
				value,
				..
			} => {
				assert_eq!(chain_id, 1);
				assert_eq!(from, EVM_WALLET);
				assert_eq!(to, "0xdln");
				assert_eq!(value, "1000000000000000000");
			},
			other => panic!("unexpected transaction: {:?}", other),
		}

		let lifi = step(
			("usdc", "ethereum"),
			("usdc", "base"),
			Some(json!({"transactionRequest": {"to": "0xlifi", "data": "0x01", "gasLimit": "0x5208"}})),
		);
		match build_unsigned_transaction(&lifi, &wallets()).unwrap() {
			UnsignedTransaction::Evm { to, gas_limit, value, .. } => {
				assert_eq!(to, "0xlifi");
				assert_eq!(gas_limit.as_deref(), Some("21000"));
				assert_eq!(value, "0");
			},
			other => panic!("unexpected transaction: {:?}", other),
		}

		let flat = step(
			("usdc", "ethereum"),
			("usdc", "base"),
			Some(json!({"to": "0xrelay", "data": "0x02", "value": "5"})),
		);
		assert!(matches!(
			build_unsigned_transaction(&flat, &wallets()).unwrap(),
			UnsignedTransaction::Evm { ref to, .. } if to == "0xrelay"
		));
	}

	#[test]
	fn test_solana_transaction_is_validated() {
		let jupiter = step(
			("sol", "solana"),
			("usdc", "solana"),
			Some(json!({"swapTransaction": "AQIDBA=="})),
		);
		assert_eq!(
			build_unsigned_transaction(&jupiter, &wallets()).unwrap(),
			UnsignedTransaction::Solana {
				signer: SOLANA_WALLET.to_string(),
				transaction: "AQIDBA==".to_string(),
			}
		);

		let dln = step(
			("usdc", "solana"),
			("usdc", "ethereum"),
			Some(json!({"data": "0x01020304"})),
		);
		match build_unsigned_transaction(&dln, &wallets()).unwrap() {
			UnsignedTransaction::Solana { transaction, .. } => assert_eq!(transaction, "AQIDBA=="),
			other => panic!("unexpected transaction: {:?}", other),
		}

		let garbage = step(
			("sol", "solana"),
			("usdc", "solana"),
			Some(json!({"transaction": "not base64!"})),
		);
		assert!(build_unsigned_transaction(&garbage, &wallets()).is_err());
	}

	#[test]
	fn test_ton_messages() {
		let mut ton = step(
			("usdt", "ton"),
			("ton", "ton"),
			Some(json!({"messages": [{"address": "EQabc", "amount": 1000000, "payload": "te6cc"}], "validUntil": 1700000000})),
		);
		ton.wallets_required = vec![Family::Ton];
		let mut wallets = wallets();
		wallets.insert(Family::Ton, "UQxyz".to_string());

		match build_unsigned_transaction(&ton, &wallets).unwrap() {
			UnsignedTransaction::Ton {
				messages,
				valid_until,
				..
			} => {
				assert_eq!(messages.len(), 1);
				assert_eq!(messages[0].amount, "1000000");
				assert_eq!(valid_until, Some(1_700_000_000));
			},
			other => panic!("unexpected transaction: {:?}", other),
		}
	}

	#[test]
	fn test_unbuildable_steps() {
		let mut offchain = step(("usdc", "solana"), ("usdt", "tron"), None);
		offchain.implemented = false;
		assert!(build_unsigned_transaction(&offchain, &wallets()).is_err());

		let indicative = step(("usdc", "ethereum"), ("usdc", "base"), None);
		assert!(build_unsigned_transaction(&indicative, &wallets()).is_err());

		let no_wallet = step(
			("usdc", "ethereum"),
			("usdc", "base"),
			Some(json!({"to": "0x1"})),
		);
		assert!(matches!(
			build_unsigned_transaction(&no_wallet, &BTreeMap::new()),
			Err(ExecutionError::WalletMissing { .. })
		));
	}

	#[test]
	fn test_quantity_conversion() {
		assert_eq!(quantity_to_decimal("0x10").unwrap(), "16");
		assert_eq!(quantity_to_decimal("0x").unwrap(), "0");
		assert_eq!(quantity_to_decimal("42").unwrap(), "42");
		assert!(quantity_to_decimal("-1").is_err());
	}
}
