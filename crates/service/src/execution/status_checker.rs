//! Chain confirmation checks
//!
//! One lookup per family: receipt status on EVM, signature status on Solana,
//! and a transaction lookup on TON and TRON.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use xswap_adapters::fields::{first, lookup, pick_bool, pick_string};
use xswap_types::{ExecutionError, ExecutionResult, Family};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainTxStatus {
	/// Not yet visible or not yet final
	Pending,
	Confirmed,
	Failed(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainStatusChecker: Send + Sync {
	async fn check(
		&self,
		family: Family,
		network_id: &str,
		tx_hash: &str,
	) -> ExecutionResult<ChainTxStatus>;
}

/// Status checker backed by per-network RPC endpoints
#[derive(Debug, Clone)]
pub struct RpcStatusChecker {
	client: reqwest::Client,
	endpoints: HashMap<String, String>,
}

impl RpcStatusChecker {
	pub fn new(endpoints: HashMap<String, String>, timeout: Duration) -> ExecutionResult<Self> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| status_error(format!("failed to build RPC client: {}", e)))?;
		Ok(Self { client, endpoints })
	}

	fn endpoint(&self, network_id: &str) -> ExecutionResult<&str> {
		self.endpoints
			.get(network_id)
			.map(|url| url.trim_end_matches('/'))
			.ok_or_else(|| status_error(format!("no RPC endpoint configured for {}", network_id)))
	}

	async fn json_rpc(&self, url: &str, method: &str, params: Value) -> ExecutionResult<Value> {
		let body = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
		let response: Value = self.post(url, &body).await?;
		if let Some(error) = lookup(&response, "error") {
			return Err(status_error(format!("{} failed: {}", method, error)));
		}
		Ok(response.get("result").cloned().unwrap_or(Value::Null))
	}

	async fn post(&self, url: &str, body: &Value) -> ExecutionResult<Value> {
		let response = self
			.client
			.post(url)
			.json(body)
			.send()
			.await
			.map_err(|e| status_error(e.to_string()))?;
		if !response.status().is_success() {
			return Err(status_error(format!("HTTP {} from {}", response.status(), url)));
		}
		response
			.json()
			.await
			.map_err(|e| status_error(format!("invalid RPC response: {}", e)))
	}
}

#[async_trait]
impl ChainStatusChecker for RpcStatusChecker {
	async fn check(
		&self,
		family: Family,
		network_id: &str,
		tx_hash: &str,
	) -> ExecutionResult<ChainTxStatus> {
		let url = self.endpoint(network_id)?;
		debug!("Checking {} transaction {} on {}", family, tx_hash, network_id);

		match family {
			Family::Evm => {
				let receipt = self
					.json_rpc(url, "eth_getTransactionReceipt", json!([tx_hash]))
					.await?;
				Ok(evm_receipt_status(&receipt))
			},
			Family::Solana => {
				let result = self
					.json_rpc(
						url,
						"getSignatureStatuses",
						json!([[tx_hash], {"searchTransactionHistory": true}]),
					)
					.await?;
				Ok(solana_signature_status(&result))
			},
			Family::Ton => {
				let response = self
					.client
					.get(format!("{}/transactions", url))
					.query(&[("hash", tx_hash), ("limit", "1")])
					.send()
					.await
					.map_err(|e| status_error(e.to_string()))?;
				if !response.status().is_success() {
					return Err(status_error(format!("HTTP {} from TON indexer", response.status())));
				}
				let body: Value = response
					.json()
					.await
					.map_err(|e| status_error(format!("invalid TON response: {}", e)))?;
				Ok(ton_transaction_status(&body))
			},
			Family::Tron => {
				let info = self
					.post(
						&format!("{}/wallet/gettransactioninfobyid", url),
						&json!({"value": tx_hash}),
					)
					.await?;
				Ok(tron_transaction_status(&info))
			},
			Family::Unsupported => Err(status_error(format!(
				"cannot check transactions on {}",
				network_id
			))),
		}
	}
}

fn status_error(reason: impl Into<String>) -> ExecutionError {
	ExecutionError::StatusCheck {
		reason: reason.into(),
	}
}

/// A null receipt is still pending; status 0x1 succeeded
fn evm_receipt_status(receipt: &Value) -> ChainTxStatus {
	if receipt.is_null() {
		return ChainTxStatus::Pending;
	}
	match pick_string(receipt, &["status"]).as_deref() {
		Some("0x1") | Some("1") => ChainTxStatus::Confirmed,
		Some("0x0") | Some("0") => ChainTxStatus::Failed("transaction reverted".to_string()),
		_ => ChainTxStatus::Pending,
	}
}

fn solana_signature_status(result: &Value) -> ChainTxStatus {
	let Some(status) = lookup(result, "value.0") else {
		return ChainTxStatus::Pending;
	};
	if let Some(error) = lookup(status, "err") {
		return ChainTxStatus::Failed(format!("transaction failed: {}", error));
	}
	match pick_string(status, &["confirmationStatus"]).as_deref() {
		Some("confirmed") | Some("finalized") => ChainTxStatus::Confirmed,
		_ => ChainTxStatus::Pending,
	}
}

fn ton_transaction_status(body: &Value) -> ChainTxStatus {
	let Some(transaction) = lookup(body, "transactions.0") else {
		return ChainTxStatus::Pending;
	};
	if pick_bool(transaction, &["description.aborted"]) == Some(true) {
		return ChainTxStatus::Failed("transaction aborted".to_string());
	}
	if pick_bool(transaction, &["description.compute_ph.success"]) == Some(false) {
		return ChainTxStatus::Failed("compute phase failed".to_string());
	}
	ChainTxStatus::Confirmed
}

/// An empty object means the node has not seen the transaction yet
fn tron_transaction_status(info: &Value) -> ChainTxStatus {
	if first(info, &["id", "blockNumber"]).is_none() {
		return ChainTxStatus::Pending;
	}
	match pick_string(info, &["receipt.result", "result"]).as_deref() {
		None | Some("SUCCESS") => ChainTxStatus::Confirmed,
		Some(result) => ChainTxStatus::Failed(format!("transaction failed: {}", result)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_evm_receipts() {
		assert_eq!(evm_receipt_status(&Value::Null), ChainTxStatus::Pending);
		assert_eq!(
			evm_receipt_status(&json!({"status": "0x1", "blockNumber": "0x10"})),
			ChainTxStatus::Confirmed
		);
		assert!(matches!(
			evm_receipt_status(&json!({"status": "0x0"})),
			ChainTxStatus::Failed(_)
		));
	}

	#[test]
	fn test_solana_signature_statuses() {
		assert_eq!(
			solana_signature_status(&json!({"value": [null]})),
			ChainTxStatus::Pending
		);
		assert_eq!(
			solana_signature_status(&json!({"value": [{"confirmationStatus": "processed", "err": null}]})),
			ChainTxStatus::Pending
		);
		assert_eq!(
			solana_signature_status(&json!({"value": [{"confirmationStatus": "finalized", "err": null}]})),
			ChainTxStatus::Confirmed
		);
		assert!(matches!(
			solana_signature_status(&json!({"value": [{"confirmationStatus": "confirmed", "err": {"InstructionError": [0, "Custom"]}}]})),
			ChainTxStatus::Failed(_)
		));
	}

	#[test]
	fn test_ton_lookup() {
		assert_eq!(
			ton_transaction_status(&json!({"transactions": []})),
			ChainTxStatus::Pending
		);
		assert_eq!(
			ton_transaction_status(&json!({"transactions": [{"description": {"aborted": false, "compute_ph": {"success": true}}}]})),
			ChainTxStatus::Confirmed
		);
		assert!(matches!(
			ton_transaction_status(&json!({"transactions": [{"description": {"aborted": true}}]})),
			ChainTxStatus::Failed(_)
		));
	}

	#[test]
	fn test_tron_lookup() {
		assert_eq!(tron_transaction_status(&json!({})), ChainTxStatus::Pending);
		assert_eq!(
			tron_transaction_status(&json!({"id": "abc", "blockNumber": 5, "receipt": {"result": "SUCCESS"}})),
			ChainTxStatus::Confirmed
		);
		assert!(matches!(
			tron_transaction_status(&json!({"id": "abc", "receipt": {"result": "OUT_OF_ENERGY"}})),
			ChainTxStatus::Failed(_)
		));
	}

	#[tokio::test]
	async fn test_unconfigured_network_is_a_status_error() {
		let checker = RpcStatusChecker::new(HashMap::new(), Duration::from_secs(1)).unwrap();
		let error = checker
			.check(Family::Evm, "ethereum", "0xhash")
			.await
			.unwrap_err();
		assert!(matches!(error, ExecutionError::StatusCheck { .. }));
	}
}
