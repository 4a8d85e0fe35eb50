//! Route planning E2E tests

mod mocks;

use serde_json::json;

use crate::mocks::{ApiFixtures, TestServer};
use reqwest::Client;
use xswap_aggregator::mocks::MockProviderAdapter;
use xswap_aggregator::Family;

#[tokio::test]
async fn test_same_family_route_is_a_single_quoted_step() {
	let server = TestServer::spawn_with_providers(&[(MockProviderAdapter::evm("alpha"), 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/routes"))
		.json(&ApiFixtures::route(
			"100",
			("usdc", "ethereum"),
			("usdc", "base"),
			json!({ "EVM": ApiFixtures::EVM_WALLET }),
		))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 200);
	let plan: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(plan["steps"].as_array().unwrap().len(), 1);
	assert_eq!(plan["steps"][0]["kind"], "BRIDGE");
	assert_eq!(plan["steps"][0]["provider"], "alpha");
	assert_eq!(plan["estimatedOutput"], "99.5");
	assert_eq!(plan["requiredWallets"], json!(["EVM"]));
	assert!(plan["viaHub"].is_null());

	server.abort();
}

#[tokio::test]
async fn test_solana_to_evm_threads_the_bridge_output_into_the_swap() {
	let bridge = MockProviderAdapter::new("bridge", vec![Family::Evm, Family::Solana]);
	let server = TestServer::spawn_with_providers(&[(bridge, 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/routes"))
		.json(&ApiFixtures::route(
			"100",
			("usdc", "solana"),
			("eth", "arbitrum"),
			json!({ "SOLANA": ApiFixtures::SOLANA_WALLET, "EVM": ApiFixtures::EVM_WALLET }),
		))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 200);
	let plan: serde_json::Value = resp.json().await.unwrap();
	let steps = plan["steps"].as_array().unwrap();
	assert_eq!(steps.len(), 2);
	assert_eq!(steps[0]["kind"], "BRIDGE");
	assert_eq!(steps[1]["kind"], "SWAP");
	// The swap consumes exactly what the bridge delivers
	assert_eq!(steps[1]["amountIn"], steps[0]["estimatedOut"]);
	assert_eq!(plan["estimatedOutput"], steps[1]["estimatedOut"]);

	server.abort();
}

#[tokio::test]
async fn test_solana_to_tron_is_an_offchain_step_without_estimate() {
	let server = TestServer::spawn()
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/routes"))
		.json(&ApiFixtures::route(
			"50",
			("usdc", "solana"),
			("usdt", "tron"),
			json!({ "SOLANA": ApiFixtures::SOLANA_WALLET, "TRON": ApiFixtures::TRON_WALLET }),
		))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 200);
	let plan: serde_json::Value = resp.json().await.unwrap();
	let step = &plan["steps"][0];
	assert_eq!(step["kind"], "OFFCHAIN_SWAP");
	assert_eq!(step["implemented"], false);
	assert!(step["estimatedOut"].is_null());
	assert!(plan["estimatedOutput"].is_null());
	assert_eq!(plan["isIndicative"], true);
	assert!(!plan["warnings"].as_array().unwrap().is_empty());

	server.abort();
}

#[tokio::test]
async fn test_missing_wallet_is_unprocessable() {
	let server = TestServer::spawn_with_providers(&[(MockProviderAdapter::evm("alpha"), 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/routes"))
		.json(&ApiFixtures::route(
			"100",
			("usdc", "ethereum"),
			("usdc", "base"),
			json!({}),
		))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 422);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "WALLET_MISSING_FOR_ROUTE");
	assert_eq!(body["details"]["missingWallets"], json!(["EVM"]));

	server.abort();
}

#[tokio::test]
async fn test_missing_bridge_adapter_is_reported_with_trail() {
	let server = TestServer::spawn_with_providers(&[(MockProviderAdapter::evm("alpha"), 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/routes"))
		.json(&ApiFixtures::route(
			"100",
			("usdc", "solana"),
			("usdc", "arbitrum"),
			json!({ "SOLANA": ApiFixtures::SOLANA_WALLET, "EVM": ApiFixtures::EVM_WALLET }),
		))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 404);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "ADAPTER_MISSING");
	assert!(!body["details"]["missingAdapters"].as_array().unwrap().is_empty());
	assert_eq!(body["details"]["trail"][0]["status"], "not_attempted");

	server.abort();
}

#[tokio::test]
async fn test_unsupported_family_pair_is_no_route() {
	let server = TestServer::spawn()
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/routes"))
		.json(&ApiFixtures::route("10", ("ton", "ton"), ("trx", "tron"), json!({})))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 404);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["error"], "NO_ROUTE");

	server.abort();
}
