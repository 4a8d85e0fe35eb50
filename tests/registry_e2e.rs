//! Provider and asset registry listing E2E tests

mod mocks;

use crate::mocks::TestServer;
use reqwest::Client;
use serde_json::Value;
use xswap_aggregator::mocks::MockProviderAdapter;

#[tokio::test]
async fn test_providers_are_listed_in_priority_order() {
	let server = TestServer::spawn_with_providers(&[
		(MockProviderAdapter::evm("second"), 2),
		(MockProviderAdapter::evm("first"), 1),
	])
	.await
	.expect("Failed to start test server");

	let body: Value = Client::new()
		.get(server.url("/api/v1/providers"))
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	assert_eq!(body["totalProviders"], 2);
	assert_eq!(body["enabledProviders"], 2);
	assert_eq!(body["providers"][0]["providerId"], "first");
	assert_eq!(body["providers"][1]["providerId"], "second");
	assert_eq!(body["providers"][0]["timeoutMs"], 5000);

	server.abort();
}

#[tokio::test]
async fn test_networks_listing() {
	let server = TestServer::spawn()
		.await
		.expect("Failed to start test server");

	let body: Value = Client::new()
		.get(server.url("/api/v1/networks"))
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	let networks = body["networks"].as_array().unwrap();
	assert_eq!(body["totalNetworks"], networks.len());
	let bsc = networks.iter().find(|n| n["id"] == "bsc").unwrap();
	assert_eq!(bsc["chainId"], 56);
	assert_eq!(bsc["family"], "EVM");
	let solana = networks.iter().find(|n| n["id"] == "solana").unwrap();
	assert!(solana["chainId"].is_null());

	server.abort();
}

#[tokio::test]
async fn test_tokens_filtered_by_network_resolve_addresses() {
	let server = TestServer::spawn()
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	let body: Value = client
		.get(server.url("/api/v1/tokens"))
		.query(&[("networkId", "bsc")])
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	let resolved = body["resolved"].as_array().unwrap();
	let usdt = resolved.iter().find(|t| t["tokenId"] == "usdt").unwrap();
	assert_eq!(usdt["decimals"], 18);
	let bnb = resolved.iter().find(|t| t["tokenId"] == "bnb").unwrap();
	assert_eq!(bnb["address"], "0x0000000000000000000000000000000000000000");

	let resp = client
		.get(server.url("/api/v1/tokens"))
		.query(&[("networkId", "atlantis")])
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), 404);

	server.abort();
}
