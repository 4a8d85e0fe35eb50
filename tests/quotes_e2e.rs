//! Quotes API E2E tests
//!
//! Tests for /api/v1/quotes covering validation, provider selection,
//! caching, coalescing and the error taxonomy on the wire.

mod mocks;

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::mocks::{ApiFixtures, TestServer};
use reqwest::Client;
use xswap_aggregator::mocks::MockProviderAdapter;
use xswap_aggregator::Family;

#[tokio::test]
async fn test_quote_success_response_shape() {
	let server = TestServer::spawn_with_providers(&[(MockProviderAdapter::evm("alpha"), 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::usdc_bridge_quote())
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 200);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["ok"], true);
	assert_eq!(body["provider"], "alpha");
	assert_eq!(body["requestId"], "req-1");
	assert_eq!(body["fromChainId"], 1);
	assert_eq!(body["toChainId"], 8453);
	assert_eq!(body["inAmount"], "100");
	assert_eq!(body["outAmount"], "99.5");
	assert_eq!(body["outAmountBase"], "99500000");
	assert_eq!(body["isIndicative"], false);
	assert!(body["estimatedGasUSD"].is_null());
	assert!(body["totalFeeUSD"].is_null());
	assert_eq!(body["metadata"]["providersQueried"], 1);
	assert_eq!(body["metadata"]["providersSucceeded"], 1);
	assert!(body.get("errorCode").is_none());

	server.abort();
}

#[tokio::test]
async fn test_get_quote_with_query_string() {
	let server = TestServer::spawn_with_providers(&[(MockProviderAdapter::evm("alpha"), 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.get(server.url("/api/v1/quotes"))
		.query(&[
			("amount", "1"),
			("fromTokenId", "usdc"),
			("fromNetworkId", "arbitrum"),
			("toTokenId", "usdc"),
			("toNetworkId", "optimism"),
		])
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 200);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["outAmountBase"], "995000");
	// No sender means an indicative quote
	assert_eq!(body["isIndicative"], true);
	assert!(!body["warnings"].as_array().unwrap().is_empty());

	server.abort();
}

#[tokio::test]
async fn test_priority_beats_latency() {
	let trusted = MockProviderAdapter::evm("trusted")
		.with_ratio_bps(9_900)
		.with_delay(Duration::from_millis(150));
	let fast = MockProviderAdapter::evm("fast").with_ratio_bps(9_990);
	let server = TestServer::spawn_with_providers(&[(trusted, 1), (fast, 2)])
		.await
		.expect("Failed to start test server");

	let body: serde_json::Value = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::usdc_bridge_quote())
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	assert_eq!(body["provider"], "trusted");
	assert_eq!(body["outAmountBase"], "99000000");

	server.abort();
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
	let adapter = MockProviderAdapter::evm("alpha");
	let calls = adapter.calls();
	let server = TestServer::spawn_with_providers(&[(adapter, 1)])
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	for _ in 0..2 {
		let resp = client
			.post(server.url("/api/v1/quotes"))
			.json(&ApiFixtures::usdc_bridge_quote())
			.send()
			.await
			.unwrap();
		assert_eq!(resp.status(), 200);
	}

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	let body: serde_json::Value = client
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::usdc_bridge_quote())
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();
	assert_eq!(body["metadata"]["servedFromCache"], true);

	server.abort();
}

#[tokio::test]
async fn test_concurrent_identical_requests_share_one_fan_out() {
	let adapter = MockProviderAdapter::evm("slow").with_delay(Duration::from_millis(300));
	let calls = adapter.calls();
	let server = TestServer::spawn_with_providers(&[(adapter, 1)])
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	let send = || {
		client
			.post(server.url("/api/v1/quotes"))
			.json(&ApiFixtures::usdc_bridge_quote())
			.send()
	};
	let (first, second) = tokio::join!(send(), send());
	let first: serde_json::Value = first.unwrap().json().await.unwrap();
	let second: serde_json::Value = second.unwrap().json().await.unwrap();

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(first["outAmountBase"], second["outAmountBase"]);
	assert!(
		first["metadata"]["coalesced"] == true || second["metadata"]["coalesced"] == true,
		"one of the callers should have joined the in-flight computation"
	);

	server.abort();
}

#[tokio::test]
async fn test_unknown_token_is_a_bad_request() {
	let server = TestServer::spawn_with_providers(&[(MockProviderAdapter::evm("alpha"), 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::quote("1", ("usdc", "ethereum"), ("doge", "base")))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 400);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["ok"], false);
	assert_eq!(body["errorCode"], "INVALID_TO_TOKEN");
	assert_eq!(body["toTokenId"], "doge");

	server.abort();
}

#[tokio::test]
async fn test_invalid_amount_is_a_bad_request() {
	let server = TestServer::spawn()
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::quote("abc", ("usdc", "ethereum"), ("usdc", "base")))
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 400);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["errorCode"], "INVALID_AMOUNT");

	server.abort();
}

#[tokio::test]
async fn test_all_providers_failing_is_no_route() {
	let server = TestServer::spawn_with_providers(&[
		(MockProviderAdapter::evm("down").failing(503), 1),
		(MockProviderAdapter::evm("picky").unsupported(), 2),
	])
	.await
	.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::usdc_bridge_quote())
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 404);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["ok"], false);
	assert_eq!(body["errorCode"], "NO_ROUTE");
	// Diagnostics stay hidden outside debug mode
	assert!(body.get("debug").is_none());

	server.abort();
}

#[tokio::test]
async fn test_same_symbol_output_above_input_is_rejected() {
	let greedy = MockProviderAdapter::evm("greedy").with_ratio_bps(10_500);
	let server = TestServer::spawn_with_providers(&[(greedy, 1)])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::usdc_bridge_quote())
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), 502);
	let body: serde_json::Value = resp.json().await.unwrap();
	assert_eq!(body["errorCode"], "SUSPICIOUS_QUOTE_HIGH_OUTPUT");

	server.abort();
}

#[tokio::test]
async fn test_rejected_candidate_falls_through_to_next_priority() {
	let greedy = MockProviderAdapter::evm("greedy").with_ratio_bps(10_500);
	let honest = MockProviderAdapter::evm("honest").with_ratio_bps(9_970);
	let server = TestServer::spawn_with_providers(&[(greedy, 1), (honest, 2)])
		.await
		.expect("Failed to start test server");

	let body: serde_json::Value = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::usdc_bridge_quote())
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	assert_eq!(body["ok"], true);
	assert_eq!(body["provider"], "honest");
	assert_eq!(body["metadata"]["rejected"][0]["provider"], "greedy");

	server.abort();
}

#[tokio::test]
async fn test_family_not_served_is_skipped() {
	let solana_only = MockProviderAdapter::new("jup", vec![Family::Solana]).same_chain_only();
	let evm = MockProviderAdapter::evm("alpha");
	let solana_calls = solana_only.calls();
	let server = TestServer::spawn_with_providers(&[(solana_only, 1), (evm, 2)])
		.await
		.expect("Failed to start test server");

	let body: serde_json::Value = Client::new()
		.post(server.url("/api/v1/quotes"))
		.json(&ApiFixtures::usdc_bridge_quote())
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	assert_eq!(body["provider"], "alpha");
	assert_eq!(body["metadata"]["providersSkipped"], 1);
	assert_eq!(solana_calls.load(Ordering::SeqCst), 0);

	server.abort();
}
