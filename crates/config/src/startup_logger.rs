//! Service startup logging for the xswap aggregator

use std::env;
use tracing::info;

use crate::Settings;

/// Logs service information at startup
pub fn log_service_info() {
	// Use the root package name and version, not the current crate
	let service_name = "xswap-aggregator";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== xswap Aggregator Service Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {}", env::consts::OS);
	info!("🏗️ Architecture: {}", env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);

	info!("🎯 Starting aggregator initialization...");
}

/// Logs the enabled providers and the cache/timeout policy
pub fn log_provider_summary(settings: &Settings) {
	let providers = settings.enabled_providers();
	info!("🔌 Enabled providers: {}", providers.len());
	for (id, provider) in providers {
		info!(
			"   #{} {} ({}) timeout={}ms key={}",
			provider.priority,
			id,
			provider.endpoint,
			provider.effective_timeout_ms(&settings.timeouts),
			provider
				.api_key
				.as_ref()
				.map(|key| key.description())
				.unwrap_or_else(|| "none".to_string())
		);
	}
	info!(
		"🗄️ Cache TTLs: quotes={}s no-route={}s negative={}s",
		settings.cache.quote_ttl_secs,
		settings.cache.no_route_ttl_secs,
		settings.cache.negative_ttl_secs
	);
	info!(
		"⏱️ Timeouts: provider={}ms global={}ms",
		settings.timeouts.default_provider_ms, settings.timeouts.global_ms
	);
	match &settings.fallback.price_service_url {
		Some(url) if settings.fallback.enabled => info!("💱 Price fallback: {}", url),
		_ => info!("💱 Price fallback: disabled"),
	}
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 xswap Aggregator Service Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs additional startup completion information
pub fn log_startup_complete(bind_address: &str) {
	info!("✅ xswap Aggregator Service Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
	info!("📡 Ready to accept requests");
}
