//! Fixed-window request rate limiting

use axum::{
	extract::{Request, State},
	http::{header, HeaderMap, HeaderValue, StatusCode},
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};
use xswap_config::RateLimitSettings;

use crate::handlers::common::ErrorResponse;

const WINDOW_SECONDS: i64 = 60;

#[derive(Debug, Clone)]
struct RequestCounter {
	count: u32,
	window_start: DateTime<Utc>,
}

/// In-memory limiter keyed by client. Each key gets `requests_per_minute`
/// plus `burst_size` requests per one-minute window.
#[derive(Debug)]
pub struct RateLimiter {
	counters: DashMap<String, RequestCounter>,
	limit: u32,
}

impl RateLimiter {
	pub fn new(settings: &RateLimitSettings) -> Self {
		Self {
			counters: DashMap::new(),
			limit: settings
				.requests_per_minute
				.saturating_add(settings.burst_size)
				.max(1),
		}
	}

	/// Count a request, returning the seconds until the window resets when
	/// the key is over its limit
	pub fn check(&self, key: &str) -> Result<(), i64> {
		self.check_at(key, Utc::now())
	}

	fn check_at(&self, key: &str, now: DateTime<Utc>) -> Result<(), i64> {
		let window = Duration::seconds(WINDOW_SECONDS);
		let mut counter = self
			.counters
			.entry(key.to_string())
			.or_insert_with(|| RequestCounter {
				count: 0,
				window_start: now,
			});

		if now >= counter.window_start + window {
			counter.count = 0;
			counter.window_start = now;
		}
		if counter.count >= self.limit {
			let reset = counter.window_start + window - now;
			return Err(reset.num_seconds().max(1));
		}
		counter.count += 1;
		Ok(())
	}

	/// Drop counters whose window has ended
	pub fn cleanup_expired(&self) -> usize {
		self.cleanup_expired_at(Utc::now())
	}

	fn cleanup_expired_at(&self, now: DateTime<Utc>) -> usize {
		let cutoff = now - Duration::seconds(WINDOW_SECONDS);
		let before = self.counters.len();
		self.counters.retain(|_, counter| counter.window_start > cutoff);
		before.saturating_sub(self.counters.len())
	}

	pub fn tracked_clients(&self) -> usize {
		self.counters.len()
	}

	/// Sweep expired counters once per window until the limiter is dropped
	pub fn spawn_cleanup(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
		let limiter: Weak<Self> = Arc::downgrade(self);
		tokio::spawn(async move {
			let mut ticker =
				tokio::time::interval(std::time::Duration::from_secs(WINDOW_SECONDS as u64));
			loop {
				ticker.tick().await;
				let Some(limiter) = limiter.upgrade() else {
					break;
				};
				let removed = limiter.cleanup_expired();
				if removed > 0 {
					debug!("Dropped {} expired rate limit counters", removed);
				}
			}
		})
	}
}

/// Client key: first `x-forwarded-for` hop, then `x-real-ip`, else shared
fn client_key(headers: &HeaderMap) -> String {
	headers
		.get("x-forwarded-for")
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.split(',').next())
		.or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.unwrap_or("anonymous")
		.to_string()
}

pub async fn enforce_rate_limit(
	State(limiter): State<Arc<RateLimiter>>,
	request: Request,
	next: Next,
) -> Response {
	let key = client_key(request.headers());
	match limiter.check(&key) {
		Ok(()) => next.run(request).await,
		Err(retry_after) => {
			warn!("Rate limit exceeded for {}", key);
			let mut response = (
				StatusCode::TOO_MANY_REQUESTS,
				Json(ErrorResponse::new(
					"RATE_LIMITED",
					format!("Too many requests, retry in {}s", retry_after),
				)),
			)
				.into_response();
			if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
				response.headers_mut().insert(header::RETRY_AFTER, value);
			}
			response
		},
	}
}
