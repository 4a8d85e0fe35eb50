//! Global limits and defaults for configuration and runtime

/// Minimum allowed timeout for provider requests in milliseconds
pub const MIN_PROVIDER_TIMEOUT_MS: u64 = 100;

/// Maximum allowed timeout for provider requests in milliseconds
pub const MAX_PROVIDER_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for provider requests in milliseconds
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 8_000;

/// Default deadline for a whole aggregation round in milliseconds
pub const DEFAULT_GLOBAL_TIMEOUT_MS: u64 = 12_000;

/// Default TTL for successful quotes
pub const DEFAULT_QUOTE_TTL_SECS: u64 = 30;

/// Default TTL for NO_ROUTE outcomes
pub const DEFAULT_NO_ROUTE_TTL_SECS: u64 = 300;

/// Default TTL for provider-pair negative entries
pub const DEFAULT_NEGATIVE_TTL_SECS: u64 = 3_600;

/// Default slippage tolerance in basis points (0.5%)
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

/// Upper bound on caller-supplied slippage (50%)
pub const MAX_SLIPPAGE_BPS: u32 = 5_000;

/// Default timeout for the spot-price service in milliseconds
pub const DEFAULT_PRICE_TIMEOUT_MS: u64 = 3_000;

/// Default rate limit: requests per minute
pub const DEFAULT_RATE_LIMIT_REQUESTS_PER_MINUTE: u32 = 600;

/// Default rate limit: burst size
pub const DEFAULT_RATE_LIMIT_BURST_SIZE: u32 = 50;
