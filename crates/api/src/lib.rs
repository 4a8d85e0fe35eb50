//! xswap API
//!
//! Axum-based API with routes and middleware for the cross-chain swap aggregator.

pub mod handlers;
pub mod rate_limit;
pub mod router;
pub mod security;
pub mod state;

pub use rate_limit::RateLimiter;
pub use router::{create_router, create_router_with_rate_limit};
pub use state::AppState;
