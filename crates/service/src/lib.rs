//! xswap Service
//!
//! Core logic for quote aggregation, cross-family route planning and
//! execution tracking.

pub mod aggregator;
pub mod coalescing;
pub mod execution;
pub mod price_fallback;
pub mod route_planner;
pub mod sanity;

pub use aggregator::{
	AggregatorConfig, AggregatorResult, AggregatorService, AggregatorTrait, ResolvedQuoteRequest,
};
pub use coalescing::InFlightRequests;
pub use execution::{
	build_unsigned_transaction, ChainStatusChecker, ChainTxStatus, ExecutionService,
	RpcStatusChecker,
};
pub use price_fallback::{HttpPriceOracle, PriceError, PriceFallback, PriceOracle};
pub use route_planner::HubRoutePlanner;
pub use sanity::{PairClass, QuoteSanityChecker};
