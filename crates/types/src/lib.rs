//! xswap Types
//!
//! Shared models and traits for the cross-chain swap aggregator.
//! This crate contains all domain models organized by business entity.

pub mod adapters;
pub mod assets;
pub mod constants;
pub mod errors;
pub mod executions;
pub mod models;
pub mod quotes;
pub mod routes;
pub mod storage;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

pub use errors::ErrorCode;

pub use models::{
	from_base_units, normalize_symbol, to_base_units, AmountError, BaseAmount, Family, Network,
	SecretString, Token,
};

pub use assets::{AssetError, AssetRegistry, AssetResult, ResolvedToken};

pub use adapters::{
	AdapterError, AdapterFactoryError, AdapterFactoryResult, AdapterResult, FeeBreakdown, FeeItem,
	FeeKind, ProviderAdapter, ProviderError, ProviderInfo, ProviderOutcome, ProviderRuntimeConfig,
	ProviderStep, QuoteInput, QuoteResult, Support,
};

pub use quotes::{
	AggregatedQuote, AggregationMetadata, QuoteError, QuoteRequest, QuoteResponse, QuoteSource,
	RejectedQuote, Side, SkippedProvider,
};

pub use routes::{
	LegAttempt, LegStatus, LegTemplate, RouteMatrix, RoutePlan, RoutePlanError,
	RoutePlanRequest, RoutePlanResult, RouteRule, RouteStep, StepEndpoint, StepKind,
};

pub use executions::{
	Execution, ExecutionError, ExecutionResponse, ExecutionResult, ExecutionStepState,
	StatusChange, StepStatus, TonMessage, UnsignedTransaction,
};

pub use storage::{CacheStats, CacheStore, ExecutionStore, StorageError, StorageResult, StorageTrait};
