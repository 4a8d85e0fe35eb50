//! Route plan execution: transaction building, confirmation checks and the
//! step state machine

pub mod orchestrator;
pub mod status_checker;
pub mod tx_builder;

pub use orchestrator::ExecutionService;
pub use status_checker::{ChainStatusChecker, ChainTxStatus, RpcStatusChecker};
pub use tx_builder::build_unsigned_transaction;
