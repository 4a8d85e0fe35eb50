//! Shared domain models used by the registry, adapters and planners

pub mod amount;
pub mod family;
pub mod network;
pub mod secret_string;
pub mod token;

pub use amount::{from_base_units, to_base_units, AmountError, BaseAmount};
pub use family::Family;
pub use network::Network;
pub use secret_string::SecretString;
pub use token::{normalize_symbol, Token};
