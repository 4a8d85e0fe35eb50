//! Asset registry: networks, tokens, and family-correct address resolution

pub mod builtin;
pub mod errors;
pub mod registry;

pub use errors::{AssetError, AssetResult};
pub use registry::{AssetRegistry, ResolvedToken};
