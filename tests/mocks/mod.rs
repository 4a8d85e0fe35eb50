//! Shared helpers for the integration tests
//!
//! Request fixtures, a confirming chain checker and a test server that binds
//! the full router on an ephemeral port.

pub mod fixtures;
pub mod test_server;

#[allow(unused_imports)]
pub use fixtures::ApiFixtures;
#[allow(unused_imports)]
pub use test_server::{ScriptedChecker, TestServer};
