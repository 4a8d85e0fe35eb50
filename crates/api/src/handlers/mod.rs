pub mod common;
pub mod executions;
pub mod health;
pub mod providers;
pub mod quotes;
pub mod registry;
pub mod routes;

pub use executions::{fail_step, get_execution, poll_execution, post_executions, submit_step};
pub use health::{health, ready};
pub use providers::get_providers;
pub use quotes::{get_quotes, post_quotes};
pub use registry::{get_networks, get_tokens};
pub use routes::post_routes;
