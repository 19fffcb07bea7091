//! Infrastructure layer implementations.

pub mod database;
pub mod observability;

pub use database::{PostgresConfig, PostgresGateway};
pub use observability::init_metrics_handle;
