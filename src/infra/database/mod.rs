//! Concrete database gateway implementations.
//!
//! This module contains the production persistence adapter implementing the
//! store traits defined in the domain layer.

pub mod postgres;

pub use postgres::{PostgresConfig, PostgresGateway};
