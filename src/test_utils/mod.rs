//! Test utilities and mock implementations.
//!
//! This module provides a reusable in-memory gateway mock for use in unit
//! and integration tests.

pub mod mocks;

pub use mocks::MockGateway;
