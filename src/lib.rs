//! ReadHub backend library.
//!
//! A marketplace backend for trading books priced in Bitcoin, structured in
//! four layers with dependencies pointing inward:
//!
//! ```text
//! api    -> HTTP handlers, routing, middleware (axum)
//! app    -> services holding the business rules, shared state
//! domain -> entities, request/response types, errors, store traits
//! infra  -> Postgres gateway, metrics exporter
//! ```
//!
//! Services depend only on the `domain` store traits, so the whole
//! application runs against [`test_utils::MockGateway`] in tests without a
//! database.

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

// Compiled unconditionally so integration tests and downstream harnesses can
// share the in-memory gateway.
pub mod test_utils;

pub use api::{create_router, create_router_with_cors};
pub use app::AppState;
pub use config::AppConfig;
pub use domain::AppError;
