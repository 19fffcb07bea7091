//! HTTP API layer.
//!
//! Thin handlers over the application services, plus the route table and
//! middleware stack.

pub mod handlers;
pub mod router;

pub use router::{create_router, create_router_with_cors};
