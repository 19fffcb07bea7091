//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::domain::{BookStore, HealthProbe, TransactionStore, UserStore};
use crate::infra::observability::PrometheusHandle;

use super::service::{BookService, TransactionService, UserService};

/// Shared application state for the Axum web server.
///
/// Holds thread-safe references to the three domain services plus the health
/// probe for the backing store. Handlers reach the services without knowing
/// which gateway implementation sits behind them, which is what lets the
/// integration tests swap in the in-memory mock.
#[derive(Clone)]
pub struct AppState {
    /// User registration, lookup, and credential checks.
    pub users: Arc<UserService>,

    /// Book listing operations.
    pub books: Arc<BookService>,

    /// Sale recording and queries.
    pub transactions: Arc<TransactionService>,

    /// Connectivity probe for readiness checks.
    pub health: Arc<dyn HealthProbe>,

    /// Prometheus render handle for `GET /metrics`; absent when no recorder
    /// was installed (e.g. in tests).
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState`, wiring each service to its store.
    ///
    /// In production all four arguments are the same `PostgresGateway`
    /// behind different trait objects; tests pass the mock the same way.
    #[must_use]
    pub fn new(
        user_store: Arc<dyn UserStore>,
        book_store: Arc<dyn BookStore>,
        transaction_store: Arc<dyn TransactionStore>,
        health: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(user_store)),
            books: Arc::new(BookService::new(book_store)),
            transactions: Arc::new(TransactionService::new(transaction_store)),
            health,
            metrics: None,
        }
    }

    /// Attaches a Prometheus handle so the router can expose `GET /metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: Arc<PrometheusHandle>) -> Self {
        self.metrics = Some(handle);
        self
    }
}
