//! Route table and middleware stack.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, warn};

use crate::api::handlers::{
    books_by_seller_handler, create_book_handler, create_transaction_handler, delete_book_handler,
    delete_transaction_handler, delete_user_handler, get_book_handler, get_transaction_handler,
    get_user_by_email_handler, get_user_handler, health_check_handler, list_books_handler,
    list_transactions_handler, list_users_handler, liveness_handler, login_handler,
    metrics_handler, readiness_handler, register_user_handler, transactions_by_buyer_handler,
    transactions_by_seller_handler,
};
use crate::app::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the application router without a CORS policy.
///
/// Used directly by in-process tests; the binary wraps it with
/// [`create_router_with_cors`].
pub fn create_router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/", get(list_users_handler).post(register_user_handler))
        .route("/login", post(login_handler))
        .route("/by-email", get(get_user_by_email_handler))
        .route("/{id}", get(get_user_handler).delete(delete_user_handler));

    let book_routes = Router::new()
        .route("/", get(list_books_handler).post(create_book_handler))
        .route("/seller/{seller_id}", get(books_by_seller_handler))
        .route("/{id}", get(get_book_handler).delete(delete_book_handler));

    let transaction_routes = Router::new()
        .route(
            "/",
            get(list_transactions_handler).post(create_transaction_handler),
        )
        .route("/buyer/{buyer_id}", get(transactions_by_buyer_handler))
        .route("/seller/{seller_id}", get(transactions_by_seller_handler))
        .route(
            "/{id}",
            get(get_transaction_handler).delete(delete_transaction_handler),
        );

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/books", book_routes)
        .nest("/transactions", transaction_routes);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .with_state(state)
}

/// Builds the application router with a browser-facing CORS policy.
///
/// An unparseable origin is logged and skipped, which leaves CORS closed
/// rather than open.
pub fn create_router_with_cors(state: Arc<AppState>, allowed_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => warn!(origin = %allowed_origin, "Ignoring unparseable CORS origin"),
    }

    create_router(state).layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::test_utils::MockGateway;

    fn test_state() -> Arc<AppState> {
        let gateway = Arc::new(MockGateway::new());
        Arc::new(AppState::new(
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
            gateway,
        ))
    }

    #[test]
    fn test_create_router_builds() {
        let _router = create_router(test_state());
    }

    #[test]
    fn test_create_router_with_cors_builds() {
        let _router = create_router_with_cors(test_state(), "http://localhost:5173");
    }

    #[test]
    fn test_create_router_with_bad_origin_builds() {
        let _router = create_router_with_cors(test_state(), "\u{7f}");
    }
}
