//! HTTP request handlers.
//!
//! Handlers stay thin: deserialize, call the matching service operation,
//! translate the result. All decision logic lives in the application layer.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::error;

use crate::app::AppState;
use crate::domain::{
    AppError, Book, CreateBookRequest, CreateTransactionRequest, DatabaseError, EntityId,
    ErrorDetail, ErrorResponse, HealthResponse, HealthStatus, LoginRequest, LoginResponse,
    MessageResponse, RegisterUserRequest, Transaction, User,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Register a new user (`POST /api/users`).
pub async fn register_user_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.register(&payload).await?;
    metrics::counter!("users_registered_total").increment(1);
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users (`GET /api/users`).
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.get_users().await?;
    Ok(Json(users))
}

/// Get a user by id (`GET /api/users/{id}`).
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<EntityId>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound(format!("user {id}"))))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Get a user by email (`GET /api/users/by-email?email=`).
pub async fn get_user_by_email_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .get_user_by_email(&query.email)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound(format!("user {}", query.email)))
        })?;
    Ok(Json(user))
}

/// Delete a user (`DELETE /api/users/{id}`).
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<EntityId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.users.delete_user(id).await? {
        return Err(AppError::Database(DatabaseError::NotFound(format!(
            "user {id}"
        ))));
    }
    Ok(Json(MessageResponse::new("user deleted")))
}

/// Check credentials (`POST /api/users/login`).
///
/// Always a 200 with a boolean; a wrong password and an unknown email are
/// indistinguishable in the response.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let success = state
        .users
        .validate_credentials(&payload.email, &payload.password)
        .await?;
    Ok(Json(LoginResponse { success }))
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

/// List all books (`GET /api/books`).
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state.books.get_books().await?;
    Ok(Json(books))
}

/// Get a book by id (`GET /api/books/{id}`).
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<EntityId>,
) -> Result<Json<Book>, AppError> {
    let book = state
        .books
        .get_book_by_id(id)
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound(format!("book {id}"))))?;
    Ok(Json(book))
}

/// List a seller's books (`GET /api/books/seller/{seller_id}`).
pub async fn books_by_seller_handler(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<EntityId>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state.books.get_books_by_seller(seller_id).await?;
    Ok(Json(books))
}

/// List a new book (`POST /api/books`).
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = state.books.add_book(&payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Delete a book (`DELETE /api/books/{id}`).
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<EntityId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.books.delete_book(id).await? {
        return Err(AppError::Database(DatabaseError::NotFound(format!(
            "book {id}"
        ))));
    }
    Ok(Json(MessageResponse::new("book deleted")))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// List all transactions (`GET /api/transactions`).
pub async fn list_transactions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = state.transactions.get_all_transactions().await?;
    Ok(Json(transactions))
}

/// Get a transaction by id (`GET /api/transactions/{id}`).
pub async fn get_transaction_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<EntityId>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state
        .transactions
        .get_transaction_by_id(id)
        .await?
        .ok_or_else(|| AppError::Database(DatabaseError::NotFound(format!("transaction {id}"))))?;
    Ok(Json(transaction))
}

/// List a buyer's transactions (`GET /api/transactions/buyer/{buyer_id}`).
pub async fn transactions_by_buyer_handler(
    State(state): State<Arc<AppState>>,
    Path(buyer_id): Path<EntityId>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = state.transactions.get_transactions_by_buyer(buyer_id).await?;
    Ok(Json(transactions))
}

/// List a seller's transactions (`GET /api/transactions/seller/{seller_id}`).
pub async fn transactions_by_seller_handler(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<EntityId>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = state
        .transactions
        .get_transactions_by_seller(seller_id)
        .await?;
    Ok(Json(transactions))
}

/// Record a sale (`POST /api/transactions`).
pub async fn create_transaction_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let transaction = state.transactions.add_transaction(&payload).await?;
    metrics::counter!("transactions_recorded_total").increment(1);
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Delete a transaction (`DELETE /api/transactions/{id}`).
pub async fn delete_transaction_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<EntityId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.transactions.delete_transaction(id).await? {
        return Err(AppError::Database(DatabaseError::NotFound(format!(
            "transaction {id}"
        ))));
    }
    Ok(Json(MessageResponse::new("transaction deleted")))
}

// ---------------------------------------------------------------------------
// Health and metrics
// ---------------------------------------------------------------------------

/// Detailed health check (`GET /health`).
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.health.health_check().await {
        Ok(()) => HealthStatus::Healthy,
        Err(e) => {
            error!(error = ?e, "Database health check failed");
            HealthStatus::Unhealthy
        }
    };
    Json(HealthResponse::new(database))
}

/// Kubernetes liveness probe (`GET /health/live`).
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe (`GET /health/ready`).
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.health.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Prometheus scrape output (`GET /metrics`).
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Database(db_err) => match db_err {
                DatabaseError::Connection(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "database_error",
                    self.to_string(),
                ),
                DatabaseError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found", self.to_string())
                }
                DatabaseError::Duplicate(_) => {
                    (StatusCode::CONFLICT, "duplicate", self.to_string())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    self.to_string(),
                ),
            },
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                self.to_string(),
            ),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                self.to_string(),
            ),
            AppError::Serialization(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "serialization_error",
                self.to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
            ),
        };

        metrics::counter!("api_errors_total", "type" => error_type).increment(1);
        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
