use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for domain entities.
pub type EntityId = i32;

/// A registered user profile.
///
/// Users are anonymous: the same account can buy and sell books without any
/// role distinction. Only the data needed for authentication and transactions
/// is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    /// Stored in plain text for parity with the existing database contents.
    pub password: String,
    /// Bitcoin wallet address payouts are sent to.
    pub wallet_address: String,
}

impl User {
    /// Byte-exact comparison against the stored password.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

/// Payload for registering a new user; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub wallet_address: String,
}

/// A book listed for sale, owned by the seller identified by `user_id`.
///
/// The seller reference is not validated against the users table; listings
/// survive their seller (matching the shipped behavior).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: String,
    pub description: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub cover_image_url: String,
    #[serde(rename = "priceBTC")]
    pub price_btc: BigDecimal,
    pub quantity: i32,
}

/// Payload for listing a new book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub user_id: EntityId,
    pub title: String,
    pub description: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub cover_image_url: String,
    #[serde(rename = "priceBTC")]
    pub price_btc: BigDecimal,
    pub quantity: i32,
}

/// A recorded sale linking buyer, seller, and book.
///
/// Immutable once created. The amount is whatever the client reported; it is
/// not tied to the book's listed price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: EntityId,
    pub buyer_user_id: EntityId,
    pub seller_user_id: EntityId,
    pub book_id: EntityId,
    #[serde(rename = "amountBTC")]
    pub amount_btc: BigDecimal,
    pub date: DateTime<Utc>,
}

/// Payload for recording a sale. When `date` is omitted the gateway stamps
/// the insertion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub buyer_user_id: EntityId,
    pub seller_user_id: EntityId,
    pub book_id: EntityId,
    #[serde(rename = "amountBTC")]
    pub amount_btc: BigDecimal,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Credentials submitted to `POST /api/users/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login outcome. Always delivered with a 200 so the error path does not leak
/// whether the account exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
}

/// Confirmation body for successful deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error envelope returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    #[must_use]
    pub fn new(database: HealthStatus) -> Self {
        Self {
            status: database.clone(),
            database,
            timestamp: Utc::now(),
        }
    }
}
