//! Domain traits defining the persistence gateway contract.
//!
//! Each entity gets its own store trait, mirroring the per-entity
//! repositories the services delegate to. Services depend only on these
//! abstractions; connection pooling and SQL live behind them.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{
    Book, CreateBookRequest, CreateTransactionRequest, EntityId, RegisterUserRequest, Transaction,
    User,
};

/// Connectivity probe for the backing store.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Persistence operations for user profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All registered users.
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Look up a user by id; `None` when no row exists.
    async fn get_user(&self, id: EntityId) -> Result<Option<User>, AppError>;

    /// Look up a user by email; `None` when no row exists.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user and return the persisted row with its assigned id.
    ///
    /// Email uniqueness is enforced here by the store's UNIQUE constraint; a
    /// violation surfaces as `DatabaseError::Duplicate`. Doing it in one
    /// statement avoids the check-then-insert race between concurrent
    /// registrations.
    async fn insert_user(&self, new_user: &RegisterUserRequest) -> Result<User, AppError>;

    /// Delete by id; `Ok(true)` iff a row existed and was removed.
    async fn delete_user(&self, id: EntityId) -> Result<bool, AppError>;
}

/// Persistence operations for book listings.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list_books(&self) -> Result<Vec<Book>, AppError>;

    async fn get_book(&self, id: EntityId) -> Result<Option<Book>, AppError>;

    /// All books listed by the given seller.
    async fn list_books_by_seller(&self, seller_id: EntityId) -> Result<Vec<Book>, AppError>;

    /// Insert a new listing and return the persisted row with its assigned id.
    async fn insert_book(&self, new_book: &CreateBookRequest) -> Result<Book, AppError>;

    /// Delete by id; `Ok(true)` iff a row existed and was removed.
    async fn delete_book(&self, id: EntityId) -> Result<bool, AppError>;
}

/// Persistence operations for recorded sales.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError>;

    async fn get_transaction(&self, id: EntityId) -> Result<Option<Transaction>, AppError>;

    async fn list_transactions_by_buyer(
        &self,
        buyer_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError>;

    async fn list_transactions_by_seller(
        &self,
        seller_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError>;

    /// Insert a new sale record and return the persisted row with its
    /// assigned id and timestamp.
    async fn insert_transaction(
        &self,
        new_transaction: &CreateTransactionRequest,
    ) -> Result<Transaction, AppError>;

    /// Delete by id; `Ok(true)` iff a row existed and was removed.
    async fn delete_transaction(&self, id: EntityId) -> Result<bool, AppError>;
}
