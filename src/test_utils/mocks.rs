//! Mock implementations for testing.
//!
//! `MockGateway` is an in-memory stand-in for the persistence gateway. It
//! implements every store trait plus the health probe, assigns sequential ids
//! the way the real store does, and can be configured to simulate failures.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{
    AppError, Book, BookStore, CreateBookRequest, CreateTransactionRequest, DatabaseError,
    EntityId, HealthProbe, RegisterUserRequest, Transaction, TransactionStore, User, UserStore,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }
}

/// In-memory persistence gateway for tests.
///
/// # Example
///
/// ```
/// use readhub_backend::test_utils::{MockGateway, mocks::MockConfig};
///
/// // A gateway that succeeds
/// let mock = MockGateway::new();
///
/// // A gateway that fails every call
/// let failing = MockGateway::with_config(MockConfig::failure("DB error"));
/// ```
pub struct MockGateway {
    users: Arc<Mutex<BTreeMap<EntityId, User>>>,
    books: Arc<Mutex<BTreeMap<EntityId, Book>>>,
    transactions: Arc<Mutex<BTreeMap<EntityId, Transaction>>>,
    next_user_id: AtomicI32,
    next_book_id: AtomicI32,
    next_transaction_id: AtomicI32,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockGateway {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            users: Arc::new(Mutex::new(BTreeMap::new())),
            books: Arc::new(Mutex::new(BTreeMap::new())),
            transactions: Arc::new(Mutex::new(BTreeMap::new())),
            next_user_id: AtomicI32::new(1),
            next_book_id: AtomicI32::new(1),
            next_transaction_id: AtomicI32::new(1),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Gets the number of times any store method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status reported by the probe.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Clears all stored entities without resetting id counters.
    pub fn clear(&self) {
        self.users.lock().unwrap().clear();
        self.books.lock().unwrap().clear();
        self.transactions.lock().unwrap().clear();
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock gateway error".to_string());
            return Err(AppError::Database(DatabaseError::Query(msg)));
        }
        Ok(())
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthProbe for MockGateway {
    async fn health_check(&self) -> Result<(), AppError> {
        self.increment_call_count();

        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Database(DatabaseError::Connection(
                "Mock gateway unhealthy".to_string(),
            )));
        }

        self.check_should_fail()
    }
}

#[async_trait]
impl UserStore for MockGateway {
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn get_user(&self, id: EntityId) -> Result<Option<User>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, new_user: &RegisterUserRequest) -> Result<User, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let mut users = self.users.lock().unwrap();

        // Same guarantee as the UNIQUE constraint on users.email
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::Database(DatabaseError::Duplicate(format!(
                "duplicate key value violates unique constraint \"users_email_key\": {}",
                new_user.email
            ))));
        }

        let id = self.next_user_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password: new_user.password.clone(),
            wallet_address: new_user.wallet_address.clone(),
        };
        users.insert(id, user.clone());

        Ok(user)
    }

    async fn delete_user(&self, id: EntityId) -> Result<bool, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }
}

#[async_trait]
impl BookStore for MockGateway {
    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.books.lock().unwrap().values().cloned().collect())
    }

    async fn get_book(&self, id: EntityId) -> Result<Option<Book>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.books.lock().unwrap().get(&id).cloned())
    }

    async fn list_books_by_seller(&self, seller_id: EntityId) -> Result<Vec<Book>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let books = self.books.lock().unwrap();
        Ok(books
            .values()
            .filter(|b| b.user_id == seller_id)
            .cloned()
            .collect())
    }

    async fn insert_book(&self, new_book: &CreateBookRequest) -> Result<Book, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let id = self.next_book_id.fetch_add(1, Ordering::Relaxed);
        let book = Book {
            id,
            user_id: new_book.user_id,
            title: new_book.title.clone(),
            description: new_book.description.clone(),
            author: new_book.author.clone(),
            publisher: new_book.publisher.clone(),
            year: new_book.year,
            cover_image_url: new_book.cover_image_url.clone(),
            price_btc: new_book.price_btc.clone(),
            quantity: new_book.quantity,
        };
        self.books.lock().unwrap().insert(id, book.clone());

        Ok(book)
    }

    async fn delete_book(&self, id: EntityId) -> Result<bool, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.books.lock().unwrap().remove(&id).is_some())
    }
}

#[async_trait]
impl TransactionStore for MockGateway {
    async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.transactions.lock().unwrap().values().cloned().collect())
    }

    async fn get_transaction(&self, id: EntityId) -> Result<Option<Transaction>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.transactions.lock().unwrap().get(&id).cloned())
    }

    async fn list_transactions_by_buyer(
        &self,
        buyer_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let transactions = self.transactions.lock().unwrap();
        Ok(transactions
            .values()
            .filter(|t| t.buyer_user_id == buyer_id)
            .cloned()
            .collect())
    }

    async fn list_transactions_by_seller(
        &self,
        seller_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let transactions = self.transactions.lock().unwrap();
        Ok(transactions
            .values()
            .filter(|t| t.seller_user_id == seller_id)
            .cloned()
            .collect())
    }

    async fn insert_transaction(
        &self,
        new_transaction: &CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let id = self.next_transaction_id.fetch_add(1, Ordering::Relaxed);
        let transaction = Transaction {
            id,
            buyer_user_id: new_transaction.buyer_user_id,
            seller_user_id: new_transaction.seller_user_id,
            book_id: new_transaction.book_id,
            amount_btc: new_transaction.amount_btc.clone(),
            date: new_transaction.date.unwrap_or_else(Utc::now),
        };
        self.transactions
            .lock()
            .unwrap()
            .insert(id, transaction.clone());

        Ok(transaction)
    }

    async fn delete_transaction(&self, id: EntityId) -> Result<bool, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.transactions.lock().unwrap().remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn user_request(email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: "ana".to_string(),
            email: email.to_string(),
            password: "p1".to_string(),
            wallet_address: "w1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_insert_and_get_user() {
        let mock = MockGateway::new();

        let created = mock.insert_user(&user_request("ana@x.com")).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = mock.get_user(created.id).await.unwrap();
        assert_eq!(fetched.unwrap().email, "ana@x.com");
    }

    #[tokio::test]
    async fn test_mock_ids_are_sequential() {
        let mock = MockGateway::new();

        let first = mock.insert_user(&user_request("a@x.com")).await.unwrap();
        let second = mock.insert_user(&user_request("b@x.com")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_mock_duplicate_email_rejected() {
        let mock = MockGateway::new();

        mock.insert_user(&user_request("ana@x.com")).await.unwrap();
        let result = mock.insert_user(&user_request("ana@x.com")).await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::Database(DatabaseError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_failure_config() {
        let mock = MockGateway::failing("Connection timeout");

        let result = mock.insert_user(&user_request("ana@x.com")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_call_count() {
        let mock = MockGateway::new();
        assert_eq!(mock.call_count(), 0);

        let _ = mock.health_check().await;
        assert_eq!(mock.call_count(), 1);

        let _ = mock.get_user(1).await;
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_health_toggle() {
        let mock = MockGateway::new();
        assert!(mock.health_check().await.is_ok());

        mock.set_healthy(false);
        assert!(mock.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_transaction_insert_stamps_date() {
        let mock = MockGateway::new();

        let request = CreateTransactionRequest {
            buyer_user_id: 2,
            seller_user_id: 1,
            book_id: 1,
            amount_btc: BigDecimal::from_str("0.01").unwrap(),
            date: None,
        };

        let before = Utc::now();
        let tx = mock.insert_transaction(&request).await.unwrap();
        let after = Utc::now();

        assert!(tx.date >= before && tx.date <= after);
    }
}
