//! Application service layer.
//!
//! The services in this module hold the only decision logic in the backend:
//! entity validation, email uniqueness, credential verification, and the
//! transaction business rules. Everything else is delegated to the store
//! traits, keeping each call a single stateless round-trip.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use tracing::{info, instrument, warn};

use crate::domain::{
    AppError, Book, BookStore, CreateBookRequest, CreateTransactionRequest, EntityId,
    RegisterUserRequest, Transaction, TransactionStore, User, UserStore, ValidationError,
};

/// Business logic for user registration, lookup, and credential checks.
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Registers a new user.
    ///
    /// The email must pass the minimal shape check (contain `@` and `.`).
    /// Uniqueness is guaranteed by the store's UNIQUE constraint on email; a
    /// second registration with the same address surfaces as
    /// `DatabaseError::Duplicate`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a malformed email and
    /// `AppError::Database` for duplicates or store failures.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterUserRequest) -> Result<User, AppError> {
        validate_email(&request.email).map_err(|e| {
            warn!(error = %e, "Rejected registration with malformed email");
            AppError::Validation(e)
        })?;

        let user = self.store.insert_user(request).await?;
        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// All registered users.
    #[instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<User>, AppError> {
        self.store.list_users().await
    }

    /// Looks up a user by id; `None` means no such user, not a failure.
    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: EntityId) -> Result<Option<User>, AppError> {
        self.store.get_user(id).await
    }

    /// Looks up a user by email; `None` means no such user, not a failure.
    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.store.get_user_by_email(email).await
    }

    /// Deletes a user by id; `Ok(false)` when no row existed.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: EntityId) -> Result<bool, AppError> {
        self.store.delete_user(id).await
    }

    /// Checks a login attempt against the stored credentials.
    ///
    /// Resolves to a boolean for both "unknown email" and "wrong password";
    /// a mismatch is never an error, so the response shape does not reveal
    /// whether the account exists. The comparison is byte-exact.
    ///
    /// # Errors
    ///
    /// Only store failures are returned as `Err`.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        let Some(user) = self.store.get_user_by_email(email).await? else {
            return Ok(false);
        };

        Ok(user.verify_password(password))
    }
}

/// Business logic for book listings.
///
/// Pure pass-through: listings carry no rules beyond what the HTTP layer
/// already rejects (absent bodies), so every operation delegates directly.
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    #[must_use]
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get_books(&self) -> Result<Vec<Book>, AppError> {
        self.store.list_books().await
    }

    #[instrument(skip(self))]
    pub async fn get_book_by_id(&self, id: EntityId) -> Result<Option<Book>, AppError> {
        self.store.get_book(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_books_by_seller(&self, seller_id: EntityId) -> Result<Vec<Book>, AppError> {
        self.store.list_books_by_seller(seller_id).await
    }

    /// Persists a new listing and returns it with the store-assigned id.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn add_book(&self, request: &CreateBookRequest) -> Result<Book, AppError> {
        let book = self.store.insert_book(request).await?;
        info!(book_id = book.id, seller_id = book.user_id, "Book listed");
        Ok(book)
    }

    #[instrument(skip(self))]
    pub async fn delete_book(&self, id: EntityId) -> Result<bool, AppError> {
        self.store.delete_book(id).await
    }
}

/// Business logic for recording and querying sales.
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
}

impl TransactionService {
    #[must_use]
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get_all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        self.store.list_transactions().await
    }

    #[instrument(skip(self))]
    pub async fn get_transaction_by_id(
        &self,
        id: EntityId,
    ) -> Result<Option<Transaction>, AppError> {
        self.store.get_transaction(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_transactions_by_buyer(
        &self,
        buyer_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError> {
        self.store.list_transactions_by_buyer(buyer_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_transactions_by_seller(
        &self,
        seller_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError> {
        self.store.list_transactions_by_seller(seller_id).await
    }

    /// Records a sale after checking the business rules.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` naming the first violated rule, or
    /// `AppError::Database` for store failures.
    #[instrument(skip(self, request), fields(book_id = request.book_id))]
    pub async fn add_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        validate_transaction(request).map_err(|e| {
            warn!(error = %e, "Rejected transaction");
            AppError::Validation(e)
        })?;

        let transaction = self.store.insert_transaction(request).await?;
        info!(
            transaction_id = transaction.id,
            buyer_id = transaction.buyer_user_id,
            seller_id = transaction.seller_user_id,
            "Transaction recorded"
        );
        Ok(transaction)
    }

    #[instrument(skip(self))]
    pub async fn delete_transaction(&self, id: EntityId) -> Result<bool, AppError> {
        self.store.delete_transaction(id).await
    }
}

/// Minimal email shape check: must contain `@` and `.`.
fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !email.contains('@') || !email.contains('.') {
        return Err(ValidationError::invalid_field(
            "email",
            "email must contain '@' and '.'",
        ));
    }
    Ok(())
}

/// Sequential business-rule check; only the first violated rule is reported.
/// The order is fixed: buyer, seller, book, amount.
fn validate_transaction(request: &CreateTransactionRequest) -> Result<(), ValidationError> {
    if request.buyer_user_id <= 0 {
        return Err(ValidationError::invalid_field(
            "buyerUserId",
            "buyer id invalid",
        ));
    }

    if request.seller_user_id <= 0 {
        return Err(ValidationError::invalid_field(
            "sellerUserId",
            "seller id invalid",
        ));
    }

    if request.book_id <= 0 {
        return Err(ValidationError::invalid_field("bookId", "book id invalid"));
    }

    if request.amount_btc <= BigDecimal::from(0) {
        return Err(ValidationError::invalid_field(
            "amountBTC",
            "amount must be positive",
        ));
    }

    Ok(())
}
