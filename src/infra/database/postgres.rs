//! PostgreSQL persistence gateway implementation.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::{
    AppError, Book, BookStore, CreateBookRequest, CreateTransactionRequest, DatabaseError,
    EntityId, HealthProbe, RegisterUserRequest, Transaction, TransactionStore, User, UserStore,
};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// PostgreSQL gateway with connection pooling.
///
/// One instance implements every store trait; connections are acquired from
/// the pool per statement and released on every exit path, including errors.
pub struct PostgresGateway {
    pool: PgPool,
}

impl PostgresGateway {
    /// Create a new gateway with custom pool configuration
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a new gateway with default pool configuration
    pub async fn with_defaults(database_url: &str) -> Result<Self, AppError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Run database migrations using sqlx migrate
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Migration(e.to_string())))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying connection pool (for testing)
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> User {
        User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password: row.get("password"),
            wallet_address: row.get("wallet_address"),
        }
    }

    fn row_to_book(row: &sqlx::postgres::PgRow) -> Book {
        Book {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            description: row.get("description"),
            author: row.get("author"),
            publisher: row.get("publisher"),
            year: row.get("year"),
            cover_image_url: row.get("cover_image_url"),
            price_btc: row.get::<BigDecimal, _>("price_btc"),
            quantity: row.get("quantity"),
        }
    }

    fn row_to_transaction(row: &sqlx::postgres::PgRow) -> Transaction {
        Transaction {
            id: row.get("id"),
            buyer_user_id: row.get("buyer_user_id"),
            seller_user_id: row.get("seller_user_id"),
            book_id: row.get("book_id"),
            amount_btc: row.get::<BigDecimal, _>("amount_btc"),
            date: row.get("date"),
        }
    }
}

#[async_trait]
impl HealthProbe for PostgresGateway {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresGateway {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(
            "SELECT id, username, email, password, wallet_address FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(rows.iter().map(Self::row_to_user).collect())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: EntityId) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, password, wallet_address FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, password, wallet_address FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn insert_user(&self, new_user: &RegisterUserRequest) -> Result<User, AppError> {
        // The UNIQUE constraint on users.email makes this the atomic
        // insert-if-absent; 23505 comes back as DatabaseError::Duplicate.
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password, wallet_address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password, wallet_address
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(&new_user.wallet_address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        Ok(Self::row_to_user(&row))
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: EntityId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookStore for PostgresGateway {
    #[instrument(skip(self))]
    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, author, publisher, year,
                   cover_image_url, price_btc, quantity
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(rows.iter().map(Self::row_to_book).collect())
    }

    #[instrument(skip(self))]
    async fn get_book(&self, id: EntityId) -> Result<Option<Book>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, description, author, publisher, year,
                   cover_image_url, price_btc, quantity
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(row.as_ref().map(Self::row_to_book))
    }

    #[instrument(skip(self))]
    async fn list_books_by_seller(&self, seller_id: EntityId) -> Result<Vec<Book>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, author, publisher, year,
                   cover_image_url, price_btc, quantity
            FROM books
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(rows.iter().map(Self::row_to_book).collect())
    }

    #[instrument(skip(self, new_book), fields(title = %new_book.title))]
    async fn insert_book(&self, new_book: &CreateBookRequest) -> Result<Book, AppError> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (user_id, title, description, author, publisher,
                               year, cover_image_url, price_btc, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, title, description, author, publisher, year,
                      cover_image_url, price_btc, quantity
            "#,
        )
        .bind(new_book.user_id)
        .bind(&new_book.title)
        .bind(&new_book.description)
        .bind(&new_book.author)
        .bind(&new_book.publisher)
        .bind(new_book.year)
        .bind(&new_book.cover_image_url)
        .bind(&new_book.price_btc)
        .bind(new_book.quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        Ok(Self::row_to_book(&row))
    }

    #[instrument(skip(self))]
    async fn delete_book(&self, id: EntityId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TransactionStore for PostgresGateway {
    #[instrument(skip(self))]
    async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_user_id, seller_user_id, book_id, amount_btc, date
            FROM transactions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(rows.iter().map(Self::row_to_transaction).collect())
    }

    #[instrument(skip(self))]
    async fn get_transaction(&self, id: EntityId) -> Result<Option<Transaction>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, buyer_user_id, seller_user_id, book_id, amount_btc, date
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(row.as_ref().map(Self::row_to_transaction))
    }

    #[instrument(skip(self))]
    async fn list_transactions_by_buyer(
        &self,
        buyer_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_user_id, seller_user_id, book_id, amount_btc, date
            FROM transactions
            WHERE buyer_user_id = $1
            ORDER BY id
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(rows.iter().map(Self::row_to_transaction).collect())
    }

    #[instrument(skip(self))]
    async fn list_transactions_by_seller(
        &self,
        seller_id: EntityId,
    ) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_user_id, seller_user_id, book_id, amount_btc, date
            FROM transactions
            WHERE seller_user_id = $1
            ORDER BY id
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(rows.iter().map(Self::row_to_transaction).collect())
    }

    #[instrument(skip(self, new_transaction), fields(book_id = new_transaction.book_id))]
    async fn insert_transaction(
        &self,
        new_transaction: &CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        let date = new_transaction.date.unwrap_or_else(Utc::now);

        let row = sqlx::query(
            r#"
            INSERT INTO transactions (buyer_user_id, seller_user_id, book_id, amount_btc, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, buyer_user_id, seller_user_id, book_id, amount_btc, date
            "#,
        )
        .bind(new_transaction.buyer_user_id)
        .bind(new_transaction.seller_user_id)
        .bind(new_transaction.book_id)
        .bind(&new_transaction.amount_btc)
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        Ok(Self::row_to_transaction(&row))
    }

    #[instrument(skip(self))]
    async fn delete_transaction(&self, id: EntityId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Query(e.to_string())))?;

        Ok(result.rows_affected() > 0)
    }
}
