//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, ConfigError, DatabaseError, ValidationError};
pub use traits::{BookStore, HealthProbe, TransactionStore, UserStore};
pub use types::{
    Book, CreateBookRequest, CreateTransactionRequest, EntityId, ErrorDetail, ErrorResponse,
    HealthResponse, HealthStatus, LoginRequest, LoginResponse, MessageResponse,
    RegisterUserRequest, Transaction, User,
};
