use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::{error, warn};

/// Error types for the data access layer
#[derive(Error, Debug)]
pub enum DaoError {
    /// No row exists for the requested primary key
    #[error("User '{0}' not found")]
    NotFound(String),

    /// A row with the same primary key (or unique value) already exists
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// A foreign key constraint rejected the statement
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Input rejected before it reached the database
    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The database could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any other error from the database operations
    #[error("Database error: {0}")]
    Database(#[source] DbErr),
}

impl From<DbErr> for DaoError {
    fn from(db_error: DbErr) -> Self {
        match db_error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                warn!("Unique constraint violated: {}", message);
                return DaoError::AlreadyExists(message);
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                warn!("Foreign key constraint violated: {}", message);
                return DaoError::ConstraintViolation(message);
            }
            _ => {}
        }

        match db_error {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                let err = DaoError::Connection(db_error.to_string());
                error!(?err, "Database connection unavailable");
                err
            }
            other => {
                error!("Database error: {}", other);
                DaoError::Database(other)
            }
        }
    }
}

/// Type alias for Result with DaoError
pub type Result<T> = std::result::Result<T, DaoError>;
