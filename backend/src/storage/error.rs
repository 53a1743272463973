//! Classification of sqlx failures into constraint categories the domain
//! layer can translate into user-facing messages.

use sqlx::error::ErrorKind;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error("not null constraint violated: {0}")]
    NotNullViolation(String),

    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    /// Raw driver message carried by every variant
    pub fn message(&self) -> &str {
        match self {
            StorageError::UniqueViolation(msg)
            | StorageError::ForeignKeyViolation(msg)
            | StorageError::CheckViolation(msg)
            | StorageError::NotNullViolation(msg)
            | StorageError::Database(msg) => msg,
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => StorageError::UniqueViolation(message),
                    ErrorKind::ForeignKeyViolation => StorageError::ForeignKeyViolation(message),
                    ErrorKind::CheckViolation => StorageError::CheckViolation(message),
                    ErrorKind::NotNullViolation => StorageError::NotNullViolation(message),
                    _ => StorageError::Database(message),
                }
            }
            _ => StorageError::Database(err.to_string()),
        }
    }
}
