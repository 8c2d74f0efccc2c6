//! Errors raised while reading or writing orders and shipments.

use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,

    #[error("database error: {0}")]
    DatabaseError(String),

    /// Stored or submitted data does not fit the model.
    #[error("invalid data: {0}")]
    ValidationError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("{kind} constraint violated: {message}")]
    ConstraintViolation { kind: &'static str, message: String },

    /// The rows changed since the caller read them. The message is meant for
    /// the admin.
    #[error("{0}")]
    Conflict(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn constraint_kind(kind: &DatabaseErrorKind) -> Option<&'static str> {
    match kind {
        DatabaseErrorKind::UniqueViolation => Some("unique"),
        DatabaseErrorKind::ForeignKeyViolation => Some("foreign key"),
        DatabaseErrorKind::NotNullViolation => Some("not null"),
        DatabaseErrorKind::CheckViolation => Some("check"),
        _ => None,
    }
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => match constraint_kind(&kind) {
                Some(kind) => RepositoryError::ConstraintViolation {
                    kind,
                    message: info.message().to_string(),
                },
                None => RepositoryError::DatabaseError(info.message().to_string()),
            },
            DieselError::SerializationError(_) | DieselError::DeserializationError(_) => {
                RepositoryError::ValidationError(err.to_string())
            }
            DieselError::RollbackTransaction | DieselError::BrokenTransactionManager => {
                RepositoryError::DatabaseError(err.to_string())
            }
            other => RepositoryError::Unexpected(other.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(err.to_string())
    }
}
