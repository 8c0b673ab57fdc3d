//! Error type shared by the catalog, the storage layer and the update engine.

use thiserror::Error;

/// Library-level error. The binary wraps these in `anyhow` with context.
#[derive(Error, Debug)]
pub enum OddsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Lookahead must be zero or more days, got {0}")]
    InvalidLookahead(i64),

    #[error("Invalid slug '{0}': use lowercase letters, digits and '-'")]
    InvalidSlug(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, OddsError>;

impl OddsError {
    /// Translate a unique-constraint violation into `Duplicate`, leaving every
    /// other database error untouched.
    pub fn from_insert(err: sqlx::Error, entity: &'static str, key: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => OddsError::Duplicate {
                entity,
                key: key.into(),
            },
            _ => OddsError::Database(err),
        }
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        OddsError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
