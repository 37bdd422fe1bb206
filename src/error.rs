//! # Error Types
//!
//! Structured errors for the hydration engine. Grouping is a pure
//! transformation, so every failure raised by a collaborator (type registry,
//! statement, association hooks, entity factories) surfaces here unchanged
//! instead of being swallowed mid-row.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HydrationError {
    /// Raised for operations the cursor cannot honour, e.g. rewinding an
    /// un-buffered result set.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Type conversion error: {table}.{column} ({type_name}): {message}")]
    TypeConversion {
        table: String,
        column: String,
        type_name: String,
        message: String,
    },

    #[error("Unknown column type '{type_name}' for {table}.{column}")]
    UnknownType {
        table: String,
        column: String,
        type_name: String,
    },

    #[error("Entity hydration failed for {entity} (alias {alias}): {message}")]
    EntityHydration {
        entity: String,
        alias: String,
        message: String,
    },

    #[error("Association error: {association}: {message}")]
    Association {
        association: String,
        message: String,
    },

    #[error("Statement error: {0}")]
    Statement(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HydrationError {
    /// Build the error reported when an un-buffered cursor is asked to rewind.
    pub fn unbuffered_rewind() -> Self {
        HydrationError::UnsupportedOperation(
            "You cannot rewind an un-buffered ResultSet. Enable result buffering on the query \
             to get a buffered ResultSet."
                .to_string(),
        )
    }

    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, HydrationError::UnsupportedOperation(_))
    }
}

impl From<serde_json::Error> for HydrationError {
    fn from(error: serde_json::Error) -> Self {
        HydrationError::Snapshot(format!("JSON serialization error: {error}"))
    }
}

impl From<config::ConfigError> for HydrationError {
    fn from(error: config::ConfigError) -> Self {
        HydrationError::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HydrationError>;
