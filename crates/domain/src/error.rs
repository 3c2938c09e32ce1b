//! Domain error types
//!
//! Every fallible domain operation returns [`DomainError`]. The variants are
//! coarse on purpose: callers match on the class of failure, the message
//! carries the specifics.

use thiserror::Error;

/// Core domain error type for all map graph failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid identifier: {message}")]
    InvalidId { message: String },

    #[error("Not found: {entity} '{id}'")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {message}")]
    Constraint { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

/// Convenience alias used across the domain crate
pub type DomainResult<T> = Result<T, DomainError>;
