// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for the SmartOne identity core.
//!
//! # Error Hierarchy
//!
//! ```text
//! CoreError (root)
//! ├── StoreError      - Identity directory lookups and mutations
//! ├── PasswordError   - Password hashing and verification
//! └── AuditError      - Audit logging
//! ```
//!
//! # Examples
//!
//! ```
//! use smartone_core::error::{CoreError, StoreError};
//!
//! let error = StoreError::unavailable("connection reset");
//! assert!(error.is_unavailable());
//!
//! let core_error: CoreError = error.into();
//! assert_eq!(core_error.error_type(), "store");
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::audit::AuditError;

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result alias for identity store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// CoreError - Root Error Type
// =============================================================================

/// The root error type for the identity core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Identity store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing error.
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    /// Audit logging error.
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    /// Invalid input to an administrative operation.
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid input error.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            CoreError::Store(_) => "store",
            CoreError::Password(_) => "password",
            CoreError::Audit(_) => "audit",
            CoreError::InvalidInput { .. } => "invalid_input",
        }
    }

    /// Returns a message that is safe to show to end users.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Store(e) => e.user_message(),
            CoreError::Password(_) => "Password could not be processed".to_string(),
            CoreError::Audit(_) => "Audit log is unavailable".to_string(),
            CoreError::InvalidInput { field, message } => format!("Invalid {}: {}", field, message),
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Identity store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record (user, role, permission).
        entity: &'static str,
        /// Lookup key.
        key: String,
    },

    /// A unique key is already taken.
    #[error("{entity} already exists: {key}")]
    Duplicate {
        /// Kind of record.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// A user references a role that is not in the directory.
    #[error("Unknown role: {role_id}")]
    UnknownRole {
        /// The dangling role id.
        role_id: String,
    },

    /// The backing store cannot serve requests.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Snapshot file could not be read or written.
    #[error("Snapshot I/O failed for {path}: {source}")]
    Io {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not valid.
    #[error("Snapshot is corrupted: {message}")]
    Corrupted {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            key: key.into(),
        }
    }

    /// Creates an unknown role error.
    pub fn unknown_role(role_id: impl ToString) -> Self {
        Self::UnknownRole {
            role_id: role_id.to_string(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unavailable error with source.
    pub fn unavailable_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an I/O error for a snapshot path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a corrupted snapshot error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Returns `true` if the store itself failed, as opposed to a lookup miss
    /// or a constraint violation.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. } | StoreError::Io { .. } | StoreError::Corrupted { .. }
        )
    }

    /// Returns `true` if the error is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns the error type for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Duplicate { .. } => "duplicate",
            StoreError::UnknownRole { .. } => "unknown_role",
            StoreError::Unavailable { .. } => "unavailable",
            StoreError::Io { .. } => "io",
            StoreError::Corrupted { .. } => "corrupted",
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// Failures of the store itself collapse into one generic sentence.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::NotFound { entity, .. } => format!("{} not found", entity),
            StoreError::Duplicate { entity, key } => format!("{} already exists: {}", entity, key),
            StoreError::UnknownRole { .. } => "Role does not exist".to_string(),
            StoreError::Unavailable { .. } | StoreError::Io { .. } | StoreError::Corrupted { .. } => {
                "Service temporarily unavailable".to_string()
            }
        }
    }
}

// =============================================================================
// PasswordError
// =============================================================================

/// Password hashing errors.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The system random source failed.
    #[error("Failed to generate salt: {0}")]
    Salt(String),

    /// Hashing failed.
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string.
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    /// The blocking hashing task did not complete.
    #[error("Password task failed: {0}")]
    Task(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_classification() {
        assert!(StoreError::unavailable("down").is_unavailable());
        assert!(StoreError::corrupted("bad json").is_unavailable());
        assert!(!StoreError::not_found("user", "a@b.c").is_unavailable());
        assert!(StoreError::not_found("user", "a@b.c").is_not_found());
        assert!(!StoreError::duplicate("permission", "finance.read").is_unavailable());
    }

    #[test]
    fn test_store_error_user_message_hides_detail() {
        let error = StoreError::unavailable("pg: connection refused at 10.0.0.4:5432");
        assert_eq!(error.user_message(), "Service temporarily unavailable");
        assert!(!error.user_message().contains("10.0.0.4"));
    }

    #[test]
    fn test_core_error_conversion() {
        let core: CoreError = StoreError::unknown_role("r-1").into();
        assert_eq!(core.error_type(), "store");
        assert_eq!(core.user_message(), "Role does not exist");

        let core: CoreError = PasswordError::Hash("boom".into()).into();
        assert_eq!(core.error_type(), "password");
    }

    #[test]
    fn test_not_found_display() {
        let error = StoreError::not_found("user", "ghost@smartone-erp.com");
        assert_eq!(error.to_string(), "user not found: ghost@smartone-erp.com");
    }
}
