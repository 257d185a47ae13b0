//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Missing resources, duplicate email             │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  storefront-api errors (in app)                                        │
//! │  └── ApiError         - What HTTP clients see                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → JSON error body        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve.
    ///
    /// ## When This Occurs
    /// - GET/PUT/DELETE on an unknown product
    /// - Cart request referencing an unknown product
    /// - Removing a line item the cart does not have
    #[error("Product not found with ID: {0}")]
    ProductNotFound(String),

    /// User id does not resolve.
    #[error("User not found with ID: {0}")]
    UserNotFound(String),

    /// Lookup by username found nothing.
    #[error("User not found with username: {0}")]
    UsernameNotFound(String),

    /// Lookup by email found nothing.
    #[error("User not found with email: {0}")]
    EmailNotFound(String),

    /// Cart id does not resolve.
    #[error("Cart not found with ID: {0}")]
    CartNotFound(String),

    /// Another account already uses this email.
    ///
    /// ## User Workflow
    /// ```text
    /// POST /users { email: "ana@mail.com" }
    ///      │
    ///      ▼
    /// users.exists_by_email("ana@mail.com") = true
    ///      │
    ///      ▼
    /// DuplicateEmail("ana@mail.com") → 400
    /// ```
    #[error("The email address '{0}' is already associated with an existing account.")]
    DuplicateEmail(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for the "no such resource" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::UserNotFound(_)
                | CoreError::UsernameNotFound(_)
                | CoreError::EmailNotFound(_)
                | CoreError::CartNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, non-finite number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ProductNotFound("p1".to_string());
        assert_eq!(err.to_string(), "Product not found with ID: p1");

        let err = CoreError::DuplicateEmail("ana@mail.com".to_string());
        assert_eq!(
            err.to_string(),
            "The email address 'ana@mail.com' is already associated with an existing account."
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_is_not_found() {
        assert!(CoreError::CartNotFound("c1".into()).is_not_found());
        assert!(CoreError::EmailNotFound("a@b".into()).is_not_found());
        assert!(!CoreError::DuplicateEmail("a@b".into()).is_not_found());
    }
}
