//! # Validation Module
//!
//! Input validation utilities for Storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum)                                       │
//! │  ├── JSON shape and types (deserialization)                            │
//! │  └── Missing/invalid query parameters                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, positive numbers                        │
//! │  └── Email format, password length                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE(email)                                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("ana@mail.com").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_DESCRIPTION_LENGTH, MAX_PRICE_CENTS, MAX_QUANTITY, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product title (required, non-blank).
pub fn validate_title(title: &str) -> ValidationResult<()> {
    required("title", title)
}

/// Validates a product category (required, non-blank).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    required("category", category)
}

/// Validates a product description.
///
/// ## Rules
/// - At most 5000 characters (counted as chars, not bytes)
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_description;
///
/// assert!(validate_description("short").is_ok());
/// assert!(validate_description(&"é".repeat(5000)).is_ok());
/// assert!(validate_description(&"x".repeat(5001)).is_err());
/// ```
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LENGTH,
        });
    }
    Ok(())
}

/// Validates a product price.
///
/// ## Rules
/// - Must be strictly positive (a price that rounds to zero cents is rejected)
/// - At most [`MAX_PRICE_CENTS`]
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_PRICE_CENTS,
        });
    }
    Ok(())
}

/// Converts a decimal price from a request into cents and validates it.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::parse_price;
///
/// assert_eq!(parse_price(109.95).unwrap().cents(), 10995);
/// assert!(parse_price(-1.0).is_err());
/// assert!(parse_price(f64::NAN).is_err());
/// ```
pub fn parse_price(amount: f64) -> ValidationResult<Money> {
    let price = parse_amount("price", amount)?;
    validate_price(price)?;
    Ok(price)
}

/// Converts any decimal amount (threshold, range bound) into cents.
pub fn parse_amount(field: &str, amount: f64) -> ValidationResult<Money> {
    Money::from_decimal(amount).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a finite number".to_string(),
    })
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /cart-products/{cartId} { productId, quantity: 3 }               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(3) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > MAX_QUANTITY? → Error: OutOfRange                      │
/// │       │                                                                 │
/// │       └── OK → Cart::add_line                                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(quantity_out_of_range());
    }
    Ok(())
}

/// The error for a quantity above [`MAX_QUANTITY`].
pub fn quantity_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: MAX_QUANTITY,
    }
}

/// Validates that an id path/body segment is present.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    required(field, id)
}

// =============================================================================
// User Validators
// =============================================================================

/// Validates a username (required, non-blank).
pub fn validate_username(username: &str) -> ValidationResult<()> {
    required("username", username)
}

/// Validates an email address.
///
/// ## Rules
/// - Required
/// - Exactly one `@` with a non-empty local part and domain
/// - No whitespace
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_email;
///
/// assert!(validate_email("john@gmail.com").is_ok());
/// assert!(validate_email("john").is_err());
/// assert!(validate_email("john@").is_err());
/// assert!(validate_email("jo hn@gmail.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required("email", email)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(invalid("must contain a single '@'"));
    }
    if local.is_empty() || domain.is_empty() {
        return Err(invalid("must look like name@domain"));
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must not start or end with '.'"));
    }

    Ok(())
}

/// Validates a plaintext password.
///
/// ## Rules
/// - At least 6 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Backpack").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_validate_description_counts_chars() {
        assert!(validate_description(&"ü".repeat(MAX_DESCRIPTION_LENGTH)).is_ok());
        assert!(validate_description(&"a".repeat(MAX_DESCRIPTION_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert_eq!(
            validate_quantity(MAX_QUANTITY + 1).unwrap_err().to_string(),
            "quantity must be between 1 and 1000000"
        );
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(0.01).unwrap().cents(), 1);
        assert!(parse_price(0.0).is_err());
        assert!(parse_price(0.001).is_err());
        assert!(parse_price(f64::INFINITY).is_err());
        assert_eq!(parse_price(10_000_000.0).unwrap().cents(), MAX_PRICE_CENTS);
        assert!(parse_price(10_000_000.01).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@@b.com").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
    }
}
