//! # storefront-core: Pure Business Logic for Storefront
//!
//! This crate contains the catalogue's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP (axum routes)                           │   │
//! │  │    /products  /users  /carts  /cart-products                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ analytics │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ most_sold │  │   │
//! │  │   │   User    │  │  (cents)  │  │ LineItem  │  │  revenue  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-db (Database Layer)                  │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, User, Snapshot)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart aggregate and assembly rules
//! - [`analytics`] - Aggregations over a snapshot of carts and products
//! - [`pagination`] - Page requests and page envelopes
//! - [`password`] - Argon2id hashing
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! // Prices arrive as decimals at the API boundary
//! let price = Money::from_decimal(109.95).unwrap();
//! assert_eq!(price.cents(), 10995);
//!
//! let line_total = price * 2;
//! assert_eq!(line_total.to_string(), "$219.90");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod cart;
pub mod error;
pub mod money;
pub mod pagination;
pub mod password;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use storefront_core::Money` instead of
// `use storefront_core::money::Money`

pub use cart::{Cart, LineItem, LineRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pagination::{Page, PageRequest};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of entries returned by the top-N endpoints when `topN` is omitted.
pub const DEFAULT_TOP_N: i64 = 5;

/// Maximum length of a product description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Minimum length of a user password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Largest quantity a single line item may hold, after merging.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Most lines a single cart request may carry.
pub const MAX_CART_LINES: usize = 1000;

/// Highest accepted product price, in cents (10,000,000.00).
///
/// With [`MAX_QUANTITY`] this keeps a line total below 10^16 cents.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on the requested page size.
pub const MAX_PAGE_SIZE: u32 = 2000;
