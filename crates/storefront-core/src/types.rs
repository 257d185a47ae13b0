//! # Domain Types
//!
//! Core domain types used throughout Storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      User       │   │   Cart (cart.rs)│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  title          │   │  username       │   │  user_id  (FK)  │       │
//! │  │  price (Money)  │   │  email (unique) │   │  items          │       │
//! │  │  category       │   │  password_hash  │   │   product_id    │       │
//! │  └─────────────────┘   └─────────────────┘   │   quantity      │       │
//! │           ▲                                   └────────┬────────┘       │
//! │           └────────────────────────────────────────────┘                │
//! │                                                                         │
//! │  ProductDraft / UserDraft: validated input for create and update        │
//! │  Snapshot: carts + products read together, input to analytics           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are opaque strings. Server-created records get a UUID v4; records
//! imported by the seed loader keep the id the external catalogue gave them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::Cart;
use crate::money::Money;
use crate::validation::{
    validate_category, validate_description, validate_email, validate_password, validate_price,
    validate_title, validate_username, ValidationResult,
};

/// Generates a new server-side identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Unit price in cents.
    pub price: Money,

    /// Optional long description (at most 5000 characters).
    pub description: Option<String>,

    /// Category name used for grouping (e.g. "electronics").
    pub category: String,

    /// Optional image URL.
    pub image: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product from a validated draft with a fresh UUID.
    pub fn new(draft: ProductDraft) -> Self {
        Product::with_id(new_id(), draft)
    }

    /// Creates a product with a caller-chosen id (seed import).
    pub fn with_id(id: impl Into<String>, draft: ProductDraft) -> Self {
        let now = Utc::now();
        Product {
            id: id.into(),
            title: draft.title,
            price: draft.price,
            description: draft.description,
            category: draft.category,
            image: draft.image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field with the draft's values.
    pub fn apply(&mut self, draft: ProductDraft) {
        self.title = draft.title;
        self.price = draft.price;
        self.description = draft.description;
        self.category = draft.category;
        self.image = draft.image;
        self.updated_at = Utc::now();
    }
}

/// Editable product fields, as accepted by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub price: Money,
    pub description: Option<String>,
    pub category: String,
    pub image: Option<String>,
}

impl ProductDraft {
    /// Checks every field rule; the first violation wins.
    ///
    /// ## Rules
    /// - title and category are required
    /// - price must be positive
    /// - description is at most 5000 characters
    pub fn validate(&self) -> ValidationResult<()> {
        validate_title(&self.title)?;
        validate_price(self.price)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        validate_category(&self.category)?;
        Ok(())
    }
}

/// Sort order for price listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

// =============================================================================
// User
// =============================================================================

/// A registered user. Owns zero or more carts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier.
    pub id: String,

    /// Login name.
    pub username: String,

    /// Email address, unique across users.
    pub email: String,

    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the user was created.
    pub created_at: DateTime<Utc>,

    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with a fresh UUID and an already-hashed password.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        User::with_id(new_id(), username, email, password_hash)
    }

    /// Creates a user with a caller-chosen id (seed import).
    pub fn with_id(
        id: impl Into<String>,
        username: String,
        email: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        User {
            id: id.into(),
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User fields as accepted by create and update (plaintext password).
#[derive(Clone, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserDraft {
    /// Checks username, email format and password length.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

impl std::fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDraft")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Carts and products read at one point in time.
///
/// Every analytics function takes a snapshot and recomputes from scratch;
/// nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub carts: Vec<Cart>,
    pub products: Vec<Product>,
}

impl Snapshot {
    pub fn new(carts: Vec<Cart>, products: Vec<Product>) -> Self {
        Snapshot { carts, products }
    }

    /// Index of the product store by id.
    pub fn product_index(&self) -> HashMap<&str, &Product> {
        self.products.iter().map(|p| (p.id.as_str(), p)).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
