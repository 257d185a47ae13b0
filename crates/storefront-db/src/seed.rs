//! # Catalogue Seeding
//!
//! Imports users, products and carts from an external catalogue into empty
//! tables.
//!
//! ## Seed Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  seed_if_empty(db, source)                                             │
//! │       │                                                                 │
//! │       ├── users     count == 0 ? fetch ─► validate ─► hash ─► insert    │
//! │       │                                                                 │
//! │       ├── products  count == 0 ? fetch ─► validate ─► insert            │
//! │       │                                                                 │
//! │       └── carts     count == 0 ? fetch ─► resolve user/products ─► save │
//! │                                                                         │
//! │  A table that already has rows is left alone. A collection the source  │
//! │  cannot deliver is logged and skipped; the others still import.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The source is injected through [`CatalogSource`]; the api app provides
//! the HTTP implementation, tests provide in-memory fakes.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use storefront_core::password::hash_password;
use storefront_core::validation::parse_price;
use storefront_core::{Cart, CoreError, Product, ProductDraft, User, UserDraft};

use crate::error::DbError;
use crate::pool::Database;

// =============================================================================
// Source Records
// =============================================================================

/// A user as delivered by the catalogue source (plaintext password).
#[derive(Clone, PartialEq)]
pub struct SeedUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// A product as delivered by the catalogue source (decimal price).
#[derive(Debug, Clone, PartialEq)]
pub struct SeedProduct {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub category: String,
    pub image: Option<String>,
}

/// A cart as delivered by the catalogue source.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedCart {
    pub id: String,
    pub user_id: String,
    /// `(product_id, quantity)` in source order.
    pub lines: Vec<(String, i64)>,
}

// =============================================================================
// Source Trait
// =============================================================================

/// Where seed data comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<SeedUser>, SeedError>;

    async fn fetch_products(&self) -> Result<Vec<SeedProduct>, SeedError>;

    async fn fetch_carts(&self) -> Result<Vec<SeedCart>, SeedError>;
}

// =============================================================================
// Errors & Report
// =============================================================================

/// Seeding errors.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The source could not deliver a collection.
    #[error("Failed to fetch {collection}: {message}")]
    Fetch {
        collection: &'static str,
        message: String,
    },

    /// Reading counts or writing rows failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Password hashing failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The blocking hashing task panicked or was cancelled.
    #[error("Seed task failed: {0}")]
    Task(String),
}

impl SeedError {
    pub fn fetch(collection: &'static str, message: impl Into<String>) -> Self {
        SeedError::Fetch {
            collection,
            message: message.into(),
        }
    }
}

/// What happened to one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionReport {
    /// The table already had rows; nothing was fetched.
    AlreadyPopulated,
    /// Rows were fetched and stored.
    Imported { saved: usize, skipped: usize },
    /// The source failed for this collection.
    Unavailable,
}

/// Outcome of [`seed_if_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: CollectionReport,
    pub products: CollectionReport,
    pub carts: CollectionReport,
}

// =============================================================================
// Seeding
// =============================================================================

/// Populates every empty table from `source`.
///
/// ## Errors
/// Only database failures abort seeding. Fetch failures and invalid records
/// are logged and skipped.
pub async fn seed_if_empty(
    db: &Database,
    source: &dyn CatalogSource,
) -> Result<SeedReport, SeedError> {
    info!("Checking whether seeding is needed");

    let users = seed_users(db, source).await?;
    let products = seed_products(db, source).await?;
    let carts = seed_carts(db, source).await?;

    let report = SeedReport {
        users,
        products,
        carts,
    };
    info!(?report, "Seeding finished");
    Ok(report)
}

async fn seed_users(
    db: &Database,
    source: &dyn CatalogSource,
) -> Result<CollectionReport, SeedError> {
    if db.users().count().await? > 0 {
        info!("Users already present, skipping user import");
        return Ok(CollectionReport::AlreadyPopulated);
    }

    let fetched = match source.fetch_users().await {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "User import skipped");
            return Ok(CollectionReport::Unavailable);
        }
    };

    let total = fetched.len();
    let mut seen_ids = HashSet::new();
    let mut seen_emails = HashSet::new();
    let mut accepted = Vec::with_capacity(total);
    for user in fetched {
        let draft = UserDraft {
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
        };
        if let Err(e) = draft.validate() {
            warn!(id = %user.id, error = %e, "Skipping invalid seed user");
            continue;
        }
        if seen_ids.contains(&user.id) || seen_emails.contains(&user.email) {
            warn!(id = %user.id, email = %user.email, "Skipping duplicate seed user");
            continue;
        }
        seen_ids.insert(user.id.clone());
        seen_emails.insert(user.email.clone());
        accepted.push(user);
    }
    let skipped = total - accepted.len();

    // Argon2 is CPU-bound; keep it off the async workers.
    let users = tokio::task::spawn_blocking(move || {
        accepted
            .into_iter()
            .map(|u| {
                let hash = hash_password(&u.password)?;
                Ok(User::with_id(u.id, u.username, u.email, hash))
            })
            .collect::<Result<Vec<_>, CoreError>>()
    })
    .await
    .map_err(|e| SeedError::Task(e.to_string()))??;

    let saved = db.users().insert_all(&users).await?;
    info!(saved, skipped, "Imported users");
    Ok(CollectionReport::Imported { saved, skipped })
}

async fn seed_products(
    db: &Database,
    source: &dyn CatalogSource,
) -> Result<CollectionReport, SeedError> {
    if db.products().count().await? > 0 {
        info!("Products already present, skipping product import");
        return Ok(CollectionReport::AlreadyPopulated);
    }

    let fetched = match source.fetch_products().await {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "Product import skipped");
            return Ok(CollectionReport::Unavailable);
        }
    };

    let total = fetched.len();
    let mut seen_ids = HashSet::new();
    let mut products = Vec::with_capacity(total);
    for item in fetched {
        let price = match parse_price(item.price) {
            Ok(price) => price,
            Err(e) => {
                warn!(id = %item.id, error = %e, "Skipping seed product");
                continue;
            }
        };
        let draft = ProductDraft {
            title: item.title,
            price,
            description: item.description,
            category: item.category,
            image: item.image,
        };
        if let Err(e) = draft.validate() {
            warn!(id = %item.id, error = %e, "Skipping seed product");
            continue;
        }
        if !seen_ids.insert(item.id.clone()) {
            warn!(id = %item.id, "Skipping seed product with duplicate id");
            continue;
        }
        products.push(Product::with_id(item.id, draft));
    }

    let saved = db.products().insert_all(&products).await?;
    let skipped = total - saved;
    info!(saved, skipped, "Imported products");
    Ok(CollectionReport::Imported { saved, skipped })
}

async fn seed_carts(
    db: &Database,
    source: &dyn CatalogSource,
) -> Result<CollectionReport, SeedError> {
    if db.carts().count().await? > 0 {
        info!("Carts already present, skipping cart import");
        return Ok(CollectionReport::AlreadyPopulated);
    }

    let fetched = match source.fetch_carts().await {
        Ok(carts) => carts,
        Err(e) => {
            warn!(error = %e, "Cart import skipped");
            return Ok(CollectionReport::Unavailable);
        }
    };

    let user_ids: HashSet<String> = db
        .users()
        .find_all()
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();
    let product_ids: HashSet<String> = db
        .products()
        .find_all()
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let total = fetched.len();
    let mut seen_ids = HashSet::new();
    let mut carts = Vec::with_capacity(total);
    for item in fetched {
        if !user_ids.contains(&item.user_id) {
            warn!(
                id = %item.id,
                user_id = %item.user_id,
                "Skipping seed cart with unknown user"
            );
            continue;
        }
        if !seen_ids.insert(item.id.clone()) {
            warn!(id = %item.id, "Skipping seed cart with duplicate id");
            continue;
        }

        let mut cart = Cart::with_id(item.id, item.user_id);
        for (product_id, quantity) in item.lines {
            if !product_ids.contains(&product_id) {
                warn!(
                    cart_id = %cart.id,
                    product_id = %product_id,
                    "Skipping line with unknown product"
                );
                continue;
            }
            if let Err(e) = cart.add_line(&product_id, quantity) {
                warn!(
                    cart_id = %cart.id,
                    product_id = %product_id,
                    error = %e,
                    "Skipping invalid line"
                );
            }
        }
        carts.push(cart);
    }

    let saved = db.carts().save_all(&carts).await?;
    let skipped = total - saved;
    info!(saved, skipped, "Imported carts");
    Ok(CollectionReport::Imported { saved, skipped })
}

// =============================================================================
// Unit Tests
// =============================================================================
