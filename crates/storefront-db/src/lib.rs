//! # storefront-db: Database Layer for Storefront
//!
//! SQLite persistence for products, users and carts, plus the idempotent
//! catalogue seeding routine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  axum handler ──► service (api app)                                    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ UserRepo      │    │ 001_initial_ │  │   │
//! │  │   │ snapshot()    │    │ CartRepo      │    │  schema.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   seed.rs: CatalogSource ──► seed_if_empty                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                 storefront.db (SQLite, WAL)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, user, cart)
//! - [`seed`] - Import from an external catalogue into empty tables
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//!
//! let cheapest = db.products().find_all_sorted_by_price(SortDirection::Ascending).await?;
//! let snapshot = db.snapshot().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
pub use seed::{seed_if_empty, CatalogSource, CollectionReport, SeedError, SeedReport};
