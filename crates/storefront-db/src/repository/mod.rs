//! # Repository Module
//!
//! Data access layer following the Repository pattern.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Service (api app)                                                     │
//! │       │                                                                 │
//! │       │  db.carts().find_by_user_id("1")                               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  ProductRepository   UserRepository   CartRepository            │   │
//! │  │  ─────────────────   ──────────────   ──────────────            │   │
//! │  │  search, price       by email,        aggregate save,           │   │
//! │  │  range, sorted       by username      lines by position         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool ──► storefront.db                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries use sqlx's runtime API (`query_as::<_, T>` + `bind`) and return
//! core types directly.

pub mod cart;
pub mod product;
pub mod user;
