//! Service layer: validation, lookups and aggregation between the HTTP
//! handlers and the repositories.
//!
//! ```text
//! routes::products ──► services::products ──► db.products()
//! routes::carts    ──► services::carts    ──► db.carts() + db.users() + db.products()
//!                                          └─► storefront_core::{cart, analytics}
//! ```
//!
//! Every function takes the [`Database`](storefront_db::Database) handle and
//! returns [`ApiResult`](crate::error::ApiResult); missing resources become
//! the matching `CoreError::*NotFound`.

pub mod cart_products;
pub mod carts;
pub mod products;
pub mod users;
