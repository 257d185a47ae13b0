//! # Storefront API
//!
//! REST server for the product catalogue, user accounts and shopping carts.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP ──► router (middleware) ──► routes::* ──► services::* ──► db     │
//! │                                      │               │                 │
//! │                                      ▼               ▼                 │
//! │                                 dto (wire)     storefront_core         │
//! │                                                (rules, analytics)      │
//! │                                                                         │
//! │  Errors from any layer become ApiError ──► JSON error body             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod fakestore;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;

use storefront_db::{seed_if_empty, Database, SeedError, SeedReport};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::ApiConfig;
use crate::fakestore::FakeStoreClient;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Seeds empty tables from the configured catalogue.
pub async fn seed_from_catalogue(
    db: &Database,
    config: &ApiConfig,
) -> Result<SeedReport, SeedError> {
    let client = FakeStoreClient::new(&config.seed.base_url, config.seed_timeout())?;
    let report = seed_if_empty(db, &client).await?;
    tracing::info!(?report, "Catalogue seeding finished");
    Ok(report)
}
