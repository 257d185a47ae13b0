//! Seeds the configured database from the catalogue and exits.
//!
//! Uses the same `storefront.toml` / `STOREFRONT_*` settings as the server.
//! Tables that already hold rows are left untouched.

use storefront_api::config::ApiConfig;
use storefront_api::{init_tracing, seed_from_catalogue};
use storefront_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load()?;
    init_tracing(&config.logging.filter);

    let db = Database::new(config.db_config()).await?;
    let report = seed_from_catalogue(&db, &config).await?;
    db.close().await;

    println!(
        "users: {:?}\nproducts: {:?}\ncarts: {:?}",
        report.users, report.products, report.carts
    );
    Ok(())
}
