//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with pagination
//! - Case-insensitive keyword search on title or description
//! - Inclusive price range and price-ordered listings
//!
//! ## Keyword Search
//! ```text
//! keyword "BACKPACK"
//!      │
//!      ▼
//! instr(lower(title), 'backpack') > 0  OR  instr(lower(description), 'backpack') > 0
//!      │
//!      ▼
//! one row per product (a product matching on both fields appears once)
//! ```
//! `instr` is used instead of `LIKE` so `%` and `_` in the keyword match
//! literally.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use storefront_core::{Money, Page, PageRequest, Product, SortDirection};

use crate::error::{DbError, DbResult};

/// Ids bound per `IN (...)` query in [`ProductRepository::find_by_ids`].
pub const ID_BATCH_SIZE: usize = 500;

const PRODUCT_COLUMNS: &str =
    "id, title, price_cents AS price, description, category, image, created_at, updated_at";

/// Loads every product in insertion order on the given connection.
pub(crate) async fn load_all(conn: &mut SqliteConnection) -> DbResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid"
    ))
    .fetch_all(conn)
    .await?;
    Ok(products)
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let page = repo.find_page(PageRequest::default()).await?;
/// let product = repo.find_by_id("1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Returns every product in insertion order.
    pub async fn find_all(&self) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        load_all(&mut conn).await
    }

    /// Returns one page of products in insertion order.
    pub async fn find_page(&self, request: PageRequest) -> DbResult<Page<Product>> {
        let total = self.count().await?;
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid LIMIT ?1 OFFSET ?2"
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        debug!(
            page = request.page(),
            returned = products.len(),
            total,
            "Loaded product page"
        );
        Ok(Page::new(products, request, total))
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Returns the products whose ids are in `ids` (unknown ids are ignored).
    ///
    /// Ids are bound in batches of [`ID_BATCH_SIZE`] so large lookups stay
    /// under SQLite's bound-parameter limit. Rows come back in insertion
    /// order within each batch.
    pub async fn find_by_ids(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        let mut products = Vec::new();

        for batch in ids.chunks(ID_BATCH_SIZE) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("
            ));
            let mut separated = query.separated(", ");
            for id in batch {
                separated.push_bind(id);
            }
            separated.push_unseparated(") ORDER BY rowid");

            products.extend(
                query
                    .build_query_as::<Product>()
                    .fetch_all(&self.pool)
                    .await?,
            );
        }

        debug!(requested = ids.len(), found = products.len(), "Loaded products by id");
        Ok(products)
    }

    /// Case-insensitive substring search on title or description.
    pub async fn search_title_or_description(&self, keyword: &str) -> DbResult<Vec<Product>> {
        debug!(keyword = %keyword, "Searching products");

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE instr(lower(title), lower(?1)) > 0
               OR instr(lower(coalesce(description, '')), lower(?1)) > 0
            ORDER BY rowid
            "#
        ))
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Products with `min <= price <= max`, cheapest first.
    pub async fn find_by_price_between(&self, min: Money, max: Money) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE price_cents BETWEEN ?1 AND ?2
            ORDER BY price_cents, rowid
            "#
        ))
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Every product ordered by price; equal prices by id.
    pub async fn find_all_sorted_by_price(
        &self,
        direction: SortDirection,
    ) -> DbResult<Vec<Product>> {
        let order = match direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY price_cents {order}, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_on(&mut conn, product).await?;
        debug!(id = %product.id, title = %product.title, "Inserted product");
        Ok(())
    }

    /// Inserts many products in one transaction (seed import).
    pub async fn insert_all(&self, products: &[Product]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for product in products {
            insert_on(&mut tx, product).await?;
        }
        tx.commit().await?;
        Ok(products.len())
    }

    /// Updates every editable column of an existing product.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no product with this id
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                title = ?2,
                price_cents = ?3,
                description = ?4,
                category = ?5,
                image = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        debug!(id = %product.id, "Updated product");
        Ok(())
    }

    /// Deletes a product; its cart lines go with it (ON DELETE CASCADE).
    ///
    /// ## Returns
    /// `true` if a row was deleted.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, deleted = result.rows_affected(), "Deleted product");
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_on(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO products (
            id, title, price_cents, description, category, image, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&product.id)
    .bind(&product.title)
    .bind(product.price)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.image)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
