//! # Cart Repository
//!
//! Persists the [`Cart`] aggregate: one `carts` row plus its `cart_products`
//! lines.
//!
//! ## Save Flow
//! ```text
//! save(&cart)
//!   │
//!   ├─ BEGIN
//!   ├─ INSERT carts ... ON CONFLICT(id) DO UPDATE (owner, updated_at)
//!   ├─ DELETE FROM cart_products WHERE cart_id = ?
//!   ├─ INSERT cart_products (cart_id, product_id, quantity, position) × N
//!   └─ COMMIT
//! ```
//! Lines are always rewritten as a whole, so `position` mirrors the cart's
//! insertion order and reloading yields the same line order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use storefront_core::{Cart, LineItem, Page, PageRequest};

use crate::error::DbResult;

/// Raw `carts` row.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    user_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Raw `cart_products` row.
#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    cart_id: String,
    product_id: String,
    quantity: i64,
}

const CART_COLUMNS: &str = "id, user_id, created_at, updated_at";

/// Loads every cart with its lines on the given connection.
pub(crate) async fn load_all(conn: &mut SqliteConnection) -> DbResult<Vec<Cart>> {
    let rows = sqlx::query_as::<_, CartRow>(&format!(
        "SELECT {CART_COLUMNS} FROM carts ORDER BY rowid"
    ))
    .fetch_all(&mut *conn)
    .await?;

    let lines = sqlx::query_as::<_, LineRow>(
        "SELECT cart_id, product_id, quantity FROM cart_products ORDER BY cart_id, position",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(assemble(rows, lines))
}

/// Loads lines for the given carts only.
async fn load_lines(conn: &mut SqliteConnection, rows: Vec<CartRow>) -> DbResult<Vec<Cart>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT cart_id, product_id, quantity FROM cart_products WHERE cart_id IN (",
    );
    let mut separated = query.separated(", ");
    for row in &rows {
        separated.push_bind(row.id.clone());
    }
    separated.push_unseparated(") ORDER BY cart_id, position");

    let lines = query
        .build_query_as::<LineRow>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(assemble(rows, lines))
}

fn assemble(rows: Vec<CartRow>, lines: Vec<LineRow>) -> Vec<Cart> {
    let mut by_cart: HashMap<String, Vec<LineItem>> = HashMap::new();
    for line in lines {
        by_cart
            .entry(line.cart_id)
            .or_default()
            .push(LineItem::new(line.product_id, line.quantity));
    }

    rows.into_iter()
        .map(|row| {
            let lines = by_cart.remove(&row.id).unwrap_or_default();
            Cart::from_parts(row.id, row.user_id, lines, row.created_at, row.updated_at)
        })
        .collect()
}

/// Repository for cart aggregate operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Returns every cart with its lines.
    pub async fn find_all(&self) -> DbResult<Vec<Cart>> {
        let mut conn = self.pool.acquire().await?;
        load_all(&mut conn).await
    }

    /// Returns one page of carts in insertion order.
    pub async fn find_page(&self, request: PageRequest) -> DbResult<Page<Cart>> {
        let total = self.count().await?;
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM carts ORDER BY rowid LIMIT ?1 OFFSET ?2"
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&mut *conn)
        .await?;

        let carts = load_lines(&mut conn, rows).await?;
        Ok(Page::new(carts, request, total))
    }

    /// Gets a cart by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Cart>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(load_lines(&mut conn, rows).await?.into_iter().next())
    }

    /// Carts owned by a user.
    pub async fn find_by_user_id(&self, user_id: &str) -> DbResult<Vec<Cart>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = ?1 ORDER BY rowid"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        load_lines(&mut conn, rows).await
    }

    /// Carts with at least one line for `product_id`.
    pub async fn find_by_product_id(&self, product_id: &str) -> DbResult<Vec<Cart>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT c.id, c.user_id, c.created_at, c.updated_at
            FROM carts c
            WHERE EXISTS (
                SELECT 1 FROM cart_products cp
                WHERE cp.cart_id = c.id AND cp.product_id = ?1
            )
            ORDER BY c.rowid
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

        load_lines(&mut conn, rows).await
    }

    /// Counts all carts.
    pub async fn count(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Inserts or replaces a cart and all of its lines atomically.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - owner or a line's product does not exist
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        save_on(&mut tx, cart).await?;
        tx.commit().await?;

        debug!(id = %cart.id, lines = cart.len(), "Saved cart");
        Ok(())
    }

    /// Saves many carts in one transaction (seed import).
    pub async fn save_all(&self, carts: &[Cart]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for cart in carts {
            save_on(&mut tx, cart).await?;
        }
        tx.commit().await?;
        Ok(carts.len())
    }

    /// Deletes a cart; its lines go with it.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(id = %id, deleted = result.rows_affected(), "Deleted cart");
        Ok(result.rows_affected() > 0)
    }
}

async fn save_on(conn: &mut SqliteConnection, cart: &Cart) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO carts (id, user_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
            user_id = excluded.user_id,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&cart.id)
    .bind(&cart.user_id)
    .bind(cart.created_at)
    .bind(cart.updated_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM cart_products WHERE cart_id = ?1")
        .bind(&cart.id)
        .execute(&mut *conn)
        .await?;

    for (position, line) in cart.items().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO cart_products (cart_id, product_id, quantity, position)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&cart.id)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
