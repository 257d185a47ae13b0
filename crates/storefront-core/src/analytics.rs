//! # Analytics
//!
//! Read-only views derived from a [`Snapshot`] of carts and products.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Database::snapshot()  ──►  Snapshot { carts, products }                │
//! │                                   │                                     │
//! │          ┌────────────────┬───────┴────────┬──────────────────┐         │
//! │          ▼                ▼                ▼                  ▼         │
//! │     most_sold     revenue_per_product  total_items   carts_with_total_  │
//! │     (top N)       (keyed by id)        (Σ qty)       value_above(T)     │
//! │                                                                         │
//! │  Every call rescans the whole snapshot. Nothing is cached.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Missing Products
//! A line item whose product is not in the snapshot's product list is
//! treated as absent: it is skipped by revenue, most-sold and cart value.
//! `total_items` counts raw quantities and does not look at products.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{Product, Snapshot};

// =============================================================================
// Result Types
// =============================================================================

/// Quantity sold for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: String,
    pub title: String,
    pub total_sold: i64,
}

/// Revenue earned by one product.
///
/// Keyed by id; the title is only for display, so two products that share
/// a title stay separate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub product_id: String,
    pub title: String,
    pub revenue: Money,
}

// =============================================================================
// Top-N Helpers
// =============================================================================

/// Clamps a client-supplied `topN` to a usable length. Non-positive → 0.
pub fn top_n_len(top_n: i64) -> usize {
    if top_n <= 0 {
        0
    } else {
        usize::try_from(top_n).unwrap_or(usize::MAX)
    }
}

/// Keeps the first `top_n` entries of an already-ordered list.
///
/// ## Example
/// ```rust
/// use storefront_core::analytics::take_top;
///
/// assert_eq!(take_top(vec![3, 2, 1], 2), vec![3, 2]);
/// assert_eq!(take_top(vec![3, 2, 1], 10), vec![3, 2, 1]);
/// assert!(take_top(vec![3, 2, 1], 0).is_empty());
/// assert!(take_top(vec![3, 2, 1], -4).is_empty());
/// ```
pub fn take_top<T>(mut items: Vec<T>, top_n: i64) -> Vec<T> {
    items.truncate(top_n_len(top_n));
    items
}

// =============================================================================
// Cart-Product Aggregations
// =============================================================================

/// Best-selling products by total quantity across all carts.
///
/// ## Ordering
/// Descending by total quantity. Products with equal totals keep the order
/// in which they were first seen while scanning carts.
///
/// ## Algorithm
/// ```text
/// carts ──► group by product_id (insertion-ordered) ──► Σ quantity
///       ──► drop ids missing from the product store
///       ──► stable sort desc ──► take top_n
/// ```
pub fn most_sold(snapshot: &Snapshot, top_n: i64) -> Vec<ProductSales> {
    let limit = top_n_len(top_n);
    if limit == 0 {
        return Vec::new();
    }

    let mut totals: IndexMap<&str, i64> = IndexMap::new();
    for line in snapshot.carts.iter().flat_map(Cart::items) {
        let total = totals.entry(line.product_id.as_str()).or_insert(0);
        *total = total.saturating_add(line.quantity);
    }

    let products = snapshot.product_index();
    let mut sales: Vec<ProductSales> = totals
        .into_iter()
        .filter_map(|(product_id, total_sold)| {
            products.get(product_id).map(|product| ProductSales {
                product_id: product.id.clone(),
                title: product.title.clone(),
                total_sold,
            })
        })
        .collect();

    sales.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
    sales.truncate(limit);
    sales
}

/// Revenue (Σ quantity × price) per product id.
pub fn revenue_per_product(snapshot: &Snapshot) -> BTreeMap<String, ProductRevenue> {
    let products = snapshot.product_index();
    let mut revenue: BTreeMap<String, ProductRevenue> = BTreeMap::new();

    for line in snapshot.carts.iter().flat_map(Cart::items) {
        let Some(product) = products.get(line.product_id.as_str()) else {
            continue;
        };
        revenue
            .entry(product.id.clone())
            .or_insert_with(|| ProductRevenue {
                product_id: product.id.clone(),
                title: product.title.clone(),
                revenue: Money::zero(),
            })
            .revenue += line.line_total(product);
    }

    revenue
}

/// Sum of every line item's quantity across every cart.
pub fn total_items(carts: &[Cart]) -> i64 {
    carts
        .iter()
        .fold(0, |total, cart| total.saturating_add(cart.total_quantity()))
}

/// Sum of quantities across the carts owned by `user_id`.
pub fn total_products_for_user(carts: &[Cart], user_id: &str) -> i64 {
    carts
        .iter()
        .filter(|cart| cart.user_id == user_id)
        .fold(0, |total, cart| total.saturating_add(cart.total_quantity()))
}

/// Ids of carts with at least one line for `product_id`.
pub fn carts_containing_product(carts: &[Cart], product_id: &str) -> Vec<String> {
    carts
        .iter()
        .filter(|cart| cart.contains_product(product_id))
        .map(|cart| cart.id.clone())
        .collect()
}

/// Carts whose total value is strictly greater than `threshold`.
///
/// ## Example
/// ```text
/// c1 = [(p1, qty 2)], price(p1) = 1500.00  → total 3000.00
///
/// carts_with_total_value_above(1000.00) → [c1]
/// carts_with_total_value_above(3000.00) → []     (strictly greater)
/// carts_with_total_value_above(5000.00) → []
/// ```
pub fn carts_with_total_value_above(snapshot: &Snapshot, threshold: Money) -> Vec<&Cart> {
    let products = snapshot.product_index();
    snapshot
        .carts
        .iter()
        .filter(|cart| cart.total_value(&products) > threshold)
        .collect()
}

// =============================================================================
// Product Aggregations
// =============================================================================

/// Mean price per category over every product, as a decimal amount.
pub fn average_price_per_category(products: &[Product]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<&str, (i128, u64)> = BTreeMap::new();
    for product in products {
        let entry = sums.entry(product.category.as_str()).or_insert((0, 0));
        entry.0 += i128::from(product.price.cents());
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(category, (cents, count))| {
            let mean_cents = cents as f64 / count as f64;
            (category.to_string(), mean_cents / 100.0)
        })
        .collect()
}

/// Products ordered by price, highest first; equal prices by id.
pub fn top_expensive(mut products: Vec<Product>, top_n: i64) -> Vec<Product> {
    products.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| a.id.cmp(&b.id)));
    take_top(products, top_n)
}

/// Products ordered by price, lowest first; equal prices by id.
pub fn top_cheapest(mut products: Vec<Product>, top_n: i64) -> Vec<Product> {
    products.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.id.cmp(&b.id)));
    take_top(products, top_n)
}

// =============================================================================
// Unit Tests
// =============================================================================
