//! # Cart Aggregate
//!
//! A cart owns an ordered set of line items, at most one per product.
//!
//! ## Line Item Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  build_lines(requests)     one line per distinct product, request order │
//! │                            first unknown product → ProductNotFound      │
//! │                                                                         │
//! │  add_line(p1, 3)           p1 present (qty 1) → qty 4                   │
//! │                            p1 absent          → append (p1, 3)          │
//! │                                                                         │
//! │  remove_line(p1)           p1 absent → ProductNotFound                  │
//! │                                                                         │
//! │  Items live in an IndexMap keyed by product id: insertion order is      │
//! │  kept and a second line for the same product cannot exist.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisting a cart always writes the whole aggregate (cart row plus every
//! line) in one transaction; see `storefront-db`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{new_id, Product};
use crate::validation::{quantity_out_of_range, validate_id, validate_quantity};
use crate::MAX_QUANTITY;

// =============================================================================
// Line Items
// =============================================================================

/// One (cart, product, quantity) association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// quantity × product price.
    pub fn line_total(&self, product: &Product) -> Money {
        product.price.multiply_quantity(self.quantity)
    }
}

/// A requested line in a cart create/update body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl LineRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineRequest {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Validates requested lines against the product store.
///
/// ## Behavior
/// - Quantities must be positive
/// - Products are checked in request order; the first unknown id fails the
///   whole request with `ProductNotFound` (nothing partial is returned)
/// - Repeated product ids collapse into one line with the summed quantity
///
/// ## Example
/// ```rust
/// use storefront_core::cart::{build_lines, LineRequest};
///
/// let known = ["p1", "p2"];
/// let lines = build_lines(
///     &[LineRequest::new("p1", 2), LineRequest::new("p2", 1), LineRequest::new("p1", 1)],
///     |id| known.contains(&id),
/// )
/// .unwrap();
///
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].quantity, 3);
/// ```
pub fn build_lines<F>(requested: &[LineRequest], product_exists: F) -> CoreResult<Vec<LineItem>>
where
    F: Fn(&str) -> bool,
{
    let mut lines: IndexMap<String, LineItem> = IndexMap::with_capacity(requested.len());

    for request in requested {
        validate_id("productId", &request.product_id)?;
        validate_quantity(request.quantity)?;
        if !product_exists(&request.product_id) {
            return Err(CoreError::ProductNotFound(request.product_id.clone()));
        }
        merge_line(&mut lines, &request.product_id, request.quantity)?;
    }

    Ok(lines.into_values().collect())
}

fn merge_line(
    lines: &mut IndexMap<String, LineItem>,
    product_id: &str,
    quantity: i64,
) -> CoreResult<()> {
    match lines.get_mut(product_id) {
        Some(existing) => {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .filter(|merged| *merged <= MAX_QUANTITY)
                .ok_or_else(quantity_out_of_range)?;
        }
        None => {
            lines.insert(product_id.to_string(), LineItem::new(product_id, quantity));
        }
    }
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

/// A user's cart and its line items.
///
/// ## Invariants
/// - Every line has quantity > 0
/// - At most one line per product id
/// - `user_id` referenced an existing user when the cart was assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    items: IndexMap<String, LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart with a fresh UUID.
    pub fn new(user_id: impl Into<String>) -> Self {
        Cart::with_id(new_id(), user_id)
    }

    /// Creates an empty cart with a caller-chosen id (seed import).
    pub fn with_id(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: id.into(),
            user_id: user_id.into(),
            items: IndexMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a cart from stored rows. Lines are expected in position order.
    pub fn from_parts(
        id: String,
        user_id: String,
        lines: Vec<LineItem>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let items = lines
            .into_iter()
            .map(|line| (line.product_id.clone(), line))
            .collect();
        Cart {
            id,
            user_id,
            items,
            created_at,
            updated_at,
        }
    }

    /// Line items in insertion order.
    pub fn items(&self) -> impl ExactSizeIterator<Item = &LineItem> {
        self.items.values()
    }

    /// The line for a product, if the cart has one.
    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.items.get(product_id)
    }

    pub fn contains_product(&self, product_id: &str) -> bool {
        self.items.contains_key(product_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a product or increases its quantity if already present.
    ///
    /// ## Returns
    /// The resulting line (with the merged quantity).
    pub fn add_line(&mut self, product_id: &str, quantity: i64) -> CoreResult<&LineItem> {
        validate_id("productId", product_id)?;
        validate_quantity(quantity)?;
        merge_line(&mut self.items, product_id, quantity)?;
        self.touch();
        self.items
            .get(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
    }

    /// Removes the line for a product.
    ///
    /// Order of the remaining lines is preserved.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<LineItem> {
        let removed = self
            .items
            .shift_remove(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        self.touch();
        Ok(removed)
    }

    /// Replaces owner and every line (cart update).
    pub fn replace(&mut self, user_id: impl Into<String>, lines: Vec<LineItem>) {
        self.user_id = user_id.into();
        self.items = lines
            .into_iter()
            .map(|line| (line.product_id.clone(), line))
            .collect();
        self.touch();
    }

    /// Sum of quantities over all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .values()
            .fold(0, |total, line| total.saturating_add(line.quantity))
    }

    /// Σ quantity × price over lines whose product is in `products`.
    ///
    /// Lines pointing at products that no longer exist contribute nothing.
    pub fn total_value(&self, products: &HashMap<&str, &Product>) -> Money {
        self.items
            .values()
            .filter_map(|line| {
                products
                    .get(line.product_id.as_str())
                    .map(|product| line.line_total(product))
            })
            .sum()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::ProductDraft;

    fn product(id: &str, cents: i64) -> Product {
        Product::with_id(
            id,
            ProductDraft {
                title: format!("Product {}", id),
                price: Money::from_cents(cents),
                description: None,
                category: "misc".to_string(),
                image: None,
            },
        )
    }

    #[test]
    fn test_add_line_increments_existing_quantity() {
        let mut cart = Cart::with_id("c1", "u1");
        cart.add_line("p1", 1).unwrap();

        let line = cart.add_line("p1", 3).unwrap();

        assert_eq!(line.quantity, 4);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_line_appends_new_product_in_order() {
        let mut cart = Cart::with_id("c1", "u1");
        cart.add_line("p2", 1).unwrap();
        cart.add_line("p1", 2).unwrap();

        let ids: Vec<_> = cart.items().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn test_add_line_rejects_non_positive_quantity() {
        let mut cart = Cart::with_id("c1", "u1");
        let err = cart.add_line("p1", 0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_line_rejects_quantity_above_max() {
        let mut cart = Cart::with_id("c1", "u1");
        assert!(cart.add_line("p1", MAX_QUANTITY + 1).is_err());
        assert!(cart.add_line("p1", i64::MAX).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merged_quantity_stays_within_max() {
        let mut cart = Cart::with_id("c1", "u1");
        cart.add_line("p1", MAX_QUANTITY - 1).unwrap();
        assert_eq!(cart.add_line("p1", 1).unwrap().quantity, MAX_QUANTITY);

        let err = cart.add_line("p1", 1).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(cart.line("p1").unwrap().quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_build_lines_rejects_merge_past_max() {
        let requested = vec![
            LineRequest::new("p1", MAX_QUANTITY),
            LineRequest::new("p1", 1),
        ];
        assert!(build_lines(&requested, |_| true).is_err());
    }

    #[test]
    fn test_remove_missing_line_is_not_found() {
        let mut cart = Cart::with_id("c1", "u1");
        cart.add_line("p1", 1).unwrap();

        let err = cart.remove_line("p9").unwrap_err();

        assert!(matches!(err, CoreError::ProductNotFound(ref id) if id == "p9"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_line_keeps_order() {
        let mut cart = Cart::with_id("c1", "u1");
        for id in ["p1", "p2", "p3"] {
            cart.add_line(id, 1).unwrap();
        }

        let removed = cart.remove_line("p2").unwrap();

        assert_eq!(removed.product_id, "p2");
        let ids: Vec<_> = cart.items().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn test_build_lines_fails_fast_on_first_missing_product() {
        let known = ["p1"];
        let err = build_lines(
            &[
                LineRequest::new("p1", 1),
                LineRequest::new("p7", 1),
                LineRequest::new("p8", 1),
            ],
            |id| known.contains(&id),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::ProductNotFound(ref id) if id == "p7"));
    }

    #[test]
    fn test_build_lines_round_trips_requested_lines() {
        let requested = vec![LineRequest::new("p1", 2), LineRequest::new("p2", 5)];
        let lines = build_lines(&requested, |_| true).unwrap();

        assert_eq!(lines.len(), requested.len());
        for (line, request) in lines.iter().zip(&requested) {
            assert_eq!(line.product_id, request.product_id);
            assert_eq!(line.quantity, request.quantity);
        }
    }

    #[test]
    fn test_build_lines_rejects_zero_quantity() {
        let err = build_lines(&[LineRequest::new("p1", 0)], |_| true).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_replace_swaps_owner_and_lines() {
        let mut cart = Cart::with_id("c1", "u1");
        cart.add_line("p1", 1).unwrap();

        cart.replace("u2", vec![LineItem::new("p2", 3)]);

        assert_eq!(cart.user_id, "u2");
        assert!(!cart.contains_product("p1"));
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_total_value_skips_missing_products() {
        let p1 = product("p1", 150000);
        let products: HashMap<&str, &Product> = [("p1", &p1)].into_iter().collect();

        let mut cart = Cart::with_id("c1", "u1");
        cart.add_line("p1", 2).unwrap();
        cart.add_line("gone", 10).unwrap();

        assert_eq!(cart.total_value(&products).cents(), 300000);
        assert_eq!(cart.total_quantity(), 12);
    }
}
