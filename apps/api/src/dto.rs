//! Request and response bodies.
//!
//! Wire names are camelCase. Prices travel as decimals and are converted to
//! integer cents at this boundary; nothing below the HTTP layer sees `f64`
//! prices.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use storefront_core::analytics::{ProductRevenue, ProductSales};
use storefront_core::validation::{parse_amount, parse_price, validate_title};
use storefront_core::{
    Cart, LineRequest, PageRequest, Product, ProductDraft, User, UserDraft, ValidationError,
    DEFAULT_PAGE_SIZE, DEFAULT_TOP_N, MAX_CART_LINES,
};

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

/// `?page=&size=` (defaults 0 / 20).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageParams {
    pub fn to_request(&self) -> Result<PageRequest, ValidationError> {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// `?topN=` (default 5).
#[derive(Debug, Default, Deserialize)]
pub struct TopNParams {
    #[serde(rename = "topN")]
    pub top_n: Option<i64>,
}

impl TopNParams {
    pub fn top_n(&self) -> i64 {
        self.top_n.unwrap_or(DEFAULT_TOP_N)
    }
}

#[derive(Debug, Deserialize)]
pub struct KeywordParams {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameParams {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailParams {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceRangeParams {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize)]
pub struct MinTotalParams {
    #[serde(rename = "minTotal")]
    pub min_total: f64,
}

impl MinTotalParams {
    pub fn threshold(&self) -> Result<storefront_core::Money, ValidationError> {
        parse_amount("minTotal", self.min_total)
    }
}

// =============================================================================
// Products
// =============================================================================

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRequest {
    pub title: String,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category: String,
    pub image: Option<String>,
}

impl ProductRequest {
    /// Converts to a validated draft; the first failing rule is reported.
    pub fn into_draft(self) -> Result<ProductDraft, ValidationError> {
        validate_title(&self.title)?;
        let price = parse_price(self.price.ok_or_else(|| required("price"))?)?;
        let draft = ProductDraft {
            title: self.title,
            price,
            description: self.description,
            category: self.category,
            image: self.image,
        };
        draft.validate()?;
        Ok(draft)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    pub category: String,
    pub image: Option<String>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        ProductResponse {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price.to_decimal(),
            description: product.description.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse::from(&product)
    }
}

// =============================================================================
// Users
// =============================================================================

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for UserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl UserRequest {
    pub fn into_draft(self) -> Result<UserDraft, ValidationError> {
        let draft = UserDraft {
            username: self.username,
            email: self.email,
            password: self.password,
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// A user as returned to clients (never includes the password hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

// =============================================================================
// Carts & Lines
// =============================================================================

/// One requested line: `{ "productId": "1", "quantity": 2 }`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartLineRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
}

impl CartLineRequest {
    pub fn into_line(self) -> Result<LineRequest, ValidationError> {
        Ok(LineRequest::new(
            self.product_id.ok_or_else(|| required("productId"))?,
            self.quantity.ok_or_else(|| required("quantity"))?,
        ))
    }
}

/// Body of `POST /carts` and `PUT /carts/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartRequest {
    pub user_id: Option<String>,
    pub products: Option<Vec<CartLineRequest>>,
}

impl CartRequest {
    /// Splits into owner id and requested lines.
    pub fn into_parts(self) -> Result<(String, Vec<LineRequest>), ValidationError> {
        let user_id = self
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| required("userId"))?;
        let products = self.products.ok_or_else(|| required("products"))?;
        if products.len() > MAX_CART_LINES {
            return Err(ValidationError::InvalidFormat {
                field: "products".to_string(),
                reason: format!("at most {MAX_CART_LINES} lines per cart"),
            });
        }
        let lines = products
            .into_iter()
            .map(CartLineRequest::into_line)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((user_id, lines))
    }
}

/// A line with its product's current title and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub product_id: String,
    pub product_title: String,
    pub product_price: f64,
    pub quantity: i64,
}

impl CartLineResponse {
    pub fn new(product: &Product, quantity: i64) -> Self {
        CartLineResponse {
            product_id: product.id.clone(),
            product_title: product.title.clone(),
            product_price: product.price.to_decimal(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: String,
    pub user_id: String,
    pub products: Vec<CartLineResponse>,
}

impl CartResponse {
    /// Lines whose product is not in `products` are left out.
    pub fn build(cart: &Cart, products: &HashMap<&str, &Product>) -> Self {
        CartResponse {
            id: cart.id.clone(),
            user_id: cart.user_id.clone(),
            products: line_responses(cart, products),
        }
    }
}

/// Line responses for a cart, in line order.
pub fn line_responses(cart: &Cart, products: &HashMap<&str, &Product>) -> Vec<CartLineResponse> {
    cart.items()
        .filter_map(|line| {
            products
                .get(line.product_id.as_str())
                .map(|product| CartLineResponse::new(product, line.quantity))
        })
        .collect()
}

// =============================================================================
// Analytics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesResponse {
    pub product_id: String,
    pub title: String,
    pub total_sold: i64,
}

impl From<ProductSales> for ProductSalesResponse {
    fn from(sales: ProductSales) -> Self {
        ProductSalesResponse {
            product_id: sales.product_id,
            title: sales.title,
            total_sold: sales.total_sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRevenueResponse {
    pub product_id: String,
    pub title: String,
    pub revenue: f64,
}

impl From<ProductRevenue> for ProductRevenueResponse {
    fn from(revenue: ProductRevenue) -> Self {
        ProductRevenueResponse {
            product_id: revenue.product_id,
            title: revenue.title,
            revenue: revenue.revenue.to_decimal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_request_reports_first_violation() {
        let err = ProductRequest {
            title: "".into(),
            price: None,
            ..Default::default()
        }
        .into_draft()
        .unwrap_err();
        assert_eq!(err.to_string(), "title is required");

        let err = ProductRequest {
            title: "Mug".into(),
            price: None,
            category: "kitchen".into(),
            ..Default::default()
        }
        .into_draft()
        .unwrap_err();
        assert_eq!(err.to_string(), "price is required");
    }

    #[test]
    fn test_product_request_converts_price_to_cents() {
        let draft = ProductRequest {
            title: "Mug".into(),
            price: Some(12.99),
            category: "kitchen".into(),
            ..Default::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.price.cents(), 1299);
    }

    #[test]
    fn test_cart_request_requires_user_and_products() {
        let err = CartRequest {
            user_id: None,
            products: Some(vec![]),
        }
        .into_parts()
        .unwrap_err();
        assert_eq!(err.to_string(), "userId is required");

        let err = CartRequest {
            user_id: Some("1".into()),
            products: None,
        }
        .into_parts()
        .unwrap_err();
        assert_eq!(err.to_string(), "products is required");
    }

    #[test]
    fn test_cart_request_caps_line_count() {
        let lines = |n: usize| {
            (0..n)
                .map(|i| CartLineRequest {
                    product_id: Some(format!("p{i}")),
                    quantity: Some(1),
                })
                .collect::<Vec<_>>()
        };

        let (_, parts) = CartRequest {
            user_id: Some("1".into()),
            products: Some(lines(MAX_CART_LINES)),
        }
        .into_parts()
        .unwrap();
        assert_eq!(parts.len(), MAX_CART_LINES);

        let err = CartRequest {
            user_id: Some("1".into()),
            products: Some(lines(MAX_CART_LINES + 1)),
        }
        .into_parts()
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "products has invalid format: at most 1000 lines per cart"
        );
    }

    #[test]
    fn test_camel_case_wire_names() {
        let request: CartRequest =
            serde_json::from_str(r#"{"userId":"1","products":[{"productId":"7","quantity":2}]}"#)
                .unwrap();
        let (user, lines) = request.into_parts().unwrap();
        assert_eq!(user, "1");
        assert_eq!(lines[0].product_id, "7");

        let json = serde_json::to_value(CartLineResponse {
            product_id: "7".into(),
            product_title: "Mug".into(),
            product_price: 12.5,
            quantity: 2,
        })
        .unwrap();
        assert_eq!(json["productTitle"], "Mug");
        assert_eq!(json["productPrice"], 12.5);
    }
}
