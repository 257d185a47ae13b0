//! HTTP client for the fakestoreapi.com catalogue.
//!
//! Implements [`CatalogSource`] so startup seeding can pull users, products
//! and carts from `GET {base}/users`, `GET {base}/products` and
//! `GET {base}/carts`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use storefront_db::seed::{CatalogSource, SeedCart, SeedError, SeedProduct, SeedUser};

/// Catalogue client for a single base URL.
pub struct FakeStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl FakeStoreClient {
    /// Create a client with a per-request `timeout`.
    ///
    /// * `base_url` - e.g. `https://fakestoreapi.com` (trailing `/` is ignored).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SeedError::fetch("client", e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET `{base}/{collection}` and decode the JSON array.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        collection: &'static str,
    ) -> Result<Vec<T>, SeedError> {
        let url = format!("{}/{}", self.base_url, collection);
        tracing::debug!(%url, "Fetching catalogue collection");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SeedError::fetch(collection, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeedError::fetch(
                collection,
                format!("unexpected status {status}"),
            ));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| SeedError::fetch(collection, e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for FakeStoreClient {
    async fn fetch_users(&self) -> Result<Vec<SeedUser>, SeedError> {
        let users: Vec<RemoteUser> = self.get_collection("users").await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn fetch_products(&self) -> Result<Vec<SeedProduct>, SeedError> {
        let products: Vec<RemoteProduct> = self.get_collection("products").await?;
        Ok(products.into_iter().map(Into::into).collect())
    }

    async fn fetch_carts(&self) -> Result<Vec<SeedCart>, SeedError> {
        let carts: Vec<RemoteCart> = self.get_collection("carts").await?;
        Ok(carts.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Wire Records
// =============================================================================

/// The catalogue sends numeric ids; strings are accepted too.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    #[serde(deserialize_with = "id_string")]
    id: String,
    username: String,
    email: String,
    password: String,
}

impl From<RemoteUser> for SeedUser {
    fn from(user: RemoteUser) -> Self {
        SeedUser {
            id: user.id,
            username: user.username,
            email: user.email,
            password: user.password,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteProduct {
    #[serde(deserialize_with = "id_string")]
    id: String,
    title: String,
    price: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    image: Option<String>,
}

impl From<RemoteProduct> for SeedProduct {
    fn from(product: RemoteProduct) -> Self {
        SeedProduct {
            id: product.id,
            title: product.title,
            price: product.price,
            description: product.description,
            category: product.category,
            image: product.image,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteCart {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(deserialize_with = "id_string")]
    user_id: String,
    #[serde(default)]
    products: Vec<RemoteCartLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteCartLine {
    #[serde(deserialize_with = "id_string")]
    product_id: String,
    quantity: i64,
}

impl From<RemoteCart> for SeedCart {
    fn from(cart: RemoteCart) -> Self {
        SeedCart {
            id: cart.id,
            user_id: cart.user_id,
            lines: cart
                .products
                .into_iter()
                .map(|line| (line.product_id, line.quantity))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_catalogue_product() {
        let raw = r#"[{
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack",
            "price": 109.95,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }]"#;

        let products: Vec<RemoteProduct> = serde_json::from_str(raw).unwrap();
        let seed = SeedProduct::from(products.into_iter().next().unwrap());
        assert_eq!(seed.id, "1");
        assert_eq!(seed.price, 109.95);
        assert_eq!(seed.category, "men's clothing");
    }

    #[test]
    fn test_decodes_catalogue_cart_lines_in_order() {
        let raw = r#"{
            "id": 1,
            "userId": 1,
            "date": "2020-03-02T00:00:00.000Z",
            "products": [
                { "productId": 1, "quantity": 4 },
                { "productId": "2", "quantity": 1 }
            ],
            "__v": 0
        }"#;

        let cart = SeedCart::from(serde_json::from_str::<RemoteCart>(raw).unwrap());
        assert_eq!(cart.user_id, "1");
        assert_eq!(
            cart.lines,
            vec![("1".to_string(), 4), ("2".to_string(), 1)]
        );
    }

    #[test]
    fn test_decodes_catalogue_user_ignoring_extra_fields() {
        let raw = r#"{
            "id": 3,
            "email": "kevin@gmail.com",
            "username": "kevinryan",
            "password": "kev02937@",
            "name": { "firstname": "kevin", "lastname": "ryan" },
            "phone": "1-567-094-1345"
        }"#;

        let user = SeedUser::from(serde_json::from_str::<RemoteUser>(raw).unwrap());
        assert_eq!(user.id, "3");
        assert_eq!(user.username, "kevinryan");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = FakeStoreClient::with_client(reqwest::Client::new(), "http://localhost:9/");
        assert_eq!(client.base_url, "http://localhost:9");
    }

    #[tokio::test]
    async fn test_unreachable_source_reports_fetch_error() {
        // Port 9 (discard) is not expected to serve HTTP.
        let client =
            FakeStoreClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.fetch_products().await.unwrap_err();
        assert!(matches!(
            err,
            SeedError::Fetch {
                collection: "products",
                ..
            }
        ));
    }
}
