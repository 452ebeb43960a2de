//! Product catalog client.
//!
//! Products come from a `FakeStore`-compatible REST API
//! (`GET /products`, `GET /products/{id}`). Responses are cached using
//! `moka` with the configured TTL (5 minutes by default).

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use shopfront_core::{Product, ProductId};
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::CatalogConfig;

const ALL_PRODUCTS_KEY: &str = "products";

/// Errors from the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an unexpected status.
    #[error("Catalog API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body is not a product.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),

    /// No product with this id.
    #[error("Product not found: {0}")]
    NotFound(ProductId),
}

/// Read access to the product catalog.
pub trait ProductCatalog: Send + Sync {
    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids, or another
    /// [`CatalogError`] if the catalog cannot be read.
    fn fetch_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the catalog cannot be read.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;
}

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}

/// HTTP client for the catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        // Url::join replaces the last path segment unless the base ends in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET `path` and return the body, or `None` for a 404.
    async fn get(&self, path: &str) -> Result<Option<String>, CatalogError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(Some(body))
    }
}

impl ProductCatalog for CatalogClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = product_key(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let body = self
            .get(&format!("products/{id}"))
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        let product = parse_product(id, &body)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(ALL_PRODUCTS_KEY).await
        {
            debug!("Cache hit for products");
            return Ok(products.as_ref().clone());
        }

        let body = self.get("products").await?.unwrap_or_default();
        let products: Vec<Product> = if body.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&body)?
        };
        debug!(count = products.len(), "Fetched products");

        for product in &products {
            self.inner
                .cache
                .insert(
                    product_key(product.id),
                    CacheValue::Product(Box::new(product.clone())),
                )
                .await;
        }
        self.inner
            .cache
            .insert(
                ALL_PRODUCTS_KEY.to_string(),
                CacheValue::Products(Arc::new(products.clone())),
            )
            .await;

        Ok(products)
    }
}

fn product_key(id: ProductId) -> String {
    format!("product:{id}")
}

/// Parse a single-product body.
///
/// The API answers unknown ids with `200` and an empty body (or `null`),
/// which is reported as [`CatalogError::NotFound`].
fn parse_product(id: ProductId, body: &str) -> Result<Product, CatalogError> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Err(CatalogError::NotFound(id));
    }
    Ok(serde_json::from_str(body)?)
}

// =============================================================================
// In-memory catalog
// =============================================================================

/// A fixed set of products, for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: BTreeMap<ProductId, Product>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

impl ProductCatalog for StaticCatalog {
    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.values().cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(base: &str) -> CatalogConfig {
        CatalogConfig {
            base_url: Url::parse(base).unwrap(),
            cache_ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = CatalogClient::new(&config("https://catalog.example.com/api/v1"));
        assert_eq!(client.base_url().as_str(), "https://catalog.example.com/api/v1/");
        assert_eq!(
            client.base_url().join("products/3").unwrap().as_str(),
            "https://catalog.example.com/api/v1/products/3"
        );
    }

    #[test]
    fn test_empty_body_is_not_found() {
        let id = ProductId::new(999);
        assert!(matches!(parse_product(id, ""), Err(CatalogError::NotFound(found)) if found == id));
        assert!(matches!(parse_product(id, " null\n"), Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_parse_product_body() {
        let body = r#"{"id":3,"title":"Mens Cotton Jacket","price":55.99,"description":"","category":"men's clothing","image":"https://fakestoreapi.com/img/71li-ujtlUL._AC_UX679_.jpg","rating":{"rate":4.7,"count":500}}"#;
        let product = parse_product(ProductId::new(3), body).unwrap();
        assert_eq!(product.title, "Mens Cotton Jacket");
        assert_eq!(product.price.to_string(), "$55.99");
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(
            parse_product(ProductId::new(1), "<html>"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_static_catalog() {
        let catalog = StaticCatalog::new([Product {
            id: ProductId::new(1),
            title: "Backpack".to_string(),
            price: shopfront_core::Price::from_cents(10995),
            description: String::new(),
            category: String::new(),
            image: String::new(),
            rating: None,
        }]);

        assert_eq!(catalog.fetch_product(ProductId::new(1)).await.unwrap().title, "Backpack");
        assert!(matches!(
            catalog.fetch_product(ProductId::new(2)).await,
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(catalog.fetch_products().await.unwrap().len(), 1);
    }
}
