//! JSON-over-HTTP backend client.
//!
//! Every response is an envelope `{ "success": bool, "message": string?, ... }`.
//! Authenticated calls pass the session token in a `token` header.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use threadline_core::{Order, Product};
use tracing::{debug, instrument};

use super::{Backend, BackendError, NewOrder};
use crate::models::SessionToken;

const PRODUCTS_CACHE_KEY: &str = "products";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<Order>,
}

/// Client for a remote storefront backend.
///
/// The product list is cached for 5 minutes.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    base_url: String,
    products: Cache<&'static str, Arc<Vec<Product>>>,
}

impl HttpBackend {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let products = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                products,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode the envelope plus payload `T`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        decode_envelope(&body)
    }
}

/// Decode a response body, turning `success: false` into [`BackendError::Rejected`].
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })?;

    if !envelope.success {
        let message = envelope
            .message
            .unwrap_or_else(|| "Request was rejected".to_string());
        if message.eq_ignore_ascii_case("not authorized login again") {
            return Err(BackendError::Unauthorized);
        }
        return Err(BackendError::Rejected(message));
    }

    Ok(serde_json::from_str(body)?)
}

fn require_token(response: TokenResponse) -> Result<SessionToken, BackendError> {
    response
        .token
        .filter(|t| !t.is_empty())
        .map(SessionToken::new)
        .ok_or_else(|| BackendError::Rejected("Login did not return a token".to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self))]
    async fn products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(products) = self.inner.products.get(PRODUCTS_CACHE_KEY).await {
            debug!("Product list cache hit");
            return Ok(products);
        }

        let response: ProductsResponse = self
            .send(self.inner.client.get(self.url("/api/product/list")))
            .await?;
        let products = Arc::new(response.products);
        self.inner
            .products
            .insert(PRODUCTS_CACHE_KEY, Arc::clone(&products))
            .await;
        Ok(products)
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<SessionToken, BackendError> {
        let response: TokenResponse = self
            .send(
                self.inner
                    .client
                    .post(self.url("/api/user/login"))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        require_token(response)
    }

    #[instrument(skip(self, password))]
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, BackendError> {
        let response: TokenResponse = self
            .send(
                self.inner
                    .client
                    .post(self.url("/api/user/register"))
                    .json(&json!({ "name": name, "email": email, "password": password })),
            )
            .await?;
        require_token(response)
    }

    #[instrument(skip(self, token, order), fields(items = order.items.len()))]
    async fn place_order(&self, token: &SessionToken, order: NewOrder) -> Result<(), BackendError> {
        let _: Envelope = self
            .send(
                self.inner
                    .client
                    .post(self.url("/api/order/place"))
                    .header("token", token.expose())
                    .json(&order),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn orders(&self, token: &SessionToken) -> Result<Vec<Order>, BackendError> {
        let response: OrdersResponse = self
            .send(
                self.inner
                    .client
                    .post(self.url("/api/order/userorders"))
                    .header("token", token.expose())
                    .json(&json!({})),
            )
            .await?;
        Ok(response.orders)
    }
}
