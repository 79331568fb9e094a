//! Integration tests for Threadline.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p threadline-integration-tests
//! ```
//!
//! Each test starts the full storefront router on an ephemeral port with the
//! fixture backend and in-memory stores, so no database or remote API is
//! needed.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::SecretString;
use threadline_core::{Product, ProductId};
use threadline_storefront::backend::{Backend, FixtureBackend};
use threadline_storefront::config::{ShopConfig, StorefrontConfig};
use threadline_storefront::middleware::memory_session_layer;
use threadline_storefront::routes;
use threadline_storefront::state::AppState;
use threadline_storefront::storage::{KeyValueStore, MemoryStore};

/// A running storefront and a cookie-keeping client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront serving [`sample_products`].
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the client cannot be built.
    pub async fn new() -> Self {
        Self::with_products(sample_products()).await
    }

    /// Start a storefront serving `products`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the client cannot be built.
    #[allow(clippy::expect_used)]
    pub async fn with_products(products: Vec<Product>) -> Self {
        let listener = tokio::net::TcpListener::bind(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            0,
        ))
        .await
        .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let base_url = format!("http://{addr}");

        let config = test_config(addr, &base_url);
        let backend: Arc<dyn Backend> = Arc::new(FixtureBackend::new(products));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session_layer = memory_session_layer(&config);
        let state = AppState::new(config, backend, store, None);
        let app = routes::app(state, session_layer);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    #[allow(clippy::expect_used)]
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        let status = response.status();
        (status, response.text().await.expect("Body not readable"))
    }

    /// POST a form to `path`, follow redirects, and return the final status
    /// and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    #[allow(clippy::expect_used)]
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed");
        let status = response.status();
        (status, response.text().await.expect("Body not readable"))
    }

    /// Create an account and stay logged in.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> String {
        let (_, body) = self
            .post_form(
                "/login",
                &[
                    ("mode", "signup"),
                    ("name", name),
                    ("email", email),
                    ("password", password),
                ],
            )
            .await;
        body
    }
}

fn test_config(addr: SocketAddr, base_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        database_url: None,
        host: addr.ip(),
        port: addr.port(),
        base_url: base_url.to_string(),
        session_secret: SecretString::from("integration-test-session-secret-0123456789abcdef"),
        shop: ShopConfig::default(),
        backend_url: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A small catalog: two tees, trousers and a jacket.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    let product = |id: &str, name: &str, price: i64, category: &str, sub: &str, date: i64| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name} description"),
        price: Decimal::from(price),
        category: category.to_string(),
        sub_category: sub.to_string(),
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
        images: vec![format!("/static/images/{id}-a.svg"), format!("/static/images/{id}-b.svg")],
        bestseller: date % 2 == 0,
        date,
    };

    vec![
        product("tee-blue", "Blue Cotton Tee", 20, "Men", "Topwear", 4),
        product("tee-red", "Red Cotton Tee", 25, "Women", "Topwear", 3),
        product("trouser", "Slim Trouser", 40, "Men", "Bottomwear", 2),
        product("jacket", "Quilted Jacket", 90, "Kids", "Winterwear", 1),
    ]
}
