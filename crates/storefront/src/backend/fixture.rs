//! In-memory backend backed by a product file.
//!
//! Shoppers and orders live only as long as the process. Passwords are
//! hashed with argon2 even here, so nothing sensitive sits in memory in
//! clear text.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::Utc;
use threadline_core::{Email, Order, OrderId, OrderStatus, Product};
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use super::{Backend, BackendError, NewOrder};
use crate::models::SessionToken;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug)]
struct Shopper {
    password_hash: String,
}

#[derive(Debug, Default)]
struct Accounts {
    /// Shoppers keyed by lower-cased email.
    shoppers: HashMap<String, Shopper>,
    /// Issued tokens mapped to lower-cased email.
    tokens: HashMap<String, String>,
    /// Orders keyed by lower-cased email, oldest first.
    orders: HashMap<String, Vec<Order>>,
}

/// Backend serving a fixed catalog with in-memory accounts.
#[derive(Clone)]
pub struct FixtureBackend {
    products: Arc<Vec<Product>>,
    accounts: Arc<RwLock<Accounts>>,
}

impl FixtureBackend {
    /// Create a backend over an in-memory product list.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(products),
            accounts: Arc::new(RwLock::new(Accounts::default())),
        }
    }

    /// Load the product list from a JSON file (an array of products).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.as_ref().display(),
            count = products.len(),
            "Loaded fixture catalog"
        );
        Ok(Self::new(products))
    }

    async fn issue_token(&self, key: String) -> SessionToken {
        let token = Uuid::new_v4().simple().to_string();
        self.accounts
            .write()
            .await
            .tokens
            .insert(token.clone(), key);
        SessionToken::new(token)
    }

    async fn shopper_key(&self, token: &SessionToken) -> Result<String, BackendError> {
        self.accounts
            .read()
            .await
            .tokens
            .get(token.expose())
            .cloned()
            .ok_or(BackendError::Unauthorized)
    }
}

fn hash_password(password: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BackendError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[async_trait]
impl Backend for FixtureBackend {
    async fn products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        Ok(Arc::clone(&self.products))
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<SessionToken, BackendError> {
        let key = email.trim().to_lowercase();
        let verified = self
            .accounts
            .read()
            .await
            .shoppers
            .get(&key)
            .is_some_and(|shopper| verify_password(password, &shopper.password_hash));

        if !verified {
            return Err(BackendError::Rejected("Invalid credentials".to_string()));
        }
        Ok(self.issue_token(key).await)
    }

    #[instrument(skip(self, password))]
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, BackendError> {
        if name.trim().is_empty() {
            return Err(BackendError::Rejected("Please enter your name".to_string()));
        }
        let email = Email::parse(email.trim())
            .map_err(|_| BackendError::Rejected("Please enter a valid email".to_string()))?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(BackendError::Rejected(
                "Please enter a strong password".to_string(),
            ));
        }

        let key = email.as_str().to_lowercase();
        let password_hash = hash_password(password)?;
        {
            let mut accounts = self.accounts.write().await;
            if accounts.shoppers.contains_key(&key) {
                return Err(BackendError::Rejected("User already exists".to_string()));
            }
            accounts.shoppers.insert(
                key.clone(),
                Shopper { password_hash },
            );
        }
        Ok(self.issue_token(key).await)
    }

    #[instrument(skip(self, token, order))]
    async fn place_order(&self, token: &SessionToken, order: NewOrder) -> Result<(), BackendError> {
        let key = self.shopper_key(token).await?;
        if order.items.is_empty() {
            return Err(BackendError::Rejected("Your cart is empty".to_string()));
        }

        let placed = Order {
            id: OrderId::new(Uuid::new_v4().simple().to_string()),
            items: order.items,
            amount: order.amount,
            address: order.address,
            status: OrderStatus::OrderPlaced,
            payment_method: order.payment_method,
            payment: false,
            date: Utc::now().timestamp_millis(),
        };
        tracing::info!(order_id = %placed.id, "Order placed");
        self.accounts
            .write()
            .await
            .orders
            .entry(key)
            .or_default()
            .push(placed);
        Ok(())
    }

    async fn orders(&self, token: &SessionToken) -> Result<Vec<Order>, BackendError> {
        let key = self.shopper_key(token).await?;
        Ok(self
            .accounts
            .read()
            .await
            .orders
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for FixtureBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureBackend")
            .field("products", &self.products.len())
            .finish_non_exhaustive()
    }
}
