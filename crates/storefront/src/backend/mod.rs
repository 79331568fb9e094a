//! Client side of the product/order/auth backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products, shoppers and orders;
//!   the storefront never writes catalog data.
//! - [`HttpBackend`] talks JSON to a remote API and caches the product list
//!   via `moka` (5 minute TTL).
//! - [`FixtureBackend`] serves a product file and keeps shoppers and orders
//!   in memory, for local development and tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use threadline_storefront::backend::{Backend, FixtureBackend};
//!
//! let backend = FixtureBackend::from_path("crates/storefront/catalog/products.json")?;
//! let token = backend.register("Asha", "asha@example.com", "hunter2hunter2").await?;
//! let orders = backend.orders(&token).await?;
//! ```

mod fixture;
mod http;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use threadline_core::{DeliveryAddress, Order, OrderItem, PaymentMethod, Product};

pub use fixture::FixtureBackend;
pub use http::HttpBackend;

use crate::models::SessionToken;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The backend refused the request (`success: false`).
    #[error("{0}")]
    Rejected(String),

    /// The session token is missing, expired or unknown.
    #[error("not authorized")]
    Unauthorized,

    /// The fixture catalog could not be read.
    #[error("catalog file error: {0}")]
    Catalog(#[from] std::io::Error),

    /// Internal failure (e.g. password hashing).
    #[error("internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Whether the message is meant for the shopper (bad credentials etc.).
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Unauthorized)
    }
}

/// An order as submitted at checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub address: DeliveryAddress,
    pub payment_method: PaymentMethod,
}

/// Operations the storefront needs from the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The full product collection, in source order.
    async fn products(&self) -> Result<Arc<Vec<Product>>, BackendError>;

    /// Exchange credentials for a session token.
    async fn login(&self, email: &str, password: &str) -> Result<SessionToken, BackendError>;

    /// Create an account and return its session token.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, BackendError>;

    /// Submit an order for the shopper behind `token`.
    async fn place_order(&self, token: &SessionToken, order: NewOrder) -> Result<(), BackendError>;

    /// Orders placed by the shopper behind `token`, oldest first.
    async fn orders(&self, token: &SessionToken) -> Result<Vec<Order>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_is_user_facing() {
        assert!(BackendError::Rejected("Invalid credentials".to_string()).is_user_facing());
        assert!(!BackendError::Internal("boom".to_string()).is_user_facing());
    }

    #[test]
    fn test_status_display() {
        let err = BackendError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned HTTP 502: bad gateway");
    }
}
