//! Layout data shared by every full page, and product card views.

use threadline_core::{CurrencyCode, Product};
use tower_sessions::Session;

use crate::middleware::take_flash;
use crate::models::{CurrentShopper, Flash, session_keys};
use crate::routes::cart::load_cart;

/// Navbar and notification data for the base layout.
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    pub cart_count: u32,
    pub logged_in: bool,
    pub flash: Option<Flash>,
}

impl PageContext {
    /// Gather layout data, consuming any pending flash message.
    pub async fn load(session: &Session) -> Self {
        let logged_in = session
            .get::<CurrentShopper>(session_keys::CURRENT_SHOPPER)
            .await
            .ok()
            .flatten()
            .is_some();

        Self {
            cart_count: load_cart(session).await.item_count(),
            logged_in,
            flash: take_flash(session).await,
        }
    }
}

/// Product tile used by listings.
#[derive(Clone, Debug)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
}

impl ProductCard {
    /// Build a card with the price formatted in `currency`.
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: currency.format(product.price),
            image: product.primary_image().map(str::to_owned),
        }
    }

    /// Build cards for a list of products.
    #[must_use]
    pub fn many(products: &[&Product], currency: CurrencyCode) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, currency)).collect()
    }
}
