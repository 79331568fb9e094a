//! Shopping cart contents.
//!
//! A cart maps product id to size to quantity. It knows nothing about prices
//! until it is priced against a product collection.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::{Product, find_product};

/// One priced line of a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine<'a> {
    pub product: &'a Product,
    pub size: String,
    pub quantity: u32,
}

impl CartLine<'_> {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Quantities keyed by product id, then size label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<ProductId, BTreeMap<String, u32>>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product_id` in `size`.
    pub fn add(&mut self, product_id: ProductId, size: impl Into<String>) {
        let quantity = self
            .items
            .entry(product_id)
            .or_default()
            .entry(size.into())
            .or_insert(0);
        *quantity = quantity.saturating_add(1);
    }

    /// Set the quantity of a line. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: &ProductId, size: &str, quantity: u32) {
        if quantity == 0 {
            if let Some(sizes) = self.items.get_mut(product_id) {
                sizes.remove(size);
                if sizes.is_empty() {
                    self.items.remove(product_id);
                }
            }
            return;
        }

        self.items
            .entry(product_id.clone())
            .or_default()
            .insert(size.to_owned(), quantity);
    }

    /// Quantity held for a product/size pair.
    #[must_use]
    pub fn quantity(&self, product_id: &ProductId, size: &str) -> u32 {
        self.items
            .get(product_id)
            .and_then(|sizes| sizes.get(size))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .values()
            .flat_map(BTreeMap::values)
            .fold(0_u32, |acc, q| acc.saturating_add(*q))
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Resolve lines against a product collection.
    ///
    /// Lines whose product is no longer in the collection are skipped.
    #[must_use]
    pub fn lines<'a>(&self, products: &'a [Product]) -> Vec<CartLine<'a>> {
        self.items
            .iter()
            .filter_map(|(id, sizes)| find_product(products, id.as_str()).map(|p| (p, sizes)))
            .flat_map(|(product, sizes)| {
                sizes.iter().map(move |(size, quantity)| CartLine {
                    product,
                    size: size.clone(),
                    quantity: *quantity,
                })
            })
            .collect()
    }

    /// Sum of line totals for lines that resolve against `products`.
    #[must_use]
    pub fn subtotal(&self, products: &[Product]) -> Decimal {
        self.lines(products).iter().map(CartLine::line_total).sum()
    }
}
