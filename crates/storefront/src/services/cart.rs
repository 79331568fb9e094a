//! Cart collaborator: validates add-to-cart requests and prices the cart.

use rust_decimal::Decimal;
use thiserror::Error;
use threadline_core::{Cart, CartLine, Product, ProductId, find_product};

use super::product_detail::AddToCartRequest;

/// Why an item could not be put in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No size was chosen.
    #[error("Select product size")]
    SizeNotSelected,

    /// The product id is not in the catalog.
    #[error("Product not found: {0}")]
    UnknownProduct(ProductId),

    /// The product does not come in that size.
    #[error("Size {size} is not available for this product")]
    UnknownSize {
        /// Requested size label.
        size: String,
    },
}

/// Cart totals for display and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// Applies cart requests against a product collection.
#[derive(Debug, Clone, Copy)]
pub struct CartService<'a> {
    products: &'a [Product],
    delivery_fee: Decimal,
}

impl<'a> CartService<'a> {
    /// Create a service over the current catalog.
    #[must_use]
    pub const fn new(products: &'a [Product], delivery_fee: Decimal) -> Self {
        Self {
            products,
            delivery_fee,
        }
    }

    /// Add one unit of the requested product and size.
    ///
    /// # Errors
    ///
    /// Rejects a missing or blank size, unknown products, and sizes the
    /// product is not offered in. The cart is unchanged on error.
    pub fn add(&self, cart: &mut Cart, request: AddToCartRequest) -> Result<(), CartError> {
        let size = request
            .size
            .filter(|s| !s.trim().is_empty())
            .ok_or(CartError::SizeNotSelected)?;

        let product = find_product(self.products, request.product_id.as_str())
            .ok_or_else(|| CartError::UnknownProduct(request.product_id.clone()))?;

        if !product.offers_size(&size) {
            return Err(CartError::UnknownSize { size });
        }

        cart.add(request.product_id, size);
        Ok(())
    }

    /// Set a line's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// A non-zero quantity for an unknown product, or for a size the
    /// product is not offered in, is rejected and leaves the cart unchanged.
    pub fn update(
        &self,
        cart: &mut Cart,
        product_id: &ProductId,
        size: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity > 0 {
            let product = find_product(self.products, product_id.as_str())
                .ok_or_else(|| CartError::UnknownProduct(product_id.clone()))?;
            if !product.offers_size(size) {
                return Err(CartError::UnknownSize {
                    size: size.to_string(),
                });
            }
        }

        cart.set_quantity(product_id, size, quantity);
        Ok(())
    }

    /// Lines resolved against the catalog.
    #[must_use]
    pub fn lines(&self, cart: &Cart) -> Vec<CartLine<'a>> {
        cart.lines(self.products)
    }

    /// Subtotal, delivery fee and total.
    ///
    /// The fee is charged whenever at least one line resolves against the
    /// catalog, even if every resolved item is free.
    #[must_use]
    pub fn totals(&self, cart: &Cart) -> CartTotals {
        let subtotal = cart.subtotal(self.products);
        let delivery_fee = if self.lines(cart).is_empty() {
            Decimal::ZERO
        } else {
            self.delivery_fee
        };
        CartTotals {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn products() -> Vec<Product> {
        vec![Product {
            id: ProductId::new("p1"),
            name: "Tee".to_string(),
            description: String::new(),
            price: Decimal::from(20),
            category: "Men".to_string(),
            sub_category: "Topwear".to_string(),
            sizes: vec!["S".to_string(), "M".to_string()],
            images: vec![],
            bestseller: false,
            date: 0,
        }]
    }

    fn request(size: Option<&str>) -> AddToCartRequest {
        AddToCartRequest {
            product_id: ProductId::new("p1"),
            size: size.map(str::to_string),
        }
    }

    #[test]
    fn test_add_requires_size() {
        let products = products();
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();

        assert_eq!(service.add(&mut cart, request(None)), Err(CartError::SizeNotSelected));
        assert_eq!(service.add(&mut cart, request(Some(" "))), Err(CartError::SizeNotSelected));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_unknown_product_and_size() {
        let products = products();
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();

        let unknown = AddToCartRequest {
            product_id: ProductId::new("nope"),
            size: Some("M".to_string()),
        };
        assert!(matches!(service.add(&mut cart, unknown), Err(CartError::UnknownProduct(_))));
        assert!(matches!(
            service.add(&mut cart, request(Some("XXL"))),
            Err(CartError::UnknownSize { .. })
        ));
    }

    #[test]
    fn test_totals_include_delivery_fee() {
        let products = products();
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();

        assert_eq!(service.totals(&cart).total, Decimal::ZERO);

        service.add(&mut cart, request(Some("M"))).unwrap();
        service.add(&mut cart, request(Some("M"))).unwrap();
        let totals = service.totals(&cart);
        assert_eq!(totals.subtotal, Decimal::from(40));
        assert_eq!(totals.delivery_fee, Decimal::from(10));
        assert_eq!(totals.total, Decimal::from(50));
    }

    #[test]
    fn test_update_to_zero_removes() {
        let products = products();
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();
        service.add(&mut cart, request(Some("S"))).unwrap();

        service.update(&mut cart, &ProductId::new("p1"), "S", 0).unwrap();
        assert!(cart.is_empty());
        assert!(service.lines(&cart).is_empty());
    }

    #[test]
    fn test_update_zero_removes_lines_for_unknown_products() {
        let products = products();
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();
        cart.add(ProductId::new("gone"), "M".to_string());

        service.update(&mut cart, &ProductId::new("gone"), "M", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_rejects_unknown_product_and_size() {
        let products = products();
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();
        service.add(&mut cart, request(Some("S"))).unwrap();

        assert_eq!(
            service.update(&mut cart, &ProductId::new("p1"), "XXL", 3),
            Err(CartError::UnknownSize {
                size: "XXL".to_string()
            })
        );
        assert!(matches!(
            service.update(&mut cart, &ProductId::new("nope"), "S", 2),
            Err(CartError::UnknownProduct(_))
        ));

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity(&ProductId::new("p1"), "XXL"), 0);
        assert_eq!(cart.quantity(&ProductId::new("nope"), "S"), 0);
    }

    #[test]
    fn test_update_sets_quantity_for_offered_size() {
        let products = products();
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();

        service.update(&mut cart, &ProductId::new("p1"), "M", 4).unwrap();
        assert_eq!(cart.quantity(&ProductId::new("p1"), "M"), 4);
    }

    #[test]
    fn test_free_items_still_pay_delivery_fee() {
        let mut products = products();
        products[0].price = Decimal::ZERO;
        let service = CartService::new(&products, Decimal::from(10));
        let mut cart = Cart::new();
        service.add(&mut cart, request(Some("M"))).unwrap();

        let totals = service.totals(&cart);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.delivery_fee, Decimal::from(10));
        assert_eq!(totals.total, Decimal::from(10));
    }
}
