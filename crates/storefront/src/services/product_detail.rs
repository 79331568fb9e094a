//! Product detail lookup and the shopper's transient selections.

use threadline_core::{Product, ProductId, find_product};

/// Maximum number of related products shown under a product.
pub const RELATED_LIMIT: usize = 5;

/// Request handed to the cart when the shopper clicks "add to cart".
///
/// The size is passed through as chosen; the cart decides whether a missing
/// size is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub size: Option<String>,
}

/// A product being viewed, plus the image and size the shopper picked.
///
/// Borrows the product from the catalog; selections never modify it.
#[derive(Debug, Clone)]
pub struct ProductDetail<'a> {
    product: &'a Product,
    selected_image: Option<&'a str>,
    selected_size: Option<String>,
}

impl<'a> ProductDetail<'a> {
    /// Find `id` in `products` (first match wins) and start on its first image.
    #[must_use]
    pub fn lookup(products: &'a [Product], id: &str) -> Option<Self> {
        find_product(products, id).map(|product| Self {
            product,
            selected_image: product.primary_image(),
            selected_size: None,
        })
    }

    /// The product being viewed.
    #[must_use]
    pub const fn product(&self) -> &'a Product {
        self.product
    }

    /// Image currently displayed large.
    #[must_use]
    pub const fn selected_image(&self) -> Option<&'a str> {
        self.selected_image
    }

    /// Size the shopper picked, if any.
    #[must_use]
    pub fn selected_size(&self) -> Option<&str> {
        self.selected_size.as_deref()
    }

    /// Display another of the product's images.
    ///
    /// References that are not among the product's images are ignored.
    pub fn select_image(&mut self, image: &str) {
        if let Some(found) = self.product.images.iter().find(|i| *i == image) {
            self.selected_image = Some(found.as_str());
        }
    }

    /// Record a size choice. Blank input clears the choice.
    pub fn select_size(&mut self, size: &str) {
        let size = size.trim();
        self.selected_size = (!size.is_empty()).then(|| size.to_owned());
    }

    /// Build the add-to-cart request for the current selection.
    #[must_use]
    pub fn add_to_cart_request(&self) -> AddToCartRequest {
        AddToCartRequest {
            product_id: self.product.id.clone(),
            size: self.selected_size.clone(),
        }
    }

    /// Products sharing category and sub-category, excluding this one.
    #[must_use]
    pub fn related(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products
            .iter()
            .filter(|p| {
                p.id != self.product.id
                    && p.category == self.product.category
                    && p.sub_category == self.product.sub_category
            })
            .take(RELATED_LIMIT)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from(10),
            category: category.to_string(),
            sub_category: "Topwear".to_string(),
            sizes: vec!["S".to_string(), "M".to_string()],
            images: vec![format!("{id}-front.png"), format!("{id}-back.png")],
            bestseller: false,
            date: 0,
        }
    }

    #[test]
    fn test_lookup_starts_on_first_image() {
        let products = vec![product("p0", "Men"), product("p1", "Men")];
        let detail = ProductDetail::lookup(&products, "p1").unwrap();
        assert_eq!(detail.product().id.as_str(), "p1");
        assert_eq!(detail.selected_image(), Some("p1-front.png"));
    }

    #[test]
    fn test_lookup_unknown_id() {
        let products = vec![product("p0", "Men")];
        assert!(ProductDetail::lookup(&products, "p9").is_none());
    }

    #[test]
    fn test_lookup_without_images() {
        let mut bare = product("p1", "Men");
        bare.images.clear();
        let products = vec![bare];
        let detail = ProductDetail::lookup(&products, "p1").unwrap();
        assert_eq!(detail.selected_image(), None);
    }

    #[test]
    fn test_select_image_changes_only_display() {
        let products = vec![product("p1", "Men")];
        let before = products.clone();
        let mut detail = ProductDetail::lookup(&products, "p1").unwrap();

        detail.select_image("p1-back.png");
        assert_eq!(detail.selected_image(), Some("p1-back.png"));

        detail.select_image("someone-else.png");
        assert_eq!(detail.selected_image(), Some("p1-back.png"));
        assert_eq!(products, before);
    }

    #[test]
    fn test_add_to_cart_request_passes_size_through() {
        let products = vec![product("p1", "Men")];
        let mut detail = ProductDetail::lookup(&products, "p1").unwrap();
        assert_eq!(
            detail.add_to_cart_request(),
            AddToCartRequest {
                product_id: ProductId::new("p1"),
                size: None
            }
        );

        detail.select_size("M");
        assert_eq!(detail.add_to_cart_request().size.as_deref(), Some("M"));

        detail.select_size("  ");
        assert_eq!(detail.selected_size(), None);
    }

    #[test]
    fn test_related_excludes_self_and_other_categories() {
        let mut products: Vec<Product> = (0..8).map(|i| product(&format!("m{i}"), "Men")).collect();
        products.push(product("w0", "Women"));

        let detail = ProductDetail::lookup(&products, "m0").unwrap();
        let related = detail.related(&products);

        assert_eq!(related.len(), RELATED_LIMIT);
        assert!(related.iter().all(|p| p.category == "Men" && p.id.as_str() != "m0"));
    }
}
