//! Catalog product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A purchasable product, as supplied by the catalog backend.
///
/// Field names on the wire follow the backend's JSON (`_id`, `subCategory`,
/// `image`). The storefront only ever holds products read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price in the storefront currency.
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "subCategory", default)]
    pub sub_category: String,
    /// Size labels in display order (e.g. `["S", "M", "L"]`).
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Image references in display order.
    #[serde(rename = "image", default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub bestseller: bool,
    /// Creation time in milliseconds since the epoch.
    #[serde(default)]
    pub date: i64,
}

impl Product {
    /// The image shown before the shopper picks one.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether `size` is one of this product's size labels.
    #[must_use]
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

/// Find a product by id in a collection.
///
/// Linear scan; the first match wins if the source contains duplicates.
#[must_use]
pub fn find_product<'a>(products: &'a [Product], id: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.id.as_str() == id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fixtures {
    use super::*;

    pub fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from(price),
            category: "Men".to_string(),
            sub_category: "Topwear".to_string(),
            sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            images: vec![format!("/img/{id}_a.png"), format!("/img/{id}_b.png")],
            bestseller: false,
            date: 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::product;
    use super::*;

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{
            "_id": "p1",
            "name": "Cotton Tee",
            "description": "Soft",
            "price": 25.5,
            "category": "Women",
            "subCategory": "Topwear",
            "sizes": ["S", "M"],
            "image": ["/a.png", "/b.png"],
            "bestseller": true,
            "date": 1716634345448
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.id.as_str(), "p1");
        assert_eq!(p.price, Decimal::new(255, 1));
        assert_eq!(p.sub_category, "Topwear");
        assert_eq!(p.primary_image(), Some("/a.png"));
        assert!(p.bestseller);
    }

    #[test]
    fn test_find_first_match_wins() {
        let mut dup = product("p1", 99);
        dup.name = "Duplicate".to_string();
        let products = vec![product("p0", 1), product("p1", 10), dup];

        let found = find_product(&products, "p1").unwrap();
        assert_eq!(found.price, Decimal::from(10));
        assert!(find_product(&products, "missing").is_none());
    }

    #[test]
    fn test_offers_size() {
        let p = product("p1", 10);
        assert!(p.offers_size("M"));
        assert!(!p.offers_size("XXL"));
    }
}
