//! Catalog file checks.
//!
//! The storefront serves a JSON array of products when no backend URL is
//! configured. A bad file only shows up at request time (blank product pages,
//! carts that refuse every size), so check it up front.

use std::collections::HashSet;
use std::path::Path;

use threadline_core::Product;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog has {0} problem(s)")]
    Invalid(usize),
}

/// A problem with one product in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub product_id: String,
    pub message: String,
}

/// Find duplicate ids, missing images or sizes, and negative prices.
#[must_use]
pub fn problems(products: &[Product]) -> Vec<Problem> {
    let mut seen = HashSet::new();
    let mut problems = Vec::new();
    let mut report = |product: &Product, message: &str| {
        problems.push(Problem {
            product_id: product.id.to_string(),
            message: message.to_string(),
        });
    };

    for product in products {
        if !seen.insert(product.id.as_str()) {
            report(product, "duplicate id");
        }
        if product.name.trim().is_empty() {
            report(product, "missing name");
        }
        if product.images.is_empty() {
            report(product, "no images");
        }
        if product.sizes.is_empty() {
            report(product, "no sizes");
        }
        if product.price.is_sign_negative() {
            report(product, "negative price");
        }
    }
    problems
}

/// Load and check a catalog file, logging each problem found.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or has problems.
pub fn check(path: &Path) -> Result<(), CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let products: Vec<Product> = serde_json::from_str(&raw)?;

    let found = problems(&products);
    for problem in &found {
        warn!(product_id = %problem.product_id, "{}", problem.message);
    }
    if !found.is_empty() {
        return Err(CatalogError::Invalid(found.len()));
    }

    info!(path = %path.display(), count = products.len(), "Catalog OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use threadline_core::ProductId;

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: 25.into(),
            category: "Men".to_string(),
            sub_category: "Topwear".to_string(),
            sizes: vec!["M".to_string()],
            images: vec!["/static/images/item_1.svg".to_string()],
            bestseller: false,
            date: 0,
        }
    }

    #[test]
    fn test_clean_catalog() {
        assert!(problems(&[product("a"), product("b")]).is_empty());
    }

    #[test]
    fn test_reports_duplicates_and_missing_fields() {
        let mut bare = product("b");
        bare.images.clear();
        bare.sizes.clear();

        let found = problems(&[product("a"), product("a"), bare]);
        let messages: Vec<_> = found.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(messages, ["duplicate id", "no images", "no sizes"]);
        assert_eq!(found[0].product_id, "a");
    }
}
