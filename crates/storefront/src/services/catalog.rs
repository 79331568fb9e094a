//! Catalog listing: filtering, search and sorting.

use serde::Deserialize;
use threadline_core::Product;

/// How many products the home page shows as "latest".
pub const LATEST_LIMIT: usize = 10;

/// How many best sellers the home page shows.
pub const BESTSELLER_LIMIT: usize = 5;

/// Price ordering for the collection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Relevant,
    LowHigh,
    HighLow,
}

impl SortOrder {
    /// Every order, in dropdown order.
    pub const ALL: [Self; 3] = [Self::Relevant, Self::LowHigh, Self::HighLow];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevant => "relevant",
            Self::LowHigh => "low-high",
            Self::HighLow => "high-low",
        }
    }

    /// Dropdown label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Relevant => "Sort by: Relevant",
            Self::LowHigh => "Sort by: Low to High",
            Self::HighLow => "Sort by: High to Low",
        }
    }
}

/// Collection page query string.
///
/// Categories and sub-categories are comma-separated; an empty list means
/// no filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "subCategory")]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

fn split_list(value: Option<&str>) -> Vec<&str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

impl CatalogQuery {
    /// Selected categories.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        split_list(self.category.as_deref())
    }

    /// Selected sub-categories.
    #[must_use]
    pub fn sub_categories(&self) -> Vec<&str> {
        split_list(self.sub_category.as_deref())
    }
}

/// Apply search, category filters and sort to `products`.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], query: &CatalogQuery) -> Vec<&'a Product> {
    let categories = query.categories();
    let sub_categories = query.sub_categories();
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<&Product> = products
        .iter()
        .filter(|p| {
            needle
                .as_deref()
                .is_none_or(|n| p.name.to_lowercase().contains(n))
        })
        .filter(|p| categories.is_empty() || categories.contains(&p.category.as_str()))
        .filter(|p| {
            sub_categories.is_empty() || sub_categories.contains(&p.sub_category.as_str())
        })
        .collect();

    match query.sort {
        SortOrder::Relevant => {}
        SortOrder::LowHigh => matches.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::HighLow => matches.sort_by(|a, b| b.price.cmp(&a.price)),
    }
    matches
}

/// The first [`LATEST_LIMIT`] products in catalog order.
#[must_use]
pub fn latest(products: &[Product]) -> Vec<&Product> {
    products.iter().take(LATEST_LIMIT).collect()
}

/// Up to [`BESTSELLER_LIMIT`] products flagged as best sellers.
#[must_use]
pub fn bestsellers(products: &[Product]) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| p.bestseller)
        .take(BESTSELLER_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use threadline_core::ProductId;

    use super::*;

    fn product(id: &str, name: &str, category: &str, sub: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: Decimal::from(price),
            category: category.to_string(),
            sub_category: sub.to_string(),
            sizes: vec![],
            images: vec![],
            bestseller: id.ends_with('b'),
            date: 0,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Cotton Tee", "Men", "Topwear", 30),
            product("2b", "Linen Shirt", "Men", "Topwear", 50),
            product("3", "Denim Jeans", "Women", "Bottomwear", 40),
            product("4b", "Kids Tee", "Kids", "Topwear", 10),
        ]
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_no_filters_keeps_order() {
        let products = catalog();
        let result = filter_products(&products, &CatalogQuery::default());
        assert_eq!(ids(&result), ["1", "2b", "3", "4b"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let products = catalog();
        let query = CatalogQuery {
            search: Some("TEE".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&filter_products(&products, &query)), ["1", "4b"]);
    }

    #[test]
    fn test_category_and_sub_category_filters() {
        let products = catalog();
        let query = CatalogQuery {
            category: Some("Men,Kids".to_string()),
            sub_category: Some("Topwear".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&filter_products(&products, &query)), ["1", "2b", "4b"]);
    }

    #[test]
    fn test_sort_by_price() {
        let products = catalog();
        let low_high = CatalogQuery {
            sort: SortOrder::LowHigh,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&filter_products(&products, &low_high)), ["4b", "1", "3", "2b"]);

        let high_low = CatalogQuery {
            sort: SortOrder::HighLow,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&filter_products(&products, &high_low)), ["2b", "3", "1", "4b"]);
    }

    #[test]
    fn test_bestsellers() {
        let products = catalog();
        assert_eq!(ids(&bestsellers(&products)), ["2b", "4b"]);
        assert_eq!(latest(&products).len(), 4);
    }
}
