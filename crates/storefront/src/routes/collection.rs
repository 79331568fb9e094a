//! Collection page: the whole catalog with filters, search and sort.
//!
//! Filters are plain links that toggle one value in the comma-separated
//! `category` / `subCategory` query parameters, so the page works without
//! JavaScript.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use threadline_core::Product;
use tower_sessions::Session;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::Result;
use crate::filters;
use crate::routes::page::{PageContext, ProductCard};
use crate::services::catalog::{self, CatalogQuery, SortOrder};
use crate::state::AppState;

/// A filter toggle link.
#[derive(Clone, Debug)]
pub struct FilterOption {
    pub value: String,
    pub checked: bool,
    pub href: String,
}

/// A sort dropdown entry.
#[derive(Clone, Debug)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Collection page template.
#[derive(Template, WebTemplate)]
#[template(path = "collection.html")]
pub struct CollectionTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCard>,
    pub search: String,
    pub category: String,
    pub sub_category: String,
    pub categories: Vec<FilterOption>,
    pub sub_categories: Vec<FilterOption>,
    pub sort_options: Vec<SortOption>,
}

/// The active filter state, used to build toggle links.
struct Selection<'a> {
    search: &'a str,
    categories: Vec<&'a str>,
    sub_categories: Vec<&'a str>,
    sort: SortOrder,
}

impl Selection<'_> {
    fn href(&self, categories: &[&str], sub_categories: &[&str]) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            query.append_pair("search", self.search);
        }
        if !categories.is_empty() {
            query.append_pair("category", &categories.join(","));
        }
        if !sub_categories.is_empty() {
            query.append_pair("subCategory", &sub_categories.join(","));
        }
        if self.sort != SortOrder::Relevant {
            query.append_pair("sort", self.sort.as_str());
        }
        let query = query.finish();
        if query.is_empty() {
            "/collection".to_string()
        } else {
            format!("/collection?{query}")
        }
    }
}

fn toggled<'a>(selected: &[&'a str], value: &'a str) -> Vec<&'a str> {
    if selected.contains(&value) {
        selected.iter().copied().filter(|v| *v != value).collect()
    } else {
        let mut next = selected.to_vec();
        next.push(value);
        next
    }
}

/// Distinct non-empty values of a product attribute, in catalog order.
fn distinct<'a>(products: &'a [Product], attr: impl Fn(&'a Product) -> &'a str) -> Vec<&'a str> {
    let mut values: Vec<&str> = Vec::new();
    for value in products.iter().map(attr) {
        if !value.is_empty() && !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

fn sort_options(current: SortOrder) -> Vec<SortOption> {
    SortOrder::ALL
        .into_iter()
        .map(|order| SortOption {
            value: order.as_str(),
            label: order.label(),
            selected: order == current,
        })
        .collect()
}

/// Display the collection page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<CollectionTemplate> {
    let products = state.products().await?;
    let currency = state.config().shop.currency;
    let matches = catalog::filter_products(&products, &query);

    let selection = Selection {
        search: query.search.as_deref().unwrap_or_default(),
        categories: query.categories(),
        sub_categories: query.sub_categories(),
        sort: query.sort,
    };

    let categories = distinct(&products, |p| p.category.as_str())
        .into_iter()
        .map(|value| FilterOption {
            value: value.to_string(),
            checked: selection.categories.contains(&value),
            href: selection.href(
                &toggled(&selection.categories, value),
                &selection.sub_categories,
            ),
        })
        .collect();

    let sub_categories = distinct(&products, |p| p.sub_category.as_str())
        .into_iter()
        .map(|value| FilterOption {
            value: value.to_string(),
            checked: selection.sub_categories.contains(&value),
            href: selection.href(
                &selection.categories,
                &toggled(&selection.sub_categories, value),
            ),
        })
        .collect();

    Ok(CollectionTemplate {
        page: PageContext::load(&session).await,
        products: ProductCard::many(&matches, currency),
        search: selection.search.to_string(),
        category: selection.categories.join(","),
        sub_category: selection.sub_categories.join(","),
        categories,
        sub_categories,
        sort_options: sort_options(query.sort),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggled_adds_and_removes() {
        assert_eq!(toggled(&["Men"], "Women"), ["Men", "Women"]);
        assert_eq!(toggled(&["Men", "Women"], "Men"), ["Women"]);
    }

    #[test]
    fn test_href_encodes_selection() {
        let selection = Selection {
            search: "blue tee",
            categories: vec![],
            sub_categories: vec![],
            sort: SortOrder::LowHigh,
        };
        assert_eq!(
            selection.href(&["Men", "Kids"], &[]),
            "/collection?search=blue+tee&category=Men%2CKids&sort=low-high"
        );

        let empty = Selection {
            search: "",
            categories: vec![],
            sub_categories: vec![],
            sort: SortOrder::Relevant,
        };
        assert_eq!(empty.href(&[], &[]), "/collection");
    }
}
