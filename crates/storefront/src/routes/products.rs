//! Product detail route handler.
//!
//! Image and size choices travel in the query string (`?image=...&size=...`)
//! so each click is a plain link.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::page::{PageContext, ProductCard};
use crate::services::ProductDetail;
use crate::state::AppState;

/// Transient selections on the product page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub image: Option<String>,
    pub size: Option<String>,
}

/// Product display data for templates.
#[derive(Clone, Debug)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
}

/// A thumbnail link.
#[derive(Clone, Debug)]
pub struct ImageOption {
    pub url: String,
    pub selected: bool,
    pub href: String,
}

/// A size button link.
#[derive(Clone, Debug)]
pub struct SizeOption {
    pub label: String,
    pub selected: bool,
    pub href: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub product: ProductView,
    pub selected_image: Option<String>,
    pub images: Vec<ImageOption>,
    pub sizes: Vec<SizeOption>,
    pub selected_size: String,
    pub related: Vec<ProductCard>,
}

/// Link to a product page with the given selections.
pub(crate) fn product_href(id: &str, image: Option<&str>, size: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(image) = image {
        query.append_pair("image", image);
    }
    if let Some(size) = size {
        query.append_pair("size", size);
    }
    let query = query.finish();
    let id: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
    let path = format!("/product/{id}");
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

/// Display a product.
///
/// Unknown ids are a 404.
#[instrument(skip(state, session, query))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<ProductTemplate> {
    let products = state.products().await?;
    let currency = state.config().shop.currency;

    let mut detail = ProductDetail::lookup(&products, &id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    if let Some(image) = query.image.as_deref() {
        detail.select_image(image);
    }
    if let Some(size) = query.size.as_deref() {
        detail.select_size(size);
    }

    let product = detail.product();
    let selected_image = detail.selected_image();
    let selected_size = detail.selected_size();

    let images = product
        .images
        .iter()
        .map(|url| ImageOption {
            url: url.clone(),
            selected: selected_image == Some(url.as_str()),
            href: product_href(&id, Some(url), selected_size),
        })
        .collect();

    let sizes = product
        .sizes
        .iter()
        .map(|label| SizeOption {
            label: label.clone(),
            selected: selected_size == Some(label.as_str()),
            href: product_href(&id, selected_image, Some(label)),
        })
        .collect();

    Ok(ProductTemplate {
        page: PageContext::load(&session).await,
        product: ProductView {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: currency.format(product.price),
        },
        selected_image: selected_image.map(str::to_owned),
        images,
        sizes,
        selected_size: selected_size.unwrap_or_default().to_string(),
        related: ProductCard::many(&detail.related(&products), currency),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_href() {
        assert_eq!(product_href("p1", None, None), "/product/p1");
        assert_eq!(
            product_href("p1", Some("/img/a b.png"), Some("M")),
            "/product/p1?image=%2Fimg%2Fa+b.png&size=M"
        );
    }
}
