//! Cart route handlers.
//!
//! The cart lives in the session. Requests carrying `HX-Request` get the
//! cart count fragment back with an `HX-Trigger: cart-updated` header;
//! plain form posts are redirected.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_core::{Cart, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::set_flash;
use crate::models::{Flash, session_keys};
use crate::routes::page::PageContext;
use crate::routes::products::product_href;
use crate::services::{CartError, CartService, ProductDetail};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone, Debug)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub size: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Cart totals display data for templates.
#[derive(Clone, Debug)]
pub struct CartTotalsView {
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLineView>,
    pub totals: CartTotalsView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub size: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub size: String,
    pub quantity: u32,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the cart from the session. A missing or unreadable cart is empty.
pub(crate) async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Write the cart to the session.
pub(crate) async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartTemplate> {
    let products = state.products().await?;
    let shop = &state.config().shop;
    let cart = load_cart(&session).await;
    let service = CartService::new(&products, shop.delivery_fee);

    let lines = service
        .lines(&cart)
        .into_iter()
        .map(|line| CartLineView {
            product_id: line.product.id.to_string(),
            name: line.product.name.clone(),
            image: line.product.primary_image().map(str::to_owned),
            size: line.size.clone(),
            quantity: line.quantity,
            price: shop.currency.format(line.product.price),
            line_total: shop.currency.format(line.line_total()),
        })
        .collect();
    let totals = service.totals(&cart);

    Ok(CartTemplate {
        page: PageContext::load(&session).await,
        lines,
        totals: CartTotalsView {
            subtotal: shop.currency.format(totals.subtotal),
            delivery_fee: shop.currency.format(totals.delivery_fee),
            total: shop.currency.format(totals.total),
        },
    })
}

/// Add one unit of a product in the chosen size.
///
/// Missing sizes and unknown products or sizes are reported as a flash
/// message on the product page.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let products = state.products().await?;
    let service = CartService::new(&products, state.config().shop.delivery_fee);

    let Some(mut detail) = ProductDetail::lookup(&products, &form.product_id) else {
        let err = CartError::UnknownProduct(ProductId::new(form.product_id));
        set_flash(&session, Flash::error(err.to_string())).await;
        return Ok(Redirect::to("/collection").into_response());
    };
    detail.select_size(form.size.as_deref().unwrap_or_default());
    let request = detail.add_to_cart_request();
    let back = product_href(&form.product_id, None, request.size.as_deref());

    let mut cart = load_cart(&session).await;
    if let Err(err) = service.add(&mut cart, request) {
        tracing::debug!(error = %err, "Add to cart rejected");
        set_flash(&session, Flash::error(err.to_string())).await;
        return Ok(Redirect::to(&back).into_response());
    }

    save_cart(&session, &cart).await?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", form.product_id.as_str())]),
    );

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response());
    }
    set_flash(&session, Flash::success("Added to cart")).await;
    Ok(Redirect::to(&back).into_response())
}

/// Set a line's quantity (0 removes it).
///
/// Unknown products and unoffered sizes are flashed and leave the cart as is.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let products = state.products().await?;
    let service = CartService::new(&products, state.config().shop.delivery_fee);

    let mut cart = load_cart(&session).await;
    if let Err(err) = service.update(
        &mut cart,
        &ProductId::new(form.product_id),
        &form.size,
        form.quantity,
    ) {
        tracing::debug!(error = %err, "Cart update rejected");
        set_flash(&session, Flash::error(err.to_string())).await;
        if is_htmx(&headers) {
            return Ok(CartCountTemplate {
                count: cart.item_count(),
            }
            .into_response());
        }
        return Ok(Redirect::to("/cart").into_response());
    }
    save_cart(&session, &cart).await?;

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response());
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> CartCountTemplate {
    CartCountTemplate {
        count: load_cart(&session).await.item_count(),
    }
}
