//! Checkout and order history handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_core::{DeliveryAddress, Order, OrderItem, PaymentMethod};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, NewOrder};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireShopper, clear_current_shopper, set_flash};
use crate::models::{CurrentShopper, Flash};
use crate::routes::cart::{CartTotalsView, load_cart, save_cart};
use crate::routes::page::PageContext;
use crate::services::{CartService, ProfileEditor};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    fn address(&self) -> DeliveryAddress {
        DeliveryAddress {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// A payment method radio button.
#[derive(Clone, Debug)]
pub struct PaymentOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn payment_options(current: PaymentMethod) -> Vec<PaymentOption> {
    [(PaymentMethod::Cod, "cod"), (PaymentMethod::Card, "card")]
        .into_iter()
        .map(|(method, value)| PaymentOption {
            value,
            label: method.label(),
            selected: method == current,
        })
        .collect()
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "place_order.html")]
pub struct PlaceOrderTemplate {
    pub page: PageContext,
    pub address: DeliveryAddress,
    pub payment_options: Vec<PaymentOption>,
    pub totals: CartTotalsView,
    pub error: Option<String>,
}

/// One purchased item in the order history.
#[derive(Clone, Debug)]
pub struct OrderRowView {
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub quantity: u32,
    pub size: String,
    pub date: String,
    pub payment_method: &'static str,
    pub paid: bool,
    pub status: String,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub rows: Vec<OrderRowView>,
}

/// Forget an expired login and send the shopper to the login page.
async fn relogin(session: &Session) -> Result<Response> {
    clear_current_shopper(session).await?;
    set_flash(session, Flash::error("Your session has expired, please log in again")).await;
    Ok(Redirect::to("/login").into_response())
}

/// Pre-fill the checkout form from the saved profile.
async fn prefill(
    state: &AppState,
    session: &Session,
    shopper: &CurrentShopper,
) -> Result<DeliveryAddress> {
    let storage = state.local_storage(session).await?;
    let editor = ProfileEditor::load(&storage, shopper.token.expose()).await?;
    let profile = editor.saved();
    let (first_name, last_name) = profile
        .name
        .split_once(' ')
        .unwrap_or((profile.name.as_str(), ""));

    Ok(DeliveryAddress {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: if profile.email.is_empty() {
            shopper.email.clone()
        } else {
            profile.email.clone()
        },
        city: profile.city.clone(),
        state: profile.state.clone(),
        postal_code: profile.postal_code.clone(),
        phone: profile.mobile_number.clone(),
        ..DeliveryAddress::default()
    })
}

async fn render_checkout(
    state: &AppState,
    session: &Session,
    address: DeliveryAddress,
    payment_method: PaymentMethod,
    error: Option<String>,
) -> Result<PlaceOrderTemplate> {
    let products = state.products().await?;
    let shop = &state.config().shop;
    let totals = CartService::new(&products, shop.delivery_fee).totals(&load_cart(session).await);

    Ok(PlaceOrderTemplate {
        page: PageContext::load(session).await,
        address,
        payment_options: payment_options(payment_method),
        totals: CartTotalsView {
            subtotal: shop.currency.format(totals.subtotal),
            delivery_fee: shop.currency.format(totals.delivery_fee),
            total: shop.currency.format(totals.total),
        },
        error,
    })
}

/// Display the checkout form.
#[instrument(skip(state, session, shopper))]
pub async fn place_order_page(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
) -> Result<Response> {
    if load_cart(&session).await.is_empty() {
        set_flash(&session, Flash::error("Your cart is empty")).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let address = prefill(&state, &session, &shopper).await?;
    Ok(render_checkout(&state, &session, address, PaymentMethod::default(), None)
        .await?
        .into_response())
}

/// Place the order with the backend, then clear the cart.
#[instrument(skip(state, session, shopper, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let address = form.address();

    let mut cart = load_cart(&session).await;
    if cart.is_empty() {
        set_flash(&session, Flash::error("Your cart is empty")).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    if let Err(err) = address.validate() {
        let page = render_checkout(
            &state,
            &session,
            address,
            form.payment_method,
            Some(err.to_string()),
        )
        .await?;
        return Ok(page.into_response());
    }

    let products = state.products().await?;
    let service = CartService::new(&products, state.config().shop.delivery_fee);
    let items: Vec<OrderItem> = service
        .lines(&cart)
        .into_iter()
        .map(|line| OrderItem {
            product_id: line.product.id.clone(),
            name: line.product.name.clone(),
            price: line.product.price,
            size: line.size.clone(),
            quantity: line.quantity,
            images: line.product.images.clone(),
        })
        .collect();
    let order = NewOrder {
        items,
        amount: service.totals(&cart).total,
        address: address.clone(),
        payment_method: form.payment_method,
    };

    match state.backend().place_order(&shopper.token, order).await {
        Ok(()) => {}
        Err(BackendError::Unauthorized) => return relogin(&session).await,
        Err(BackendError::Rejected(message)) => {
            let page =
                render_checkout(&state, &session, address, form.payment_method, Some(message))
                    .await?;
            return Ok(page.into_response());
        }
        Err(e) => return Err(e.into()),
    }

    cart.clear();
    save_cart(&session, &cart).await?;
    add_breadcrumb("checkout", "Order placed", None);
    set_flash(&session, Flash::success("Order placed")).await;
    Ok(Redirect::to("/orders").into_response())
}

fn order_rows(
    mut orders: Vec<Order>,
    currency: threadline_core::CurrencyCode,
) -> Vec<OrderRowView> {
    orders.sort_by(|a, b| b.date.cmp(&a.date));
    orders
        .iter()
        .flat_map(|order| {
            let date = order
                .placed_at()
                .map(|at| at.format("%a %b %d %Y").to_string())
                .unwrap_or_default();
            order.items.iter().map(move |item| OrderRowView {
                name: item.name.clone(),
                image: item.images.first().cloned(),
                price: currency.format(item.price),
                quantity: item.quantity,
                size: item.size.clone(),
                date: date.clone(),
                payment_method: order.payment_method.label(),
                paid: order.payment,
                status: order.status.as_str().to_string(),
            })
        })
        .collect()
}

/// Display the shopper's orders, newest first.
#[instrument(skip(state, session, shopper))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
) -> Result<Response> {
    let orders = match state.backend().orders(&shopper.token).await {
        Ok(orders) => orders,
        Err(BackendError::Unauthorized) => return relogin(&session).await,
        Err(e) => return Err(e.into()),
    };

    Ok(OrdersTemplate {
        page: PageContext::load(&session).await,
        rows: order_rows(orders, state.config().shop.currency),
    }
    .into_response())
}
