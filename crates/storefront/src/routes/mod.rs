//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (latest, best sellers)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database, backend)
//!
//! # Catalog
//! GET  /collection             - Product listing (?search, category, subCategory, sort)
//! GET  /product/{id}           - Product detail (?image, size)
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (HTMX: count fragment + cart-updated)
//! POST /cart/update            - Set a line's quantity
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (requires login)
//! GET  /place-order            - Delivery address form
//! POST /place-order            - Place the order
//! GET  /orders                 - Order history
//!
//! # Auth
//! GET  /login                  - Login / sign-up page (?mode=signup)
//! POST /login                  - Login or sign-up action
//! POST /logout                 - Logout action
//!
//! # Profile (requires login)
//! GET  /profile                - Profile view or form
//! POST /profile/edit           - Enter edit mode
//! POST /profile/toggle         - Toggle edit mode (cancel discards the draft)
//! POST /profile/field          - Update one draft field
//! POST /profile/save           - Validate and persist
//! POST /profile/image          - Upload avatar (multipart)
//! ```

pub mod auth;
pub mod cart;
pub mod collection;
pub mod home;
pub mod orders;
pub mod page;
pub mod products;
pub mod profile;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
};
use threadline_core::ProfileImage;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::{StorefrontSessionLayer, request_id_middleware};
use crate::state::AppState;

/// Multipart overhead allowed on top of the largest accepted avatar.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/count", get(cart::count))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show))
        .route("/edit", post(profile::edit))
        .route("/toggle", post(profile::toggle))
        .route("/field", post(profile::set_field))
        .route("/save", post(profile::save))
        .route(
            "/image",
            post(profile::upload_image).layer(DefaultBodyLimit::max(
                ProfileImage::MAX_BYTES + UPLOAD_OVERHEAD_BYTES,
            )),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/collection", get(collection::index))
        .route("/product/{id}", get(products::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout and orders
        .route(
            "/place-order",
            get(orders::place_order_page).post(orders::place_order),
        )
        .route("/orders", get(orders::orders))
        // Auth routes
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        // Profile routes
        .nest("/profile", profile_routes())
}

/// Build the full application: routes, static files, sessions, tracing and
/// Sentry layers.
pub fn app<S>(state: AppState, session_layer: StorefrontSessionLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity (when configured) and that the backend
/// serves the catalog. Returns 503 Service Unavailable otherwise.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Some(pool) = state.pool()
        && let Err(e) = sqlx::query("SELECT 1").fetch_one(pool).await
    {
        tracing::warn!(error = %e, "Readiness: database unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match state.products().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness: backend unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
