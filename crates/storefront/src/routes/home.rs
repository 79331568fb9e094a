//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::page::{PageContext, ProductCard};
use crate::services::catalog;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub latest: Vec<ProductCard>,
    pub bestsellers: Vec<ProductCard>,
}

/// Display the home page: latest arrivals and best sellers.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let products = state.products().await?;
    let currency = state.config().shop.currency;

    Ok(HomeTemplate {
        page: PageContext::load(&session).await,
        latest: ProductCard::many(&catalog::latest(&products), currency),
        bestsellers: ProductCard::many(&catalog::bestsellers(&products), currency),
    })
}
