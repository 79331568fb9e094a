//! Login, sign-up and logout handlers.
//!
//! Credentials go straight to the backend; the token it returns is kept in
//! the session as the shopper's login.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::BackendError;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalShopper, clear_current_shopper, set_current_shopper, set_flash};
use crate::models::{CurrentShopper, Flash};
use crate::routes::page::PageContext;
use crate::state::AppState;

/// Which form the login page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMode {
    #[default]
    Login,
    Signup,
}

/// Login page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub mode: LoginMode,
}

/// Login / sign-up form data.
///
/// No `Debug`: the password must not reach the logs.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub mode: LoginMode,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub signup: bool,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

/// Display the login page.
#[instrument(skip(session, shopper))]
pub async fn login_page(
    session: Session,
    OptionalShopper(shopper): OptionalShopper,
    Query(query): Query<LoginQuery>,
) -> Response {
    if shopper.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        page: PageContext::load(&session).await,
        signup: query.mode == LoginMode::Signup,
        name: String::new(),
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Log in or sign up through the backend.
#[instrument(skip(state, session, form), fields(mode = ?form.mode))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();
    let password = form.password.as_str();

    let result = match form.mode {
        LoginMode::Login => state.backend().login(&email, password).await,
        LoginMode::Signup => {
            state
                .backend()
                .register(form.name.trim(), &email, password)
                .await
        }
    };

    let token = match result {
        Ok(token) => token,
        Err(err @ (BackendError::Rejected(_) | BackendError::Unauthorized)) => {
            tracing::info!(error = %err, "Login rejected");
            let message = match err {
                BackendError::Rejected(message) => message,
                _ => "Invalid credentials".to_string(),
            };
            return Ok(LoginTemplate {
                page: PageContext::load(&session).await,
                signup: form.mode == LoginMode::Signup,
                name: form.name,
                email,
                error: Some(message),
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_shopper(
        &session,
        &CurrentShopper {
            token,
            email: email.clone(),
        },
    )
    .await?;
    set_sentry_user(&email);
    tracing::info!("Shopper logged in");

    let welcome = match form.mode {
        LoginMode::Login => "Welcome back",
        LoginMode::Signup => "Account created",
    };
    set_flash(&session, Flash::success(welcome)).await;
    Ok(Redirect::to("/").into_response())
}

/// Log out. The cart stays with the browser.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_shopper(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
