//! Authentication extractors.
//!
//! The shopper counts as logged in while a backend session token is present
//! in the tower session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentShopper, session_keys};

/// Extractor that requires a logged-in shopper.
///
/// If nobody is logged in, HTML requests are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireShopper(shopper): RequireShopper) -> impl IntoResponse {
///     format!("Orders for {}", shopper.email)
/// }
/// ```
pub struct RequireShopper(pub CurrentShopper);

/// Error returned when a shopper is required but nobody is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (no session layer, or fragment requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireShopper
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let shopper: CurrentShopper = session
            .get(session_keys::CURRENT_SHOPPER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if parts.headers.contains_key("hx-request") {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(shopper))
    }
}

/// Extractor that optionally gets the current shopper.
///
/// Unlike `RequireShopper`, this does not reject the request if nobody is logged in.
pub struct OptionalShopper(pub Option<CurrentShopper>);

impl<S> FromRequestParts<S> for OptionalShopper
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let shopper = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentShopper>(session_keys::CURRENT_SHOPPER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(shopper))
    }
}

/// Helper to set the current shopper in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_shopper(
    session: &Session,
    shopper: &CurrentShopper,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_SHOPPER, shopper).await
}

/// Helper to clear the current shopper from the session (logout).
///
/// The cart and browser storage namespace stay; the open profile editor is
/// dropped with the login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_shopper(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentShopper>(session_keys::CURRENT_SHOPPER)
        .await?;
    session
        .remove::<serde_json::Value>(session_keys::PROFILE_EDITOR)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::SessionToken;

    fn session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_set_and_clear_shopper_keeps_cart() {
        let session = session();
        session.insert(session_keys::CART, "cart-data").await.unwrap();
        let shopper = CurrentShopper {
            token: SessionToken::new("tok"),
            email: "a@b.com".to_string(),
        };

        set_current_shopper(&session, &shopper).await.unwrap();
        let stored: Option<CurrentShopper> =
            session.get(session_keys::CURRENT_SHOPPER).await.unwrap();
        assert_eq!(stored.unwrap().email, "a@b.com");

        clear_current_shopper(&session).await.unwrap();
        let stored: Option<CurrentShopper> =
            session.get(session_keys::CURRENT_SHOPPER).await.unwrap();
        assert!(stored.is_none());
        let cart: Option<String> = session.get(session_keys::CART).await.unwrap();
        assert_eq!(cart.as_deref(), Some("cart-data"));
    }
}
