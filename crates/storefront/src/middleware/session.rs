//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` when a database is configured, otherwise in
//! process memory. The session cookie is encrypted and authenticated with a
//! key derived from `STOREFRONT_SESSION_SECRET`; cookies that fail to decrypt
//! are ignored and the request starts a fresh session.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::PrivateCookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tl_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session layer with encrypted cookies.
pub type StorefrontSessionLayer<S> = SessionManagerLayer<S, PrivateCookie>;

/// Derive the cookie key from the session secret.
///
/// # Panics
///
/// Panics if the secret is shorter than 32 bytes.
/// [`StorefrontConfig::from_env`] never produces such a secret.
#[must_use]
pub fn session_key(config: &StorefrontConfig) -> Key {
    Key::derive_from(config.session_secret.expose_secret().as_bytes())
}

/// Create the session layer over any store.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StorefrontConfig) -> StorefrontSessionLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_private(session_key(config))
}

/// Session layer backed by `PostgreSQL`.
///
/// The `tower_sessions.session` table must exist (see `threadline-cli migrate`).
#[must_use]
pub fn postgres_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> StorefrontSessionLayer<PostgresStore> {
    create_session_layer(PostgresStore::new(pool.clone()), config)
}

/// Session layer backed by process memory.
#[must_use]
pub fn memory_session_layer(config: &StorefrontConfig) -> StorefrontSessionLayer<MemoryStore> {
    create_session_layer(MemoryStore::default(), config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use secrecy::SecretString;

    use super::*;
    use crate::config::ShopConfig;

    fn config(secret: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: None,
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(secret),
            shop: ShopConfig {
                catalog_path: PathBuf::new(),
                ..ShopConfig::default()
            },
            backend_url: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_session_key_follows_secret() {
        let a = config("k7Qw2mZr9Lx4Vb8Nc3Ft6Hy1Jd5Gs0Pa");
        let b = config("Pz3Xc8Vn1Bm6Lk4Jh9Gf2Ds7Aq5Wr0Ty");

        assert_eq!(session_key(&a), session_key(&a.clone()));
        assert_ne!(session_key(&a), session_key(&b));
    }
}
