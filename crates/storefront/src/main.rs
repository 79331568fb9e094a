//! Threadline Storefront - public e-commerce site.
//!
//! This binary serves the storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, HTMX for small interactive fragments
//! - Askama templates for server-side rendering
//! - Backend API (or the bundled fixture catalog) for products, shoppers and orders
//! - Optional `PostgreSQL` for sessions and per-browser local storage

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threadline_storefront::backend::{Backend, FixtureBackend, HttpBackend};
use threadline_storefront::config::StorefrontConfig;
use threadline_storefront::middleware::{memory_session_layer, postgres_session_layer};
use threadline_storefront::state::AppState;
use threadline_storefront::storage::{KeyValueStore, MemoryStore, PgKeyValueStore};
use threadline_storefront::{db, routes};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Pick the backend: remote API when `BACKEND_URL` is set, fixture catalog otherwise.
fn create_backend(config: &StorefrontConfig) -> Arc<dyn Backend> {
    if let Some(url) = &config.backend_url {
        tracing::info!(backend_url = %url, "Using HTTP backend");
        Arc::new(HttpBackend::new(url.clone()).expect("Failed to build backend HTTP client"))
    } else {
        tracing::info!(
            catalog = %config.shop.catalog_path.display(),
            "BACKEND_URL not set, using fixture backend"
        );
        Arc::new(
            FixtureBackend::from_path(&config.shop.catalog_path)
                .expect("Failed to load fixture catalog"),
        )
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "threadline_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let backend = create_backend(&config);

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p threadline-cli -- migrate
    let app = if let Some(database_url) = &config.database_url {
        let pool = db::create_pool(database_url)
            .await
            .expect("Failed to create database pool");
        tracing::info!("Database pool created");

        let store: Arc<dyn KeyValueStore> = Arc::new(PgKeyValueStore::new(pool.clone()));
        let session_layer = postgres_session_layer(&pool, &config);
        let state = AppState::new(config.clone(), backend, store, Some(pool));
        routes::app(state, session_layer)
    } else {
        tracing::warn!("No database configured, sessions and profiles are kept in memory");
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session_layer = memory_session_layer(&config);
        let state = AppState::new(config.clone(), backend, store, None);
        routes::app(state, session_layer)
    };

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
