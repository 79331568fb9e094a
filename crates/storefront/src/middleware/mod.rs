//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, encrypted cookie, memory or `PostgreSQL` store)
//! 5. Shopper extractors and flash helpers in handlers

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod session;

pub use auth::{OptionalShopper, RequireShopper, clear_current_shopper, set_current_shopper};
pub use flash::{set_flash, take_flash};
pub use request_id::request_id_middleware;
pub use session::{
    StorefrontSessionLayer, create_session_layer, memory_session_layer, postgres_session_layer,
    session_key,
};
