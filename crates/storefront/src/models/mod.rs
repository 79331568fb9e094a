//! Session-held models for the storefront.
//!
//! Catalog, cart and profile types live in `threadline-core`; this module only
//! holds what is specific to a browser session.

pub mod session;

pub use session::{CurrentShopper, Flash, FlashKind, SessionToken, keys as session_keys};
