//! Session-related types.
//!
//! Types stored in the tower session between requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token issued by the backend at login.
///
/// Also namespaces the shopper's stored avatar image.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a backend-issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for backend calls and storage keys.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// The logged-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentShopper {
    /// Backend session token.
    pub token: SessionToken,
    /// Email used to log in.
    pub email: String,
}

/// Severity of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    /// A success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    /// An error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Whether this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == FlashKind::Error
    }
}

/// Session keys.
pub mod keys {
    /// Key for the logged-in shopper.
    pub const CURRENT_SHOPPER: &str = "current_shopper";

    /// Key for the random id namespacing this browser's local storage.
    pub const BROWSER_ID: &str = "browser_id";

    /// Key for the cart contents.
    pub const CART: &str = "cart";

    /// Key for the profile editor state between requests.
    pub const PROFILE_EDITOR: &str = "profile_editor";

    /// Key for the pending flash notification.
    pub const FLASH: &str = "flash";
}
