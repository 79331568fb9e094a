//! One-shot notifications carried in the session across a redirect.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a notification for the next rendered page.
///
/// A failure to write is logged and otherwise ignored; losing a notice
/// should not fail the action that produced it.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, &flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return the pending notification, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_taken_once() {
        let session = Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None);
        set_flash(&session, Flash::error("Select product size")).await;

        let flash = take_flash(&session).await;
        assert_eq!(flash, Some(Flash::error("Select product size")));
        assert_eq!(take_flash(&session).await, None);
    }
}
