//! Profile editor: a two-state form over the shopper's stored profile.
//!
//! ```text
//!            begin_edit / cancel_or_toggle
//!   Viewing ------------------------------> Editing
//!      ^                                      |
//!      |   save (valid)  / cancel_or_toggle   |
//!      +--------------------------------------+
//! ```
//!
//! `set_field` only touches the draft. `save` validates the draft and writes
//! the whole record to `userData`; on failure the editor stays in `Editing`
//! with the draft untouched. The avatar is stored separately under
//! `profileImage-<token>` and can be changed in either state.
//!
//! The editor is serialisable so route handlers can keep it in the session
//! between form posts.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use threadline_core::{ProfileError, ProfileField, ProfileImage, ProfileImageError, UserProfile};
use tracing::{debug, instrument, warn};

use crate::storage::{LocalStorage, StorageError, USER_DATA_KEY, profile_image_key};

/// Errors from editor operations that touch storage.
#[derive(Debug, Error)]
pub enum ProfileEditorError {
    /// The draft failed validation or the editor was not editing.
    #[error(transparent)]
    Invalid(#[from] ProfileError),

    /// The uploaded avatar was rejected.
    #[error(transparent)]
    Image(#[from] ProfileImageError),

    /// The record could not be encoded.
    #[error("could not encode profile: {0}")]
    Encode(#[from] serde_json::Error),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProfileEditorError {
    /// Whether the shopper can fix this by changing their input.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::Image(_))
    }
}

/// Which face of the editor is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Viewing,
    Editing,
}

/// Editor state for one browser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileEditor {
    mode: EditorMode,
    saved: UserProfile,
    draft: UserProfile,
    image: Option<ProfileImage>,
}

impl ProfileEditor {
    /// Read the stored profile and avatar, falling back to defaults.
    ///
    /// A stored record that no longer decodes is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileEditorError::Storage`] if the store cannot be read.
    #[instrument(skip(storage, token), fields(namespace = storage.namespace()))]
    pub async fn load(storage: &LocalStorage, token: &str) -> Result<Self, ProfileEditorError> {
        let saved = match storage.get_item(USER_DATA_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored profile is unreadable, using defaults");
                UserProfile::default()
            }),
            None => {
                debug!("No stored profile, using defaults");
                UserProfile::default()
            }
        };

        let image = match storage.get_item(&profile_image_key(token)).await? {
            Some(raw) => ProfileImage::from_data_url(raw)
                .map_err(|e| warn!(error = %e, "Stored profile image is unreadable"))
                .ok(),
            None => None,
        };

        Ok(Self {
            mode: EditorMode::Viewing,
            draft: saved.clone(),
            saved,
            image,
        })
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Whether the form is editable.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.mode == EditorMode::Editing
    }

    /// The last persisted record.
    #[must_use]
    pub const fn saved(&self) -> &UserProfile {
        &self.saved
    }

    /// The record being edited (equal to `saved` while viewing).
    #[must_use]
    pub const fn draft(&self) -> &UserProfile {
        &self.draft
    }

    /// The displayed avatar, if any.
    #[must_use]
    pub const fn image(&self) -> Option<&ProfileImage> {
        self.image.as_ref()
    }

    /// Enter edit mode. Does nothing if already editing.
    pub fn begin_edit(&mut self) {
        if self.mode == EditorMode::Viewing {
            self.draft = self.saved.clone();
            self.mode = EditorMode::Editing;
        }
    }

    /// Flip between viewing and editing. Leaving edit mode discards the draft.
    pub fn cancel_or_toggle(&mut self) {
        match self.mode {
            EditorMode::Viewing => self.begin_edit(),
            EditorMode::Editing => {
                self.draft = self.saved.clone();
                self.mode = EditorMode::Viewing;
            }
        }
    }

    /// Update one draft field without validating it.
    ///
    /// Returns `false` (and changes nothing) when not editing.
    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) -> bool {
        if self.mode != EditorMode::Editing {
            return false;
        }
        self.draft.set(field, value);
        true
    }

    /// Validate and persist the draft, then return to viewing.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NotEditing`] when called while viewing
    /// - the first validation failure; the editor stays in edit mode with the
    ///   draft unchanged
    /// - storage or encoding failures; the editor stays in edit mode
    #[instrument(skip(self, storage), fields(namespace = storage.namespace()))]
    pub async fn save(&mut self, storage: &LocalStorage) -> Result<(), ProfileEditorError> {
        if self.mode != EditorMode::Editing {
            return Err(ProfileError::NotEditing.into());
        }

        self.draft.validate()?;

        let encoded = serde_json::to_string(&self.draft)?;
        storage.set_item(USER_DATA_KEY, &encoded).await?;

        self.saved = self.draft.clone();
        self.mode = EditorMode::Viewing;
        debug!("Profile saved");
        Ok(())
    }

    /// Encode and store a new avatar for `token`, then display it.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileEditorError::Image`] for rejected uploads, or a
    /// storage error; the displayed avatar is unchanged on error.
    #[instrument(skip(self, storage, token, bytes), fields(size = bytes.len()))]
    pub async fn set_image(
        &mut self,
        storage: &LocalStorage,
        token: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), ProfileEditorError> {
        let image = ProfileImage::encode(bytes, content_type)?;
        storage
            .set_item(&profile_image_key(token), image.as_data_url())
            .await?;
        self.image = Some(image);
        Ok(())
    }
}
