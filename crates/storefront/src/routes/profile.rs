//! Profile editor handlers.
//!
//! An editor that is mid-edit is parked in the session between posts; once
//! back in viewing mode it is dropped and the next request reloads from
//! local storage.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;
use threadline_core::{ProfileField, ProfileImage, ProfileImageError};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireShopper, set_flash};
use crate::models::{CurrentShopper, Flash, session_keys};
use crate::routes::page::PageContext;
use crate::services::{ProfileEditor, ProfileEditorError};
use crate::state::AppState;
use crate::storage::LocalStorage;

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

/// A `<select>` option.
#[derive(Clone, Debug)]
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

/// One profile field as shown in the form or the read-only view.
#[derive(Clone, Debug)]
pub struct FieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub input_type: &'static str,
    /// Non-empty for fields rendered as a `<select>`.
    pub options: Vec<SelectOption>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub editing: bool,
    pub email: String,
    pub image: Option<String>,
    pub fields: Vec<FieldView>,
}

/// Single field update form data.
#[derive(Debug, Deserialize)]
pub struct FieldForm {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

const fn input_type(field: ProfileField) -> &'static str {
    match field {
        ProfileField::Email => "email",
        ProfileField::MobileNumber | ProfileField::AlternateMobile => "tel",
        ProfileField::DateOfBirth => "date",
        _ => "text",
    }
}

fn field_views(editor: &ProfileEditor) -> Vec<FieldView> {
    let record = editor.draft();
    ProfileField::ALL
        .into_iter()
        .map(|field| {
            let value = record.get(field).to_string();
            let options = if field == ProfileField::Gender {
                GENDERS
                    .into_iter()
                    .map(|g| SelectOption {
                        value: g,
                        selected: value == g,
                    })
                    .collect()
            } else {
                Vec::new()
            };
            FieldView {
                key: field.key(),
                label: field.label(),
                value,
                required: field.is_required(),
                input_type: input_type(field),
                options,
            }
        })
        .collect()
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The browser's storage plus the editor: parked in the session, or freshly loaded.
async fn current_editor(
    state: &AppState,
    session: &Session,
    shopper: &CurrentShopper,
) -> Result<(LocalStorage, ProfileEditor)> {
    let storage = state.local_storage(session).await?;
    let editor = match session
        .get::<ProfileEditor>(session_keys::PROFILE_EDITOR)
        .await?
    {
        Some(editor) => editor,
        None => ProfileEditor::load(&storage, shopper.token.expose()).await?,
    };
    Ok((storage, editor))
}

/// Park an editing editor in the session, or drop a viewing one.
async fn store_editor(session: &Session, editor: &ProfileEditor) -> Result<()> {
    if editor.is_editing() {
        session.insert(session_keys::PROFILE_EDITOR, editor).await?;
    } else {
        session
            .remove::<ProfileEditor>(session_keys::PROFILE_EDITOR)
            .await?;
    }
    Ok(())
}

/// Turn user-fixable editor errors into a flash; propagate the rest.
async fn flash_or_fail(session: &Session, err: ProfileEditorError) -> Result<()> {
    if err.is_user_facing() {
        tracing::debug!(error = %err, "Profile change rejected");
        set_flash(session, Flash::error(err.to_string())).await;
        Ok(())
    } else {
        Err(err.into())
    }
}

/// Read the `image` field of an avatar upload.
///
/// `Ok(None)` means the form had no such field.
async fn read_image_field(
    multipart: &mut Multipart,
) -> std::result::Result<Option<(Bytes, String)>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            return image_bytes(field).await.map(Some);
        }
    }
    Ok(None)
}

async fn image_bytes(field: Field<'_>) -> std::result::Result<(Bytes, String), MultipartError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    Ok((field.bytes().await?, content_type))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the profile, read-only or as a form.
#[instrument(skip(state, session, shopper))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
) -> Result<ProfileTemplate> {
    let (_, editor) = current_editor(&state, &session, &shopper).await?;

    Ok(ProfileTemplate {
        page: PageContext::load(&session).await,
        editing: editor.is_editing(),
        email: shopper.email,
        image: editor.image().map(|image| image.as_data_url().to_string()),
        fields: field_views(&editor),
    })
}

/// Switch to edit mode.
#[instrument(skip(state, session, shopper))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
) -> Result<Redirect> {
    let (_, mut editor) = current_editor(&state, &session, &shopper).await?;
    editor.begin_edit();
    store_editor(&session, &editor).await?;
    Ok(Redirect::to("/profile"))
}

/// Flip between viewing and editing; leaving edit mode discards the draft.
#[instrument(skip(state, session, shopper))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
) -> Result<Redirect> {
    let (_, mut editor) = current_editor(&state, &session, &shopper).await?;
    editor.cancel_or_toggle();
    store_editor(&session, &editor).await?;
    Ok(Redirect::to("/profile"))
}

/// Update one draft field.
#[instrument(skip(state, session, shopper, form), fields(field = %form.field))]
pub async fn set_field(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
    Form(form): Form<FieldForm>,
) -> Result<Redirect> {
    let field: ProfileField = form.field.parse().map_err(AppError::BadRequest)?;
    let (_, mut editor) = current_editor(&state, &session, &shopper).await?;

    if !editor.set_field(field, form.value) {
        tracing::debug!("Field update ignored outside edit mode");
    }
    store_editor(&session, &editor).await?;
    Ok(Redirect::to("/profile"))
}

/// Apply every submitted field to the draft, then validate and persist.
///
/// Validation failures are flashed and the form stays open with the
/// shopper's input.
#[instrument(skip(state, session, shopper, form))]
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect> {
    let (storage, mut editor) = current_editor(&state, &session, &shopper).await?;

    for field in ProfileField::ALL {
        if let Some(value) = form.get(field.key()) {
            editor.set_field(field, value.clone());
        }
    }

    match editor.save(&storage).await {
        Ok(()) => {
            add_breadcrumb("profile", "Profile saved", None);
            set_flash(&session, Flash::success("Profile updated successfully")).await;
        }
        Err(err) => flash_or_fail(&session, err).await?,
    }

    store_editor(&session, &editor).await?;
    Ok(Redirect::to("/profile"))
}

/// Replace the avatar from a multipart upload (field `image`).
#[instrument(skip(state, session, shopper, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    session: Session,
    RequireShopper(shopper): RequireShopper,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let (bytes, content_type) = match read_image_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return Err(AppError::BadRequest("missing image field".to_string())),
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let err = ProfileImageError::TooLarge {
                max: ProfileImage::MAX_BYTES,
            };
            tracing::debug!(error = %err, "Oversized avatar upload");
            set_flash(&session, Flash::error(err.to_string())).await;
            return Ok(Redirect::to("/profile"));
        }
        Err(err) => return Err(AppError::BadRequest(err.body_text())),
    };

    let (storage, mut editor) = current_editor(&state, &session, &shopper).await?;
    match editor
        .set_image(&storage, shopper.token.expose(), &bytes, &content_type)
        .await
    {
        Ok(()) => set_flash(&session, Flash::success("Profile image updated")).await,
        Err(err) => flash_or_fail(&session, err).await?,
    }

    store_editor(&session, &editor).await?;
    Ok(Redirect::to("/profile"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_views_follow_form_order() {
        let views = field_views(&ProfileEditor::default());
        let keys: Vec<&str> = views.iter().map(|v| v.key).collect();
        assert_eq!(keys.first(), Some(&"name"));
        assert_eq!(keys.len(), ProfileField::ALL.len());

        let gender = views.iter().find(|v| v.key == "gender");
        assert!(gender.is_some_and(|v| v.options.len() == GENDERS.len()));
        let email = views.iter().find(|v| v.key == "email");
        assert!(email.is_some_and(|v| v.required && v.input_type == "email"));
    }
}
