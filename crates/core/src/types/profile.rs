//! User profile record and avatar image.
//!
//! The profile is a flat record of string fields edited field-by-field in a
//! form. Nothing is validated while editing; [`UserProfile::validate`] is run
//! once when the shopper saves.

use core::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};
use super::phone::{MobileNumber, MobileNumberError};

/// Why a profile could not be saved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(ProfileField),
    /// The email field does not look like an address.
    #[error("please enter a valid email address: {0}")]
    InvalidEmail(EmailError),
    /// The mobile number is not ten digits.
    #[error("please enter a valid 10-digit mobile number: {0}")]
    InvalidMobileNumber(MobileNumberError),
    /// Save was requested while the editor was not in edit mode.
    #[error("profile is not being edited")]
    NotEditing,
}

/// A named field of [`UserProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    Name,
    MobileNumber,
    Email,
    Gender,
    DateOfBirth,
    PostalCode,
    City,
    State,
    AlternateMobile,
}

impl ProfileField {
    /// Every field, in form order.
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::MobileNumber,
        Self::Email,
        Self::Gender,
        Self::DateOfBirth,
        Self::PostalCode,
        Self::City,
        Self::State,
        Self::AlternateMobile,
    ];

    /// Fields that must be non-blank to save.
    pub const REQUIRED: [Self; 6] = [
        Self::Name,
        Self::MobileNumber,
        Self::Email,
        Self::PostalCode,
        Self::City,
        Self::State,
    ];

    /// The form/JSON key for this field.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::MobileNumber => "mobileNumber",
            Self::Email => "email",
            Self::Gender => "gender",
            Self::DateOfBirth => "dateOfBirth",
            Self::PostalCode => "postalCode",
            Self::City => "city",
            Self::State => "state",
            Self::AlternateMobile => "alternateMobile",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Name => "Full name",
            Self::MobileNumber => "Mobile number",
            Self::Email => "Email",
            Self::Gender => "Gender",
            Self::DateOfBirth => "Date of birth",
            Self::PostalCode => "Pincode",
            Self::City => "City",
            Self::State => "State",
            Self::AlternateMobile => "Alternate mobile",
        }
    }

    /// Whether the field must be filled in before saving.
    #[must_use]
    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("unknown profile field: {s}"))
    }
}

/// The shopper's editable account details.
///
/// Serialised with camelCase keys (`mobileNumber`, `postalCode`, ...).
/// `Default` is the built-in record shown when nothing has been saved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub mobile_number: String,
    pub email: String,
    pub gender: String,
    pub date_of_birth: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    pub alternate_mobile: String,
}

impl UserProfile {
    /// Read one field.
    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::MobileNumber => &self.mobile_number,
            ProfileField::Email => &self.email,
            ProfileField::Gender => &self.gender,
            ProfileField::DateOfBirth => &self.date_of_birth,
            ProfileField::PostalCode => &self.postal_code,
            ProfileField::City => &self.city,
            ProfileField::State => &self.state,
            ProfileField::AlternateMobile => &self.alternate_mobile,
        }
    }

    /// Overwrite one field. No validation happens here.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::Name => &mut self.name,
            ProfileField::MobileNumber => &mut self.mobile_number,
            ProfileField::Email => &mut self.email,
            ProfileField::Gender => &mut self.gender,
            ProfileField::DateOfBirth => &mut self.date_of_birth,
            ProfileField::PostalCode => &mut self.postal_code,
            ProfileField::City => &mut self.city,
            ProfileField::State => &mut self.state,
            ProfileField::AlternateMobile => &mut self.alternate_mobile,
        };
        *slot = value.into();
    }

    /// Check the record can be persisted.
    ///
    /// Checks run in order: required fields, then email, then mobile number.
    /// Only the first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MissingField`] for the first blank required
    /// field, [`ProfileError::InvalidEmail`] or
    /// [`ProfileError::InvalidMobileNumber`] for malformed values.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if let Some(field) = ProfileField::REQUIRED
            .into_iter()
            .find(|f| self.get(*f).trim().is_empty())
        {
            return Err(ProfileError::MissingField(field));
        }

        Email::parse(&self.email).map_err(ProfileError::InvalidEmail)?;
        MobileNumber::parse(&self.mobile_number).map_err(ProfileError::InvalidMobileNumber)?;

        Ok(())
    }
}

/// Errors building a [`ProfileImage`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileImageError {
    /// The upload was empty.
    #[error("image file is empty")]
    Empty,
    /// The upload is not an image.
    #[error("unsupported file type: {0}")]
    NotAnImage(String),
    /// The upload exceeds the size limit.
    #[error("image must be at most {max} bytes")]
    TooLarge {
        /// Maximum accepted raw size.
        max: usize,
    },
    /// A stored value is not a base64 data URL.
    #[error("malformed image data URL")]
    MalformedDataUrl,
}

/// An avatar encoded as a `data:` URL for inline display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileImage(String);

impl ProfileImage {
    /// Largest accepted raw image, in bytes.
    pub const MAX_BYTES: usize = 2 * 1024 * 1024;

    /// Encode raw image bytes as a data URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are empty, larger than
    /// [`Self::MAX_BYTES`], or the content type is not `image/*`.
    pub fn encode(bytes: &[u8], content_type: &str) -> Result<Self, ProfileImageError> {
        if bytes.is_empty() {
            return Err(ProfileImageError::Empty);
        }
        let mime = content_type.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") || mime.len() == "image/".len() {
            return Err(ProfileImageError::NotAnImage(content_type.to_owned()));
        }
        if bytes.len() > Self::MAX_BYTES {
            return Err(ProfileImageError::TooLarge {
                max: Self::MAX_BYTES,
            });
        }
        Ok(Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes))))
    }

    /// Wrap a previously stored data URL.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileImageError::MalformedDataUrl`] unless the value has
    /// the shape `data:image/<type>;base64,<payload>`.
    pub fn from_data_url(value: impl Into<String>) -> Result<Self, ProfileImageError> {
        let value = value.into();
        let well_formed = value
            .strip_prefix("data:image/")
            .and_then(|rest| rest.split_once(";base64,"))
            .is_some_and(|(subtype, payload)| {
                !subtype.is_empty() && STANDARD.decode(payload).is_ok()
            });
        if well_formed {
            Ok(Self(value))
        } else {
            Err(ProfileImageError::MalformedDataUrl)
        }
    }

    /// The data URL, ready for an `<img src>`.
    #[must_use]
    pub fn as_data_url(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_profile() -> UserProfile {
        UserProfile {
            name: "Asha Rao".to_string(),
            mobile_number: "1234567890".to_string(),
            email: "a@b.com".to_string(),
            gender: "Female".to_string(),
            date_of_birth: "1990-04-01".to_string(),
            postal_code: "560001".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            alternate_mobile: String::new(),
        }
    }

    #[test]
    fn test_valid_profile_passes() {
        assert_eq!(valid_profile().validate(), Ok(()));
    }

    #[test]
    fn test_missing_required_field_reported_first() {
        let mut profile = valid_profile();
        profile.city = "   ".to_string();
        profile.email = "broken".to_string();
        assert_eq!(
            profile.validate(),
            Err(ProfileError::MissingField(ProfileField::City))
        );
    }

    #[test]
    fn test_optional_fields_may_be_blank() {
        let mut profile = valid_profile();
        profile.gender.clear();
        profile.date_of_birth.clear();
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_email_checked_before_mobile() {
        let mut profile = valid_profile();
        profile.email = "a@b".to_string();
        profile.mobile_number = "12345".to_string();
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_short_mobile_rejected() {
        let mut profile = valid_profile();
        profile.mobile_number = "12345".to_string();
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidMobileNumber(_))
        ));
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let json = serde_json::to_value(valid_profile()).unwrap();
        assert_eq!(json["mobileNumber"], "1234567890");
        assert_eq!(json["postalCode"], "560001");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{"name":"Asha"}"#).unwrap();
        assert_eq!(profile.name, "Asha");
        assert!(profile.email.is_empty());
    }

    #[test]
    fn test_field_keys_round_trip_through_from_str() {
        for field in ProfileField::ALL {
            assert_eq!(field.key().parse::<ProfileField>(), Ok(field));
        }
        assert!("password".parse::<ProfileField>().is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut profile = UserProfile::default();
        profile.set(ProfileField::State, "Goa");
        assert_eq!(profile.get(ProfileField::State), "Goa");
    }

    #[test]
    fn test_image_encode() {
        let image = ProfileImage::encode(b"\x89PNG", "image/png").unwrap();
        assert_eq!(image.as_data_url(), "data:image/png;base64,iVBORw==");
        assert_eq!(
            ProfileImage::from_data_url(image.as_data_url()).unwrap(),
            image
        );
    }

    #[test]
    fn test_image_rejects_non_images() {
        assert_eq!(
            ProfileImage::encode(b"hello", "text/plain"),
            Err(ProfileImageError::NotAnImage("text/plain".to_string()))
        );
        assert_eq!(
            ProfileImage::encode(b"", "image/png"),
            Err(ProfileImageError::Empty)
        );
        let big = vec![0_u8; ProfileImage::MAX_BYTES + 1];
        assert!(matches!(
            ProfileImage::encode(&big, "image/jpeg"),
            Err(ProfileImageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_malformed_data_url() {
        assert_eq!(
            ProfileImage::from_data_url("https://example.com/a.png"),
            Err(ProfileImageError::MalformedDataUrl)
        );
    }
}
