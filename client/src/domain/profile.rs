//! Profile document model.
//!
//! Profiles live in the backend document store under `users/<uid>`. The
//! store pushes full-document snapshots, so decoding always starts from the
//! complete field mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::{DisplayName, UserId};

/// Field key holding the display name.
pub const NAME_FIELD: &str = "name";
/// Field key holding the contact email.
pub const EMAIL_FIELD: &str = "email";
/// Field key holding the profile picture download URL.
pub const PICTURE_FIELD: &str = "profilePicUrl";

/// Errors raised while decoding a profile document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileDecodeError {
    /// The field mapping did not match the document shape.
    #[error("profile document is malformed: {message}")]
    Malformed {
        /// Decoder message.
        message: String,
    },
}

/// User display record associated 1:1 with an identity.
///
/// ## Invariants
/// - `user_id` matches the document key; it is not stored as a field.
/// - A missing `profilePicUrl` and an explicit `null` are equivalent; an
///   unparsable stored URL is dropped rather than failing the decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    user_id: UserId,
    name: Option<String>,
    email: Option<String>,
    picture_url: Option<Url>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    profile_pic_url: Option<String>,
}

impl Profile {
    /// Build the profile written at registration time.
    pub fn new(user_id: UserId, name: &DisplayName, email: impl Into<String>) -> Self {
        Self {
            user_id,
            name: Some(name.as_ref().to_owned()),
            email: Some(email.into()),
            picture_url: None,
        }
    }

    /// Attach a profile picture download URL.
    #[must_use]
    pub fn with_picture_url(mut self, url: Url) -> Self {
        self.picture_url = Some(url);
        self
    }

    /// Decode a full-document snapshot.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{Profile, UserId};
    /// use serde_json::json;
    ///
    /// let fields = json!({ "name": "Ada", "email": "ada@example.com", "profilePicUrl": null });
    /// let profile = Profile::from_fields(
    ///     UserId::new("u1").expect("id"),
    ///     fields.as_object().expect("object"),
    /// )
    /// .expect("valid document");
    /// assert_eq!(profile.name(), Some("Ada"));
    /// assert!(profile.picture_url().is_none());
    /// ```
    pub fn from_fields(
        user_id: UserId,
        fields: &Map<String, Value>,
    ) -> Result<Self, ProfileDecodeError> {
        let document: ProfileDocument = serde_json::from_value(Value::Object(fields.clone()))
            .map_err(|err| ProfileDecodeError::Malformed {
                message: err.to_string(),
            })?;
        let picture_url = document
            .profile_pic_url
            .and_then(|raw| parse_picture_url(&user_id, &raw));
        Ok(Self {
            user_id,
            name: document.name,
            email: document.email,
            picture_url,
        })
    }

    /// Encode the profile as the document field mapping.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(NAME_FIELD.to_owned(), optional_string(self.name.as_deref()));
        fields.insert(EMAIL_FIELD.to_owned(), optional_string(self.email.as_deref()));
        fields.insert(
            PICTURE_FIELD.to_owned(),
            optional_string(self.picture_url.as_ref().map(Url::as_str)),
        );
        fields
    }

    /// Identifier of the owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Display name, when set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Contact email, when set.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Profile picture download URL, when set.
    pub fn picture_url(&self) -> Option<&Url> {
        self.picture_url.as_ref()
    }
}

fn optional_string(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::String(text.to_owned()))
}

fn parse_picture_url(user_id: &UserId, raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(error) => {
            warn!(
                user_id = %user_id,
                value = raw,
                error = %error,
                "stored profile picture url unusable; dropping it"
            );
            None
        }
    }
}
