use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::fields::{non_empty_string, strict_bool, string_or_empty};

/// Role written to new profiles when the caller doesn't pick one.
pub const DEFAULT_ROLE: &str = "user";

/// Write-only credential secret. Never printed, never read back.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub email: String,
    #[serde(default)]
    pub password: Password,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub display_name: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "strict_bool")]
    pub suspended: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub uid: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<Password>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "strict_bool")]
    pub suspended: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub uid: String,
}

/// Summary returned by every successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResult {
    pub message: String,
    pub uid: String,
}

impl UserResult {
    pub fn new(message: &str, uid: impl Into<String>) -> Self {
        Self {
            message: message.to_string(),
            uid: uid.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub email: String,
    pub password: Password,
    pub display_name: String,
}

/// Identity-side fields to change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPatch {
    pub email: Option<String>,
    pub password: Option<Password>,
    pub display_name: Option<String>,
}

impl CredentialPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.display_name.is_none()
    }
}

/// Application document created alongside a new credential.
///
/// `createdAt` is not part of the value: stores stamp it with their own clock
/// when the document is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDocument {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub suspended: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub suspended: Option<bool>,
}

impl ProfilePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Stored field names touched by this patch.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.display_name.is_some() {
            names.push("displayName");
        }
        if self.email.is_some() {
            names.push("email");
        }
        if self.role.is_some() {
            names.push("role");
        }
        if self.suspended.is_some() {
            names.push("suspended");
        }
        names
    }
}
