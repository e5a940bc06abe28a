//! Signup payload types.

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Request body for the signup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payload {
    /// Display name
    pub name: String,
    /// Email address, unique per run
    pub email: String,
    /// Password
    pub password: String,
    /// Password confirmation, omitted from the body when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}

/// Addressable payload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadField {
    /// `name`
    Name,
    /// `email`
    Email,
    /// `password`
    Password,
    /// `confirm_password`
    ConfirmPassword,
}

impl PayloadField {
    /// JSON key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm_password",
        }
    }
}

impl fmt::Display for PayloadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadField {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "password" => Ok(Self::Password),
            "confirm_password" => Ok(Self::ConfirmPassword),
            other => Err(GenerationError::UnknownField(other.to_string())),
        }
    }
}

impl Payload {
    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: PayloadField) -> Option<&str> {
        match field {
            PayloadField::Name => Some(&self.name),
            PayloadField::Email => Some(&self.email),
            PayloadField::Password => Some(&self.password),
            PayloadField::ConfirmPassword => self.confirm_password.as_deref(),
        }
    }

    /// Replace one field.
    pub fn set(&mut self, field: PayloadField, value: impl Into<String>) {
        let value = value.into();
        match field {
            PayloadField::Name => self.name = value,
            PayloadField::Email => self.email = value,
            PayloadField::Password => self.password = value,
            PayloadField::ConfirmPassword => self.confirm_password = Some(value),
        }
    }

    /// JSON body with the given fields left out, for missing-field cases.
    #[must_use]
    pub fn to_json_without(&self, omitted: &[PayloadField]) -> Value {
        let mut body = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Some(map) = body.as_object_mut() {
            for field in omitted {
                map.remove(field.as_str());
            }
        }
        body
    }
}

/// Explicit field values for [`crate::DataFactory::signup_payload`].
///
/// Fields left unset are generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadOverrides {
    /// Name override
    pub name: Option<String>,
    /// Email override
    pub email: Option<String>,
    /// Password override
    pub password: Option<String>,
    /// Confirmation override; implies the confirmation field is present
    pub confirm_password: Option<String>,
    /// Include `confirm_password`, mirroring the password unless overridden
    pub with_confirmation: bool,
}

impl PayloadOverrides {
    /// Override the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Override the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Override the confirmation.
    #[must_use]
    pub fn confirm_password(mut self, confirm: impl Into<String>) -> Self {
        self.confirm_password = Some(confirm.into());
        self
    }

    /// Include a confirmation matching the password.
    #[must_use]
    pub const fn with_confirmation(mut self) -> Self {
        self.with_confirmation = true;
        self
    }
}
