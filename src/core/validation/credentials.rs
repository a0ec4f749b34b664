//! Sign-in form schema

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::FieldErrors;

/// Submitted sign-in credentials
///
/// `Debug` never prints the password.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
pub struct CredentialsForm {
    #[serde(default)]
    #[validate(email(message = "invalid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

impl CredentialsForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the shape of the credentials before any lookup
    pub fn safe_parse(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

impl fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
