//! Endpoints of the signup API.

use std::fmt;

/// A signup API endpoint. All of them take a JSON body via `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Create an account
    Signup,
    /// Confirm an account with the emailed code
    ConfirmSignup,
    /// Send the confirmation code again
    ResendCode,
}

impl Endpoint {
    /// Path relative to the API origin.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Signup => "/api/authentication/signup/",
            Self::ConfirmSignup => "/api/authentication/signup/confirm/",
            Self::ResendCode => "/api/authentication/signup/resend-code/",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POST {}", self.path())
    }
}
