//! Test fixtures with sample inputs and response bodies.
//!
//! Negative-path inputs are the values the signup API is expected to reject.
//! Sample responses mirror what the API returns and are used to stub it.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Names that break the name rules: too short, leading symbol, trailing
/// symbol, surrounding whitespace, digits, too long.
pub fn invalid_names() -> Vec<String> {
    vec![
        "Ab".to_string(),
        "@User".to_string(),
        "User!".to_string(),
        " User".to_string(),
        "User ".to_string(),
        "User123".to_string(),
        "A".repeat(81),
    ]
}

/// Public mailbox providers the API refuses for signup.
pub const PUBLIC_DOMAINS: [&str; 4] = ["gmail.com", "yahoo.com", "hotmail.com", "outlook.com"];

/// Passwords each missing one complexity class: uppercase, lowercase,
/// digit, symbol.
pub const WEAK_PASSWORDS: [&str; 4] = ["password123!", "PASSWORD123!", "Password!", "Password123"];

/// Syntactically broken email.
pub const MALFORMED_EMAIL: &str = "invalid-email-format";

/// Code accepted by the stubbed OTP backend in non-production environments.
pub const VALID_OTP: &str = "123456";

/// Well-formed code that never matches.
pub const WRONG_OTP: &str = "000000";

/// Code for an account whose pending confirmation no longer exists.
pub const EXPIRED_OTP: &str = "999999";

/// Code shorter than the required six digits.
pub const INCOMPLETE_OTP: &str = "123";

/// Canned API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleResponse {
    /// HTTP status
    pub status: u16,
    /// JSON body
    pub body: Value,
}

impl SampleResponse {
    /// Account created, not yet confirmed.
    #[must_use]
    pub fn user_created() -> Self {
        Self {
            status: 201,
            body: json!({
                "error": false,
                "code": "UserCreated",
                "message": "User created successfully. Please confirm your email.",
                "data": {"user_confirmed": false}
            }),
        }
    }

    /// Email already registered.
    #[must_use]
    pub fn user_exists() -> Self {
        Self {
            status: 409,
            body: json!({
                "error": true,
                "code": "USERNAME_EXISTS",
                "message": "User already exists"
            }),
        }
    }

    /// Field-level validation failure.
    #[must_use]
    pub fn validation_error(field: &str, message: &str) -> Self {
        Self {
            status: 400,
            body: json!({
                "error": true,
                "code": "VALIDATION_ERROR",
                "message": "Invalid input.",
                "errors": [{"field": field, "message": message}],
                "data": {field: [message]}
            }),
        }
    }

    /// Code confirmed.
    #[must_use]
    pub fn confirmed() -> Self {
        Self {
            status: 200,
            body: json!({
                "error": false,
                "code": "UserConfirmed",
                "message": "User confirmed successfully."
            }),
        }
    }

    /// Code does not match the pending confirmation.
    #[must_use]
    pub fn code_mismatch() -> Self {
        Self {
            status: 400,
            body: json!({
                "error": true,
                "code": "CodeMismatch",
                "message": "Invalid verification code provided, please try again."
            }),
        }
    }

    /// No pending confirmation for the account.
    #[must_use]
    pub fn user_not_found() -> Self {
        Self {
            status: 404,
            body: json!({
                "error": true,
                "code": "UserNotFound",
                "message": "User does not exist."
            }),
        }
    }

    /// Confirmation code resent.
    #[must_use]
    pub fn code_resent() -> Self {
        Self {
            status: 200,
            body: json!({
                "error": false,
                "code": "ConfirmationCodeResent",
                "message": "Confirmation code resent successfully."
            }),
        }
    }

    /// Resend attempts exceeded.
    #[must_use]
    pub fn rate_limited() -> Self {
        Self {
            status: 429,
            body: json!({
                "error": true,
                "code": "LimitExceeded",
                "message": "Attempt limit exceeded, please try after some time."
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_names_cover_length_bounds() {
        let names = invalid_names();
        assert_eq!(names.len(), 7);
        assert!(names.iter().any(|n| n.len() < 3));
        assert!(names.iter().any(|n| n.len() > 80));
    }

    #[test]
    fn test_weak_passwords_each_miss_a_class() {
        let checks: [fn(char) -> bool; 4] = [
            |c| c.is_ascii_uppercase(),
            |c| c.is_ascii_lowercase(),
            |c| c.is_ascii_digit(),
            |c| !c.is_ascii_alphanumeric(),
        ];
        for (password, check) in WEAK_PASSWORDS.iter().zip(checks) {
            assert!(!password.chars().any(check), "{password}");
        }
    }

    #[test]
    fn test_error_samples_carry_error_flag() {
        for sample in [
            SampleResponse::user_exists(),
            SampleResponse::validation_error("email", "Enter a valid email address."),
            SampleResponse::code_mismatch(),
            SampleResponse::user_not_found(),
            SampleResponse::rate_limited(),
        ] {
            assert!(sample.status >= 400);
            assert_eq!(sample.body["error"], true);
        }
    }

    #[test]
    fn test_validation_error_names_the_field() {
        let sample = SampleResponse::validation_error("confirmation_code", "This field is required.");
        assert!(sample.body["data"].get("confirmation_code").is_some());
        assert_eq!(sample.body["errors"][0]["field"], "confirmation_code");
    }
}
