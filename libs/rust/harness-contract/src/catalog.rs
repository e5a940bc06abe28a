//! Named contracts of the signup API.

use crate::contract::{Contract, FieldKind};

/// Contracts the signup and OTP endpoints are expected to honor, plus the
/// signup request body they advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedContract {
    /// Signup request body
    SignupRequest,
    /// Successful signup
    SignupSuccess,
    /// Successful OTP verification
    VerifySuccess,
    /// Successful OTP resend
    ResendSuccess,
    /// Any error response
    Error,
    /// One entry of an error's `errors` list
    ErrorDetail,
}

impl NamedContract {
    /// Every named contract.
    pub const ALL: [Self; 6] = [
        Self::SignupRequest,
        Self::SignupSuccess,
        Self::VerifySuccess,
        Self::ResendSuccess,
        Self::Error,
        Self::ErrorDetail,
    ];

    /// Stable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SignupRequest => "signup_request",
            Self::SignupSuccess => "signup_success",
            Self::VerifySuccess => "verify_success",
            Self::ResendSuccess => "resend_success",
            Self::Error => "error",
            Self::ErrorDetail => "error_detail",
        }
    }

    /// Look a contract up by its stable name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Build the descriptor.
    #[must_use]
    pub fn contract(self) -> Contract {
        match self {
            // confirm_password may be omitted; when sent it must match
            Self::SignupRequest => Contract::new(self.name())
                .required("name", FieldKind::bounded_string(3, Some(80)).without_digits())
                .required("email", FieldKind::Email)
                .required("password", FieldKind::bounded_string(8, None))
                .field("confirm_password", FieldKind::bounded_string(8, None), false, false)
                .equal("confirm_password", "password"),
            Self::SignupSuccess => Contract::new(self.name())
                .required("error", FieldKind::constant(false))
                .required("code", FieldKind::one_of(["UserCreated"]))
                .required("message", FieldKind::String)
                .optional(
                    "data",
                    FieldKind::object(
                        Contract::new("signup_data").required("user_confirmed", FieldKind::Boolean),
                    ),
                ),
            Self::VerifySuccess => Contract::new(self.name())
                .required("error", FieldKind::constant(false))
                .required("code", FieldKind::String)
                .optional("message", FieldKind::String),
            Self::ResendSuccess => Contract::new(self.name())
                .required("error", FieldKind::constant(false))
                .required("code", FieldKind::one_of(["ConfirmationCodeResent"]))
                .required("message", FieldKind::String),
            Self::Error => Contract::new(self.name())
                .required("error", FieldKind::constant(true))
                .required("code", FieldKind::String)
                .optional("message", FieldKind::String)
                .optional(
                    "errors",
                    FieldKind::array_of(FieldKind::object(Self::ErrorDetail.contract())),
                )
                .optional("data", FieldKind::Any)
                .optional("detail", FieldKind::String)
                .optional("status_code", FieldKind::Integer),
            Self::ErrorDetail => Contract::new(self.name())
                .optional("field", FieldKind::String)
                .required("message", FieldKind::String)
                .optional("code", FieldKind::String),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;
    use serde_json::json;

    #[test]
    fn test_names_round_trip() {
        for contract in NamedContract::ALL {
            assert_eq!(NamedContract::from_name(contract.name()), Some(contract));
        }
        assert_eq!(NamedContract::from_name("unknown"), None);
    }

    #[test]
    fn test_signup_success_body() {
        let body = json!({
            "error": false,
            "code": "UserCreated",
            "message": "User created successfully. Please confirm your email.",
            "data": {"user_confirmed": false}
        });
        assert!(validate(&body, &NamedContract::SignupSuccess.contract()).is_empty());
    }

    #[test]
    fn test_signup_success_requires_message() {
        let body = json!({"error": false, "code": "UserCreated"});
        let violations = validate(&body, &NamedContract::SignupSuccess.contract());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field_path, "message");
        assert_eq!(violations[0].actual, "missing");
    }

    #[test]
    fn test_signup_request_body() {
        let contract = NamedContract::SignupRequest.contract();
        let body = json!({
            "name": "Jane Doe",
            "email": "user_1_abc@example.com",
            "password": "Secret123!",
            "confirm_password": "Secret123!"
        });
        assert!(validate(&body, &contract).is_empty());

        let body = json!({
            "name": "J4",
            "email": "user_1_abc@example.com",
            "password": "Short1!",
            "confirm_password": "Different1!"
        });
        let paths: Vec<_> = validate(&body, &contract)
            .into_iter()
            .map(|v| v.field_path)
            .collect();
        assert_eq!(paths, ["name", "password", "confirm_password"]);
    }

    #[test]
    fn test_error_body_with_details() {
        let body = json!({
            "error": true,
            "code": "VALIDATION_ERROR",
            "errors": [{"field": "email", "message": "Enter a valid email address."}],
            "data": {"confirmation_code": ["This field is required."]}
        });
        assert!(validate(&body, &NamedContract::Error.contract()).is_empty());
    }

    #[test]
    fn test_error_detail_violation_path() {
        let body = json!({"error": true, "code": "VALIDATION_ERROR", "errors": [{"field": 3}]});
        let violations = validate(&body, &NamedContract::Error.contract());
        let paths: Vec<_> = violations.iter().map(|v| v.field_path.as_str()).collect();
        assert_eq!(paths, ["errors[0].field", "errors[0].message"]);
    }

    #[test]
    fn test_success_contract_rejects_error_flag() {
        let body = json!({"error": true, "code": "CodeMismatch"});
        let violations = validate(&body, &NamedContract::SignupSuccess.contract());
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].expected, "false");
    }
}
