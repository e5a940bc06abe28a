//! Assertions used by test bodies.

use crate::error::TestFailure;
use harness_client::ApiResponse;
use harness_contract::{NamedContract, assert_contract};
use harness_data::Payload;
use std::time::Duration;

/// Fail unless the status is one of `expected`.
///
/// # Errors
///
/// Returns [`TestFailure::UnexpectedStatus`] otherwise.
pub fn expect_status(
    response: &ApiResponse,
    expected: &[u16],
    context: &str,
) -> Result<(), TestFailure> {
    if expected.contains(&response.status) {
        Ok(())
    } else {
        Err(TestFailure::unexpected_status(context, expected, response))
    }
}

/// Fail unless the body satisfies a named contract.
///
/// # Errors
///
/// Returns [`TestFailure::Contract`] listing every violation.
pub fn expect_contract(
    response: &ApiResponse,
    contract: NamedContract,
    context: &str,
) -> Result<(), TestFailure> {
    assert_contract(&response.body, &contract.contract(), Some(context))?;
    Ok(())
}

/// Fail unless a generated payload satisfies the signup request contract.
///
/// # Errors
///
/// Returns [`TestFailure::Contract`] listing every violation.
pub fn expect_valid_request(payload: &Payload) -> Result<(), TestFailure> {
    let body = serde_json::to_value(payload).map_err(|e| TestFailure::assertion(e.to_string()))?;
    assert_contract(
        &body,
        &NamedContract::SignupRequest.contract(),
        Some("signup request"),
    )?;
    Ok(())
}

/// Fail unless the body's `error` flag equals `expected`.
///
/// # Errors
///
/// Returns [`TestFailure::Assertion`] otherwise.
pub fn expect_error_flag(response: &ApiResponse, expected: bool) -> Result<(), TestFailure> {
    let actual = response.error_flag();
    ensure(
        actual == expected,
        format!("expected error flag {expected}, got {actual}"),
    )
}

/// Fail unless the body's `code` equals `expected`.
///
/// # Errors
///
/// Returns [`TestFailure::Assertion`] otherwise.
pub fn expect_code(response: &ApiResponse, expected: &str) -> Result<(), TestFailure> {
    ensure(
        response.code() == Some(expected),
        format!("expected code {expected}, got {:?}", response.code()),
    )
}

/// Fail unless the response arrived within `budget`.
///
/// # Errors
///
/// Returns [`TestFailure::Assertion`] otherwise.
pub fn expect_response_time(
    response: &ApiResponse,
    budget: Duration,
    endpoint: &str,
) -> Result<(), TestFailure> {
    ensure(
        response.elapsed <= budget,
        format!(
            "{endpoint} took {}ms, budget {}ms",
            response.elapsed.as_millis(),
            budget.as_millis()
        ),
    )
}

/// Fail with `message` unless `condition` holds.
///
/// # Errors
///
/// Returns [`TestFailure::Assertion`] when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), TestFailure> {
    if condition {
        Ok(())
    } else {
        Err(TestFailure::assertion(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, text: &str, elapsed_ms: u64) -> ApiResponse {
        ApiResponse::from_parts(status, text.to_string(), Duration::from_millis(elapsed_ms))
    }

    #[test]
    fn test_expect_status() {
        let resp = response(404, "{}", 1);
        assert!(expect_status(&resp, &[400, 404], "verify").is_ok());
        assert!(matches!(
            expect_status(&resp, &[200], "verify"),
            Err(TestFailure::UnexpectedStatus { actual: 404, .. })
        ));
    }

    #[test]
    fn test_expect_valid_request() {
        let mut payload = Payload {
            name: "Jane Doe".to_string(),
            email: "user_1_gw0abc@example.com".to_string(),
            password: "Secret123!".to_string(),
            confirm_password: Some("Secret123!".to_string()),
        };
        assert!(expect_valid_request(&payload).is_ok());

        payload.confirm_password = Some("Secret124!".to_string());
        let err = expect_valid_request(&payload).unwrap_err();
        assert_eq!(err.violations()[0].field_path, "confirm_password");
    }

    #[test]
    fn test_expect_contract_reports_violations() {
        let resp = response(400, r#"{"error": true}"#, 1);
        let err = expect_contract(&resp, NamedContract::Error, "verify").unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field_path, "code");
    }

    #[test]
    fn test_flag_and_code() {
        let resp = response(400, r#"{"error": true, "code": "CodeMismatch"}"#, 1);
        assert!(expect_error_flag(&resp, true).is_ok());
        assert!(expect_error_flag(&resp, false).is_err());
        assert!(expect_code(&resp, "CodeMismatch").is_ok());
        assert!(expect_code(&resp, "UserCreated").is_err());
    }

    #[test]
    fn test_response_time_budget() {
        assert!(expect_response_time(&response(200, "", 100), Duration::from_millis(500), "/x").is_ok());
        let err = expect_response_time(&response(200, "", 600), Duration::from_millis(500), "/x")
            .unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: /x took 600ms, budget 500ms");
    }
}
