//! Response types.

use serde_json::Value;
use std::time::Duration;

/// A fully read API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status
    pub status: u16,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    /// Raw body text
    pub text: String,
    /// Time from send to fully read body
    pub elapsed: Duration,
}

impl ApiResponse {
    /// Build from a status and raw body text.
    #[must_use]
    pub fn from_parts(status: u16, text: String, elapsed: Duration) -> Self {
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            body,
            text,
            elapsed,
        }
    }

    /// 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body's `error` flag, `false` when absent.
    #[must_use]
    pub fn error_flag(&self) -> bool {
        self.body.get("error").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Body's `code`.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }

    /// Body's `message`.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Whether the body names `field` under `data` or in its `errors` list.
    #[must_use]
    pub fn mentions_field(&self, field: &str) -> bool {
        let in_data = self
            .body
            .get("data")
            .and_then(Value::as_object)
            .is_some_and(|data| data.contains_key(field));
        let in_errors = self
            .body
            .get("errors")
            .and_then(Value::as_array)
            .is_some_and(|errors| {
                errors
                    .iter()
                    .any(|e| e.get("field").and_then(Value::as_str) == Some(field))
            });
        in_data || in_errors
    }
}

/// Outcome of the resend rate-limit probe.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitProbe {
    /// Successful resends before the first non-success
    pub attempts_before_block: u32,
    /// The first non-success response, `None` when the limit was never hit
    pub blocking_response: Option<ApiResponse>,
}

impl RateLimitProbe {
    /// Whether the probe hit a limit.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocking_response.is_some()
    }
}
