//! Signup API client with request logging.

use crate::{
    endpoints::Endpoint,
    error::{ClientError, ClientResult},
    response::{ApiResponse, RateLimitProbe},
};
use harness_common::{HarnessConfig, build_http_client};
use harness_data::Payload;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Client for the signup and OTP endpoints.
///
/// Owns one pooled HTTP client and no per-test state, so a single instance
/// serves a whole worker session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new client from the harness configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the HTTP client cannot be built.
    pub fn new(config: &HarnessConfig) -> ClientResult<Self> {
        let http_config = config.http_config();
        let http =
            build_http_client(&http_config).map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            timeout: http_config.timeout,
        })
    }

    /// API origin without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure; any HTTP status is a response.
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn signup(&self, payload: &Payload) -> ClientResult<ApiResponse> {
        let body = serde_json::to_value(payload)
            .map_err(|e| ClientError::invalid_input(e.to_string()))?;
        self.send(Endpoint::Signup, &body).await
    }

    /// Confirm an account with its emailed code.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, email: &str, code: &str) -> ClientResult<ApiResponse> {
        let body = json!({ "email": email, "confirmation_code": code });
        self.send(Endpoint::ConfirmSignup, &body).await
    }

    /// Ask for the confirmation code to be sent again.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure.
    #[instrument(skip(self))]
    pub async fn resend_otp(&self, email: &str) -> ClientResult<ApiResponse> {
        let body = json!({ "email": email });
        self.send(Endpoint::ResendCode, &body).await
    }

    /// Send an arbitrary JSON body, for malformed-request cases such as a
    /// missing field.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure.
    pub async fn send(&self, endpoint: Endpoint, body: &Value) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let started = Instant::now();

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let err = ClientError::from_transport(&e, self.timeout);
                debug!(%url, error = %err, "Request failed");
                err
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::from_transport(&e, self.timeout))?;
        let elapsed = started.elapsed();

        debug!(
            method = "POST",
            %url,
            status,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "API response"
        );

        Ok(ApiResponse::from_parts(status, text, elapsed))
    }

    /// Resend codes back to back until the first non-success status or
    /// `max_attempts` successes.
    ///
    /// Stops immediately at the first non-success, so the service sees at most
    /// one request past its limit.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] when `max_attempts` is 0, and
    /// aborts with the transport error if any request fails.
    #[instrument(skip(self))]
    pub async fn probe_resend_rate_limit(
        &self,
        email: &str,
        max_attempts: u32,
    ) -> ClientResult<RateLimitProbe> {
        if max_attempts == 0 {
            return Err(ClientError::invalid_input("max_attempts must be at least 1"));
        }

        let mut successes = 0;
        while successes < max_attempts {
            let response = self.resend_otp(email).await?;
            if !response.is_success() {
                info!(
                    attempts_before_block = successes,
                    status = response.status,
                    "Resend rate limit reached"
                );
                return Ok(RateLimitProbe {
                    attempts_before_block: successes,
                    blocking_response: Some(response),
                });
            }
            successes += 1;
        }

        warn!(max_attempts, "Resend rate limit not reached");
        Ok(RateLimitProbe {
            attempts_before_block: successes,
            blocking_response: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let mut config = HarnessConfig::default();
        config.base_url = "http://localhost:8000/".parse().unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_zero_attempt_probe_is_rejected() {
        let client = ApiClient::new(&HarnessConfig::default()).unwrap();
        let result = client.probe_resend_rate_limit("a@example.com", 0).await;
        assert!(matches!(result, Err(ClientError::InvalidInput(_))));
    }
}
