//! Stateful mock of the signup API for wiremock servers.
//!
//! [`MockSignupApi`] keeps accounts, confirmation state and resend counters so
//! multi-step flows (signup, confirm, resend, rate limiting) behave like the
//! real service.

use crate::fixtures::{PUBLIC_DOMAINS, SampleResponse, VALID_OTP};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Signup endpoint path.
pub const SIGNUP_PATH: &str = "/api/authentication/signup/";
/// Confirmation endpoint path.
pub const CONFIRM_PATH: &str = "/api/authentication/signup/confirm/";
/// Resend endpoint path.
pub const RESEND_PATH: &str = "/api/authentication/signup/resend-code/";

/// Default number of resends allowed per account.
pub const DEFAULT_RESEND_LIMIT: u32 = 5;

#[derive(Debug, Default)]
struct Account {
    confirmed: bool,
    resends: u32,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: HashMap<String, Account>,
    requests: Vec<(String, Value)>,
    pending_signup_delays: Vec<Duration>,
    failures: HashMap<String, u32>,
}

/// Mock signup API.
#[derive(Debug, Clone)]
pub struct MockSignupApi {
    state: Arc<Mutex<MockState>>,
    resend_limit: u32,
    lenient_names: bool,
    lenient_passwords: bool,
}

impl Default for MockSignupApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSignupApi {
    /// Create a mock with strict validation and the default resend limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            resend_limit: DEFAULT_RESEND_LIMIT,
            lenient_names: false,
            lenient_passwords: false,
        }
    }

    /// Set the per-account resend limit.
    #[must_use]
    pub const fn with_resend_limit(mut self, limit: u32) -> Self {
        self.resend_limit = limit;
        self
    }

    /// Accept names breaking the name rules, as the deployed API currently does.
    #[must_use]
    pub const fn with_lenient_names(mut self) -> Self {
        self.lenient_names = true;
        self
    }

    /// Accept passwords missing a complexity class or differing from their
    /// confirmation, as the deployed API currently does.
    #[must_use]
    pub const fn with_lenient_passwords(mut self) -> Self {
        self.lenient_passwords = true;
        self
    }

    /// Delay the next signup response. The account is still created.
    pub fn delay_next_signup(&self, delay: Duration) {
        self.state.lock().pending_signup_delays.push(delay);
    }

    /// Answer the next `count` requests to `path` with a 500.
    pub fn fail_next(&self, path: &str, count: u32) {
        self.state.lock().failures.insert(path.to_string(), count);
    }

    /// Pre-register an account.
    pub fn register(&self, email: &str, confirmed: bool) {
        self.state.lock().accounts.insert(
            email.to_string(),
            Account {
                confirmed,
                resends: 0,
            },
        );
    }

    /// Registered emails.
    #[must_use]
    pub fn registered_emails(&self) -> Vec<String> {
        self.state.lock().accounts.keys().cloned().collect()
    }

    /// Whether an account is confirmed.
    #[must_use]
    pub fn is_confirmed(&self, email: &str) -> bool {
        self.state
            .lock()
            .accounts
            .get(email)
            .is_some_and(|a| a.confirmed)
    }

    /// Bodies received on a path, in arrival order.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Value> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Mount on a server, answering every `POST`.
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(method("POST"))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    /// Start a server with this mock mounted.
    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        self.mount(&server).await;
        server
    }

    fn signup(&self, state: &mut MockState, body: &Map<String, Value>) -> ResponseTemplate {
        let (Some(name), Some(email), Some(password)) = (
            str_field(body, "name"),
            str_field(body, "email"),
            str_field(body, "password"),
        ) else {
            let missing = ["name", "email", "password"]
                .into_iter()
                .find(|f| str_field(body, f).is_none())
                .unwrap_or("name");
            return reply(&SampleResponse::validation_error(missing, "This field is required."));
        };

        if !self.lenient_names && !is_valid_name(name) {
            return reply(&SampleResponse::validation_error(
                "name",
                "Name must be 3-80 letters or spaces.",
            ));
        }
        if !is_valid_email(email) {
            return reply(&SampleResponse::validation_error(
                "email",
                "Enter a valid email address.",
            ));
        }
        if is_public_domain(email) {
            return reply(&SampleResponse::validation_error(
                "email",
                "Public email domains are not allowed.",
            ));
        }
        if !self.lenient_passwords && !is_strong_password(password) {
            return reply(&SampleResponse::validation_error(
                "password",
                "Password must contain uppercase, lowercase, digit and symbol.",
            ));
        }
        if !self.lenient_passwords
            && str_field(body, "confirm_password").is_some_and(|confirm| confirm != password)
        {
            return reply(&SampleResponse::validation_error(
                "confirm_password",
                "Passwords do not match.",
            ));
        }
        if state.accounts.contains_key(email) {
            return reply(&SampleResponse::user_exists());
        }

        state.accounts.insert(email.to_string(), Account::default());
        let template = reply(&SampleResponse::user_created());
        if state.pending_signup_delays.is_empty() {
            template
        } else {
            template.set_delay(state.pending_signup_delays.remove(0))
        }
    }

    fn confirm(state: &mut MockState, body: &Map<String, Value>) -> ResponseTemplate {
        let Some(email) = str_field(body, "email") else {
            return reply(&SampleResponse::validation_error("email", "This field is required."));
        };
        let Some(code) = str_field(body, "confirmation_code") else {
            return reply(&SampleResponse::validation_error(
                "confirmation_code",
                "This field is required.",
            ));
        };
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return reply(&SampleResponse::validation_error(
                "confirmation_code",
                "Ensure this field has 6 digits.",
            ));
        }
        let Some(account) = state.accounts.get_mut(email) else {
            return reply(&SampleResponse::user_not_found());
        };
        if code != VALID_OTP {
            return reply(&SampleResponse::code_mismatch());
        }
        account.confirmed = true;
        reply(&SampleResponse::confirmed())
    }

    fn resend(&self, state: &mut MockState, body: &Map<String, Value>) -> ResponseTemplate {
        let Some(email) = str_field(body, "email") else {
            return reply(&SampleResponse::validation_error("email", "This field is required."));
        };
        let Some(account) = state.accounts.get_mut(email) else {
            return reply(&SampleResponse::user_not_found());
        };
        if account.confirmed {
            return reply(&SampleResponse::validation_error(
                "email",
                "User is already confirmed.",
            ));
        }
        if account.resends >= self.resend_limit {
            return reply(&SampleResponse::rate_limited());
        }
        account.resends += 1;
        reply(&SampleResponse::code_resent())
    }
}

impl Respond for MockSignupApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().to_string();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        let mut state = self.state.lock();
        state.requests.push((path.clone(), body.clone()));

        if let Some(remaining) = state.failures.get_mut(&path) {
            if *remaining > 0 {
                *remaining -= 1;
                return ResponseTemplate::new(500).set_body_string("Internal Server Error");
            }
        }

        let Some(body) = body.as_object() else {
            return reply(&SampleResponse::validation_error("body", "Expected a JSON object."));
        };

        match path.as_str() {
            SIGNUP_PATH => self.signup(&mut state, body),
            CONFIRM_PATH => Self::confirm(&mut state, body),
            RESEND_PATH => self.resend(&mut state, body),
            _ => ResponseTemplate::new(404).set_body_string("Not Found"),
        }
    }
}

fn reply(sample: &SampleResponse) -> ResponseTemplate {
    ResponseTemplate::new(sample.status).set_body_json(&sample.body)
}

fn str_field<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    body.get(field).and_then(Value::as_str)
}

fn is_valid_name(name: &str) -> bool {
    (3..=80).contains(&name.chars().count())
        && name.trim() == name
        && name.chars().all(|c| c.is_alphabetic() || c == ' ')
}

fn is_valid_email(email: &str) -> bool {
    email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@')
    })
}

fn is_public_domain(email: &str) -> bool {
    email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| PUBLIC_DOMAINS.contains(&domain.to_ascii_lowercase().as_str()))
}

fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{WEAK_PASSWORDS, invalid_names};

    #[test]
    fn test_name_rules() {
        assert!(is_valid_name("Jane Doe"));
        for name in invalid_names() {
            assert!(!is_valid_name(&name), "{name:?}");
        }
    }

    #[test]
    fn test_password_rules() {
        assert!(is_strong_password("Password123!"));
        for password in WEAK_PASSWORDS {
            assert!(!is_strong_password(password), "{password}");
        }
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("user_1_ab@example.com"));
        assert!(!is_valid_email("invalid-email-format"));
        assert!(is_public_domain("someone@Gmail.com"));
        assert!(!is_public_domain("someone@example.com"));
    }

    #[test]
    fn test_register_and_query() {
        let api = MockSignupApi::new();
        api.register("a@example.com", true);
        assert!(api.is_confirmed("a@example.com"));
        assert_eq!(api.registered_emails(), ["a@example.com"]);
    }
}
