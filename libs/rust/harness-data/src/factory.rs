//! Data factory producing collision-free signup payloads.
//!
//! Generated emails have the shape `{prefix}_{timestamp_ms}_{worker}{suffix}@{domain}`.
//! The timestamp separates runs, the worker id separates concurrent workers
//! and the random suffix separates calls within the same millisecond. Within
//! one process a registry of issued tokens rules out reuse entirely.

use crate::error::GenerationError;
use crate::names::{self, DEFAULT_LOCALE};
use crate::payload::{Payload, PayloadField, PayloadOverrides};
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Default local-part prefix for generated emails.
pub const DEFAULT_EMAIL_PREFIX: &str = "user";

/// Default domain for generated emails.
pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";

/// Default password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

const SUFFIX_LEN: usize = 8;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*";

/// Tokens issued in the current millisecond, shared by every factory in the process.
struct IssuedTokens {
    millis: i64,
    issued: HashSet<(String, String)>,
}

static ISSUED: LazyLock<Mutex<IssuedTokens>> = LazyLock::new(|| {
    Mutex::new(IssuedTokens {
        millis: i64::MIN,
        issued: HashSet::new(),
    })
});

/// Components that make one generated email unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniquenessToken {
    /// Milliseconds since the Unix epoch, never decreasing within a process
    pub timestamp_ms: i64,
    /// Sanitized id of the generating worker, empty for the main process
    pub worker_id: String,
    /// Random lowercase alphanumeric suffix
    pub random_suffix: String,
}

impl UniquenessToken {
    /// Email local part for this token.
    #[must_use]
    pub fn local_part(&self, prefix: &str) -> String {
        format!("{prefix}_{self}")
    }
}

impl fmt::Display for UniquenessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}{}",
            self.timestamp_ms, self.worker_id, self.random_suffix
        )
    }
}

/// Per-worker generator of signup test data.
#[derive(Debug, Clone)]
pub struct DataFactory {
    worker_id: String,
    domain: String,
}

impl Default for DataFactory {
    fn default() -> Self {
        Self::new("")
    }
}

impl DataFactory {
    /// Create a factory for a worker.
    ///
    /// The id is reduced to lowercase ASCII alphanumerics so it is always safe
    /// inside an email local part.
    #[must_use]
    pub fn new(worker_id: impl AsRef<str>) -> Self {
        let worker_id = worker_id
            .as_ref()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self {
            worker_id,
            domain: DEFAULT_EMAIL_DOMAIN.to_string(),
        }
    }

    /// Set the email domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Sanitized worker id.
    #[must_use]
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Email domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Draw a token never issued before in this process.
    #[must_use]
    pub fn uniqueness_token(&self) -> UniquenessToken {
        let mut rng = rand::thread_rng();
        let mut state = ISSUED.lock();

        let now = Utc::now().timestamp_millis();
        if now > state.millis {
            state.millis = now;
            state.issued.clear();
        }
        let timestamp_ms = state.millis;

        loop {
            let random_suffix = random_from(&mut rng, SUFFIX_ALPHABET, SUFFIX_LEN);
            if state
                .issued
                .insert((self.worker_id.clone(), random_suffix.clone()))
            {
                return UniquenessToken {
                    timestamp_ms,
                    worker_id: self.worker_id.clone(),
                    random_suffix,
                };
            }
        }
    }

    /// Generate a unique email with the default prefix.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidDomain`] when the configured domain is malformed.
    pub fn unique_email(&self) -> Result<String, GenerationError> {
        self.unique_email_with_prefix(DEFAULT_EMAIL_PREFIX)
    }

    /// Generate a unique email with a custom local-part prefix.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidPrefix`] for an empty or unsafe prefix
    /// and [`GenerationError::InvalidDomain`] for a malformed domain.
    pub fn unique_email_with_prefix(&self, prefix: &str) -> Result<String, GenerationError> {
        if !is_valid_prefix(prefix) {
            return Err(GenerationError::InvalidPrefix(prefix.to_string()));
        }
        if !is_valid_domain(&self.domain) {
            return Err(GenerationError::InvalidDomain(self.domain.clone()));
        }
        let token = self.uniqueness_token();
        Ok(format!("{}@{}", token.local_part(prefix), self.domain))
    }

    /// Random `First Last` name from the default locale.
    #[must_use]
    pub fn random_name(&self) -> String {
        // The default table always exists.
        self.random_name_in(DEFAULT_LOCALE)
            .unwrap_or_else(|_| "Test User".to_string())
    }

    /// Random `First Last` name from a locale's table.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnsupportedLocale`] when no table exists.
    pub fn random_name_in(&self, locale: &str) -> Result<String, GenerationError> {
        let table = names::table_for(locale)
            .ok_or_else(|| GenerationError::UnsupportedLocale(locale.to_string()))?;
        let mut rng = rand::thread_rng();
        let first = table.first[rng.gen_range(0..table.first.len())];
        let last = table.last[rng.gen_range(0..table.last.len())];
        Ok(format!("{first} {last}"))
    }

    /// Random password with at least one uppercase letter, lowercase letter,
    /// digit and symbol.
    ///
    /// Lengths below 4 are raised to 4 so every class fits.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::ZeroLength`] when `length` is 0.
    pub fn random_password(&self, length: usize) -> Result<String, GenerationError> {
        if length == 0 {
            return Err(GenerationError::ZeroLength);
        }
        let length = length.max(4);
        let mut rng = rand::thread_rng();

        let mut chars: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS]
            .iter()
            .map(|class| class[rng.gen_range(0..class.len())])
            .collect();
        let pool: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();
        chars.extend((4..length).map(|_| pool[rng.gen_range(0..pool.len())]));
        chars.shuffle(&mut rng);

        Ok(chars.into_iter().map(char::from).collect())
    }

    /// Build a signup payload, generating any field not overridden.
    ///
    /// # Errors
    ///
    /// Propagates email generation failures.
    pub fn signup_payload(&self, overrides: PayloadOverrides) -> Result<Payload, GenerationError> {
        let email = match overrides.email {
            Some(email) => email,
            None => self.unique_email()?,
        };
        let password = match overrides.password {
            Some(password) => password,
            None => self.random_password(DEFAULT_PASSWORD_LENGTH)?,
        };
        let confirm_password = match overrides.confirm_password {
            Some(confirm) => Some(confirm),
            None if overrides.with_confirmation => Some(password.clone()),
            None => None,
        };
        Ok(Payload {
            name: overrides.name.unwrap_or_else(|| self.random_name()),
            email,
            password,
            confirm_password,
        })
    }

    /// Build a fresh valid payload with exactly one field replaced.
    ///
    /// # Errors
    ///
    /// Propagates email generation failures.
    pub fn invalid_payload(
        &self,
        field: PayloadField,
        invalid_value: impl Into<String>,
    ) -> Result<Payload, GenerationError> {
        let mut payload = self.signup_payload(PayloadOverrides::default())?;
        payload.set(field, invalid_value);
        Ok(payload)
    }
}

fn random_from(rng: &mut impl Rng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}

fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && !prefix.starts_with('.')
        && !prefix.ends_with('.')
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn is_valid_domain(domain: &str) -> bool {
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'))
}
