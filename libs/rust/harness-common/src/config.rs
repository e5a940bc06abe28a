//! Environment configuration with per-environment profiles.
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file. Parsing goes through a lookup function so the same rules can be
//! exercised in tests without touching the process environment.

use crate::error::ConfigError;
use crate::http::HttpConfig;
use crate::retry::RetryConfig;
use crate::tracing_config::TracingConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Deployment environment the suite targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Development cluster
    #[default]
    Dev,
    /// Staging cluster
    Staging,
    /// Production
    Prod,
}

impl Environment {
    /// Parse an environment name; unknown names fall back to `Dev`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "staging" => Self::Staging,
            "prod" => Self::Prod,
            _ => Self::Dev,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    const fn default_base_url(self) -> &'static str {
        match self {
            Self::Dev => "http://localhost:8000",
            Self::Staging => "https://staging-api.example.com",
            Self::Prod => "https://api.example.com",
        }
    }

    /// Variable that overrides the base URL for this environment only.
    const fn base_url_override(self) -> Option<&'static str> {
        match self {
            Self::Dev => None,
            Self::Staging => Some("STAGING_BASE_URL"),
            Self::Prod => Some("PROD_BASE_URL"),
        }
    }

    const fn default_retry_count(self) -> u32 {
        match self {
            Self::Prod => 1,
            _ => 2,
        }
    }

    const fn default_workers(self) -> usize {
        match self {
            Self::Prod => 2,
            _ => 4,
        }
    }
}

/// Harness configuration with validation.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Target environment
    pub environment: Environment,
    /// API origin
    pub base_url: Url,
    /// Per-request timeout
    pub api_timeout: Duration,
    /// How many times a failed test may be re-executed
    pub retry_count: u32,
    /// Delay between retry attempts
    pub retry_delay: Duration,
    /// Number of parallel workers (>= 1)
    pub parallel_workers: usize,
    /// Fail-fast threshold for the whole run
    pub max_failures: Option<usize>,
    /// Category filter as given (validated by the runner)
    pub category_filter: Option<String>,
    /// Domain for generated email addresses
    pub email_domain: String,
    /// Directory receiving JSON-lines test reports
    pub results_dir: Option<PathBuf>,
    /// README whose results section is rewritten after the run
    pub readme_path: Option<PathBuf>,
    /// Tracing filter directive
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let environment = Environment::Dev;
        Self {
            environment,
            base_url: Url::parse(environment.default_base_url())
                .unwrap_or_else(|_| unreachable!("static default URL is valid")),
            api_timeout: Duration::from_secs(30),
            retry_count: environment.default_retry_count(),
            retry_delay: Duration::from_secs(1),
            parallel_workers: environment.default_workers(),
            max_failures: None,
            category_filter: None,
            email_domain: "example.com".to_string(),
            results_dir: None,
            readme_path: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from environment variables with validation.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any variable fails to parse or validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any variable fails to parse or validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENV").map_or(Environment::Dev, |v| Environment::from_name(&v));

        let base_url_raw = lookup("BASE_URL")
            .or_else(|| environment.base_url_override().and_then(&lookup))
            .unwrap_or_else(|| environment.default_base_url().to_string());
        let base_url = Url::parse(&base_url_raw).map_err(|e| ConfigError::InvalidUrl {
            field: "BASE_URL".to_string(),
            reason: e.to_string(),
        })?;

        let api_timeout_secs: u64 = parse_var(&lookup, "API_TIMEOUT", 30)?;
        let retry_delay_secs: u64 = parse_var(&lookup, "RETRY_DELAY", 1)?;

        let config = Self {
            environment,
            base_url,
            api_timeout: Duration::from_secs(api_timeout_secs),
            retry_count: parse_var(&lookup, "RETRY_COUNT", environment.default_retry_count())?,
            retry_delay: Duration::from_secs(retry_delay_secs),
            parallel_workers: parse_var(&lookup, "PARALLEL_WORKERS", environment.default_workers())?,
            max_failures: parse_optional_var(&lookup, "MAX_FAILURES")?,
            category_filter: non_empty(lookup("TEST_CATEGORY")),
            email_domain: non_empty(lookup("EMAIL_DOMAIN"))
                .unwrap_or_else(|| "example.com".to_string()),
            results_dir: non_empty(lookup("RESULTS_DIR")).map(PathBuf::from),
            readme_path: lookup("UPDATE_README")
                .is_some_and(|v| v.eq_ignore_ascii_case("true"))
                .then(|| {
                    non_empty(lookup("README_PATH"))
                        .map_or_else(|| PathBuf::from("README.md"), PathBuf::from)
                }),
            log_level: non_empty(lookup("LOG_LEVEL")).unwrap_or_else(|| "info".to_string()),
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_timeout.is_zero() {
            return Err(ConfigError::out_of_range("API_TIMEOUT", "must be greater than 0"));
        }
        if self.parallel_workers == 0 {
            return Err(ConfigError::out_of_range("PARALLEL_WORKERS", "must be at least 1"));
        }
        if self.max_failures == Some(0) {
            return Err(ConfigError::out_of_range("MAX_FAILURES", "must be greater than 0"));
        }
        if self.email_domain.contains('@') {
            return Err(ConfigError::out_of_range("EMAIL_DOMAIN", "must not contain '@'"));
        }
        Ok(())
    }

    /// HTTP client settings derived from this config.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default().with_timeout(self.api_timeout)
    }

    /// Retry settings derived from this config.
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig::fixed(self.retry_count, self.retry_delay)
    }

    /// Tracing settings derived from this config.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let config = TracingConfig::default()
            .with_service_name("signup-suite")
            .with_log_level(&self.log_level);
        if self.log_json { config.with_json_output() } else { config }
    }

    /// Log the active configuration once at session start.
    pub fn log_summary(&self) {
        info!(
            env = self.environment.as_str(),
            base_url = %self.base_url,
            api_timeout_secs = self.api_timeout.as_secs(),
            retry_count = self.retry_count,
            parallel_workers = self.parallel_workers,
            max_failures = ?self.max_failures,
            category = self.category_filter.as_deref().unwrap_or("all"),
            "Harness configuration"
        );
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_optional_var(lookup, name).map(|v| v.unwrap_or(default))
}

/// Parse a variable that has no default.
fn parse_optional_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup(name)) {
        Some(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::ParseError {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
