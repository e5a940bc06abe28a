//! The signup and OTP suite.
//!
//! Three groups, one per user story: registration, signup verification and
//! OTP resend. Every test draws fresh data from its worker's factory, so a
//! retried attempt never reuses an email from the failed one.

mod signup;
mod verification;

use crate::case::{TestContext, TestGroup};
use crate::checks::expect_status;
use crate::error::TestFailure;
use harness_data::{Payload, PayloadOverrides};
use std::time::Duration;

/// Response-time budget applied by smoke tests.
pub const SMOKE_RESPONSE_BUDGET: Duration = Duration::from_secs(5);

/// Every group of the suite.
#[must_use]
pub fn signup_suite() -> Vec<TestGroup> {
    vec![
        signup::group(),
        verification::verification_group(),
        verification::resend_group(),
    ]
}

/// Register a fresh account, failing the test unless signup succeeds.
async fn signed_up(ctx: &TestContext<'_>) -> Result<Payload, TestFailure> {
    let payload = ctx.data.signup_payload(PayloadOverrides::default())?;
    let response = ctx.client.signup(&payload).await?;
    expect_status(&response, &[200, 201], "signup precondition")?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Category, MetadataRegistry};

    #[test]
    fn test_suite_classifies_cleanly() {
        let mut registry = MetadataRegistry::new();
        for group in signup_suite() {
            for case in &group.cases {
                let id = format!("{}::{}", group.name, case.id);
                registry
                    .register(&id, group.tags.iter().chain(case.tags.iter()))
                    .unwrap();
            }
        }

        assert_eq!(registry.len(), 30);
        let known_bugs = registry.iter().filter(|(_, c)| c.is_known_bug()).count();
        assert_eq!(known_bugs, 12);
        let smoke = registry
            .iter()
            .filter(|(_, c)| c.category == Some(Category::Smoke))
            .count();
        assert_eq!(smoke, 3);
        assert!(registry.iter().all(|(_, c)| c.feature.as_deref() == Some("Authentication")));
    }
}
