//! User registration tests.

use super::SMOKE_RESPONSE_BUDGET;
use crate::case::{TestCase, TestContext, TestGroup, TestResult};
use crate::checks::{
    ensure, expect_code, expect_contract, expect_error_flag, expect_response_time, expect_status,
    expect_valid_request,
};
use crate::metadata::Tag;
use futures::FutureExt;
use harness_client::Endpoint;
use harness_contract::NamedContract;
use harness_data::fixtures::{MALFORMED_EMAIL, PUBLIC_DOMAINS, WEAK_PASSWORDS, invalid_names};
use harness_data::{PayloadField, PayloadOverrides};
use serde_json::Value;

const NAME_CASES: [&str; 7] = [
    "too_short",
    "leading_symbol",
    "trailing_symbol",
    "leading_space",
    "trailing_space",
    "digits",
    "too_long",
];

const PASSWORD_CASES: [&str; 4] = ["no_uppercase", "no_lowercase", "no_digit", "no_symbol"];

pub(super) fn group() -> TestGroup {
    let names = NAME_CASES
        .iter()
        .map(ToString::to_string)
        .zip(invalid_names())
        .collect();
    let domains = PUBLIC_DOMAINS
        .iter()
        .map(|d| ((*d).to_string(), *d))
        .collect();
    let passwords = PASSWORD_CASES
        .iter()
        .map(ToString::to_string)
        .zip(WEAK_PASSWORDS)
        .collect();

    TestGroup::new("TestSignup")
        .tag(Tag::feature_story("Authentication", "User Registration"))
        .case(
            TestCase::new("test_signup_success", |ctx| signup_success(ctx).boxed())
                .tag(Tag::smoke("POST", Endpoint::Signup.path())),
        )
        .case(
            TestCase::new("test_signup_duplicate_email", |ctx| duplicate_email(ctx).boxed())
                .tag(Tag::regression(Some("Duplicate email is rejected"), "CRITICAL")),
        )
        .case(
            TestCase::new("test_signup_missing_fields", |ctx| missing_fields(ctx).boxed())
                .tag(Tag::validation("name", "missing field")),
        )
        .case(
            TestCase::new("test_signup_invalid_email", |ctx| invalid_email(ctx).boxed())
                .tag(Tag::validation("email", "format")),
        )
        .case(
            TestCase::new("test_signup_password_mismatch", |ctx| password_mismatch(ctx).boxed())
                .tag(Tag::validation("confirm_password", "mismatch"))
                .tag(Tag::known_bug("API-002", "API accepts mismatched passwords")),
        )
        .parametrized(
            "test_signup_name_validation_failures",
            &[
                Tag::validation("name", "format"),
                Tag::known_bug("API-001", "API lacks name validation"),
            ],
            names,
            |ctx, name: String| name_rejected(ctx, name).boxed(),
        )
        .parametrized(
            "test_signup_email_public_domain",
            &[Tag::validation("email", "public domain")],
            domains,
            |ctx, domain: &'static str| public_domain_rejected(ctx, domain).boxed(),
        )
        .parametrized(
            "test_signup_password_complexity",
            &[
                Tag::validation("password", "complexity"),
                Tag::known_bug("API-003", "API returns 500 instead of 400 for password complexity"),
            ],
            passwords,
            |ctx, password: &'static str| weak_password_rejected(ctx, password).boxed(),
        )
}

async fn signup_success(ctx: &TestContext<'_>) -> TestResult {
    let payload = ctx.data.signup_payload(PayloadOverrides::default())?;
    expect_valid_request(&payload)?;
    let response = ctx.client.signup(&payload).await?;

    expect_status(&response, &[200, 201], "signup")?;
    expect_contract(&response, NamedContract::SignupSuccess, "signup")?;
    ensure(
        response.body["data"]["user_confirmed"] == Value::Bool(false),
        "new account must start unconfirmed",
    )?;
    expect_response_time(&response, SMOKE_RESPONSE_BUDGET, Endpoint::Signup.path())
}

async fn duplicate_email(ctx: &TestContext<'_>) -> TestResult {
    let payload = ctx.data.signup_payload(PayloadOverrides::default())?;
    let first = ctx.client.signup(&payload).await?;
    expect_status(&first, &[200, 201], "first signup")?;

    let second = ctx.client.signup(&payload).await?;
    expect_status(&second, &[409], "duplicate signup")?;
    expect_contract(&second, NamedContract::Error, "duplicate signup")?;
    expect_error_flag(&second, true)?;
    expect_code(&second, "USERNAME_EXISTS")?;
    ensure(
        second.message() == Some("User already exists"),
        format!("unexpected message {:?}", second.message()),
    )
}

async fn missing_fields(ctx: &TestContext<'_>) -> TestResult {
    let payload = ctx.data.signup_payload(PayloadOverrides::default())?;
    let body = payload.to_json_without(&[PayloadField::Name]);
    let response = ctx.client.send(Endpoint::Signup, &body).await?;
    expect_status(&response, &[400], "signup without name")
}

async fn invalid_email(ctx: &TestContext<'_>) -> TestResult {
    let payload = ctx.data.invalid_payload(PayloadField::Email, MALFORMED_EMAIL)?;
    let response = ctx.client.signup(&payload).await?;
    expect_status(&response, &[400], "signup with malformed email")?;
    expect_error_flag(&response, true)
}

async fn password_mismatch(ctx: &TestContext<'_>) -> TestResult {
    let payload = ctx
        .data
        .signup_payload(PayloadOverrides::default().confirm_password("DifferentPassword1!"))?;
    let response = ctx.client.signup(&payload).await?;
    expect_status(&response, &[400], "signup with mismatched confirmation")
}

async fn name_rejected(ctx: &TestContext<'_>, name: String) -> TestResult {
    let payload = ctx.data.invalid_payload(PayloadField::Name, name)?;
    let response = ctx.client.signup(&payload).await?;
    expect_status(&response, &[400], "signup with invalid name")
}

async fn public_domain_rejected(ctx: &TestContext<'_>, domain: &str) -> TestResult {
    let email = ctx.data.unique_email_with_prefix("public_domain")?;
    let local = email.split('@').next().unwrap_or_default();
    let payload = ctx
        .data
        .invalid_payload(PayloadField::Email, format!("{local}@{domain}"))?;
    let response = ctx.client.signup(&payload).await?;
    expect_status(&response, &[400], &format!("signup with {domain} address"))
}

async fn weak_password_rejected(ctx: &TestContext<'_>, password: &str) -> TestResult {
    let payload = ctx.data.signup_payload(
        PayloadOverrides::default()
            .password(password)
            .with_confirmation(),
    )?;
    let response = ctx.client.signup(&payload).await?;
    expect_status(&response, &[400], "signup with weak password")
}
