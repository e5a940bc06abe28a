//! Signup verification and OTP resend tests.
//!
//! Real OTPs are only delivered by email, so success paths accept either
//! outcome of a fixed code while negative paths pin the exact error.

use super::{SMOKE_RESPONSE_BUDGET, signed_up};
use crate::case::{TestCase, TestContext, TestGroup, TestResult};
use crate::checks::{
    ensure, expect_code, expect_contract, expect_error_flag, expect_response_time, expect_status,
};
use crate::error::TestFailure;
use crate::metadata::Tag;
use futures::FutureExt;
use harness_client::Endpoint;
use harness_contract::NamedContract;
use harness_data::fixtures::{EXPIRED_OTP, INCOMPLETE_OTP, VALID_OTP, WRONG_OTP};
use serde_json::json;

/// Resends allowed per account before the API starts refusing.
const RESEND_LIMIT: u32 = 5;

const UNKNOWN_EMAIL: &str = "test@example.com";

pub(super) fn verification_group() -> TestGroup {
    TestGroup::new("TestSignupVerification")
        .tag(Tag::feature_story("Authentication", "Signup Verification"))
        .case(
            TestCase::new("test_verify_otp_success", |ctx| verify_success(ctx).boxed())
                .tag(Tag::smoke("POST", Endpoint::ConfirmSignup.path())),
        )
        .case(
            TestCase::new("test_verify_otp_invalid_code", |ctx| invalid_code(ctx).boxed())
                .tag(Tag::validation("confirmation_code", "invalid OTP")),
        )
        .case(
            TestCase::new("test_verify_otp_expired_code", |ctx| expired_code(ctx).boxed())
                .tag(Tag::validation("confirmation_code", "expired OTP")),
        )
        .case(
            TestCase::new("test_verify_otp_incomplete_code", |ctx| incomplete_code(ctx).boxed())
                .tag(Tag::validation("confirmation_code", "incomplete OTP")),
        )
        .case(
            TestCase::new("test_verify_otp_missing_code", |ctx| missing_code(ctx).boxed())
                .tag(Tag::validation("confirmation_code", "missing field")),
        )
}

pub(super) fn resend_group() -> TestGroup {
    TestGroup::new("TestResendOTP")
        .tag(Tag::feature_story("Authentication", "Resend OTP"))
        .case(
            TestCase::new("test_resend_otp_success", |ctx| resend_success(ctx).boxed())
                .tag(Tag::smoke("POST", Endpoint::ResendCode.path())),
        )
        .case(
            TestCase::new("test_resend_otp_missing_email", |ctx| resend_missing_email(ctx).boxed())
                .tag(Tag::validation("email", "missing field")),
        )
        .case(
            TestCase::new("test_resend_otp_nonexistent_email", |ctx| {
                resend_nonexistent(ctx).boxed()
            })
            .tag(Tag::validation("email", "non-existent email")),
        )
        .case(
            TestCase::new("test_resend_otp_already_verified", |ctx| {
                resend_already_verified(ctx).boxed()
            })
            .tag(Tag::validation("email", "already verified")),
        )
        .case(
            TestCase::new("test_resend_otp_rate_limit", |ctx| resend_rate_limit(ctx).boxed()).tag(
                Tag::regression(
                    Some("Test resend OTP rate limiting after 5 attempts"),
                    "NORMAL",
                ),
            ),
        )
}

async fn verify_success(ctx: &TestContext<'_>) -> TestResult {
    let payload = signed_up(ctx).await?;
    let response = ctx.client.verify_otp(&payload.email, VALID_OTP).await?;
    expect_status(&response, &[200, 400], "verify")?;
    if response.is_success() {
        expect_contract(&response, NamedContract::VerifySuccess, "verify")?;
    }
    expect_response_time(&response, SMOKE_RESPONSE_BUDGET, Endpoint::ConfirmSignup.path())
}

async fn invalid_code(ctx: &TestContext<'_>) -> TestResult {
    let payload = signed_up(ctx).await?;
    let response = ctx.client.verify_otp(&payload.email, WRONG_OTP).await?;
    expect_status(&response, &[400], "verify with wrong code")?;
    expect_contract(&response, NamedContract::Error, "verify with wrong code")?;
    expect_error_flag(&response, true)?;
    expect_code(&response, "CodeMismatch")
}

async fn expired_code(ctx: &TestContext<'_>) -> TestResult {
    let response = ctx.client.verify_otp(UNKNOWN_EMAIL, EXPIRED_OTP).await?;
    expect_status(&response, &[404], "verify with expired code")
}

async fn incomplete_code(ctx: &TestContext<'_>) -> TestResult {
    let payload = signed_up(ctx).await?;
    let response = ctx.client.verify_otp(&payload.email, INCOMPLETE_OTP).await?;
    expect_status(&response, &[400], "verify with incomplete code")
}

async fn missing_code(ctx: &TestContext<'_>) -> TestResult {
    let body = json!({ "email": UNKNOWN_EMAIL });
    let response = ctx.client.send(Endpoint::ConfirmSignup, &body).await?;
    expect_status(&response, &[400], "verify without code")?;
    expect_error_flag(&response, true)?;
    expect_code(&response, "VALIDATION_ERROR")?;
    ensure(
        response.mentions_field("confirmation_code"),
        "error does not name confirmation_code",
    )
}

async fn resend_success(ctx: &TestContext<'_>) -> TestResult {
    let payload = signed_up(ctx).await?;
    let response = ctx.client.resend_otp(&payload.email).await?;
    expect_status(&response, &[200], "resend")?;
    expect_contract(&response, NamedContract::ResendSuccess, "resend")?;
    expect_error_flag(&response, false)?;
    expect_code(&response, "ConfirmationCodeResent")?;
    ensure(
        response.message() == Some("Confirmation code resent successfully."),
        format!("unexpected message {:?}", response.message()),
    )?;
    expect_response_time(&response, SMOKE_RESPONSE_BUDGET, Endpoint::ResendCode.path())
}

async fn resend_missing_email(ctx: &TestContext<'_>) -> TestResult {
    let response = ctx.client.send(Endpoint::ResendCode, &json!({})).await?;
    expect_status(&response, &[400], "resend without email")
}

async fn resend_nonexistent(ctx: &TestContext<'_>) -> TestResult {
    let response = ctx.client.resend_otp("nonexistent98765@example.com").await?;
    expect_status(&response, &[400, 404], "resend to unknown email")
}

async fn resend_already_verified(ctx: &TestContext<'_>) -> TestResult {
    let response = ctx.client.resend_otp("verified@example.com").await?;
    expect_status(&response, &[200, 400, 404], "resend to verified email")
}

async fn resend_rate_limit(ctx: &TestContext<'_>) -> TestResult {
    let payload = signed_up(ctx).await?;
    let probe = ctx
        .client
        .probe_resend_rate_limit(&payload.email, RESEND_LIMIT + 1)
        .await?;

    ensure(
        probe.attempts_before_block == RESEND_LIMIT,
        format!(
            "expected {RESEND_LIMIT} resends before the limit, got {}",
            probe.attempts_before_block
        ),
    )?;
    let blocked = probe
        .blocking_response
        .ok_or_else(|| TestFailure::assertion("resend was never rate limited"))?;
    expect_status(&blocked, &[400, 429], "rate-limited resend")?;
    expect_error_flag(&blocked, true)
}
