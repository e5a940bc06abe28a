//! Shared proptest generators for the signup API harness.

use crate::fixtures::{PUBLIC_DOMAINS, WEAK_PASSWORDS};
use crate::payload::PayloadField;
use proptest::prelude::*;

/// Generate valid email local-part prefixes.
pub fn email_prefix_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}"
}

/// Generate worker ids in the shape parallel runners hand out.
pub fn worker_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (0u32..64).prop_map(|n| format!("gw{n}")),
        "[a-z]{1,4}[0-9]{1,3}",
    ]
}

/// Generate email domains accepted by the factory.
pub fn email_domain_strategy() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9-]{1,12}", "[a-z]{2,6}").prop_map(|(host, tld)| format!("{host}.{tld}"))
}

/// Generate requested password lengths, including ones below the minimum.
pub fn password_length_strategy() -> impl Strategy<Value = usize> {
    1usize..=64
}

/// Generate names the API must reject.
pub fn invalid_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{1,2}",
        "[@#!][A-Za-z]{3,10}",
        "[A-Za-z]{3,10}[@#!]",
        "[A-Za-z]{3,10}[0-9]{1,3}",
        " [A-Za-z]{3,10}",
        "[A-Za-z]{81,100}",
    ]
}

/// Generate emails on public mailbox providers.
pub fn public_domain_email_strategy() -> impl Strategy<Value = String> {
    ("[a-z]{3,12}", prop::sample::select(PUBLIC_DOMAINS.to_vec()))
        .prop_map(|(local, domain)| format!("{local}@{domain}"))
}

/// Generate passwords missing a complexity class.
pub fn weak_password_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(WEAK_PASSWORDS.to_vec()).prop_map(str::to_string),
        "[a-z0-9!]{8,16}",
        "[A-Z0-9!]{8,16}",
        "[A-Za-z!]{8,16}",
        "[A-Za-z0-9]{8,16}",
    ]
}

/// Generate OTP codes that are not six digits.
pub fn malformed_otp_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{0,5}",
        "[0-9]{7,10}",
        "[a-zA-Z]{6}",
    ]
}

/// Generate well-formed six-digit OTP codes.
pub fn otp_strategy() -> impl Strategy<Value = String> {
    "[0-9]{6}"
}

/// Generate payload fields.
pub fn payload_field_strategy() -> impl Strategy<Value = PayloadField> {
    prop_oneof![
        Just(PayloadField::Name),
        Just(PayloadField::Email),
        Just(PayloadField::Password),
        Just(PayloadField::ConfirmPassword),
    ]
}

/// Generate HTTP status codes the signup API returns.
pub fn http_status_code_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200u16),
        Just(201u16),
        Just(400u16),
        Just(404u16),
        Just(409u16),
        Just(429u16),
        Just(500u16),
        Just(502u16),
        Just(503u16),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn test_invalid_names_break_a_rule() {
        let mut runner = TestRunner::default();
        for _ in 0..50 {
            let name = invalid_name_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            let length_ok = (3..=80).contains(&name.chars().count());
            let chars_ok = name.chars().all(|c| c.is_alphabetic() || c == ' ');
            let trimmed = name.trim() == name;
            assert!(!(length_ok && chars_ok && trimmed), "{name:?}");
        }
    }

    #[test]
    fn test_malformed_otp_is_never_six_digits() {
        let mut runner = TestRunner::default();
        for _ in 0..50 {
            let code = malformed_otp_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(!(code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())));
        }
    }

    #[test]
    fn test_public_domain_email_format() {
        let mut runner = TestRunner::default();
        for _ in 0..10 {
            let email = public_domain_email_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            let (_, domain) = email.split_once('@').unwrap();
            assert!(PUBLIC_DOMAINS.contains(&domain));
        }
    }
}
