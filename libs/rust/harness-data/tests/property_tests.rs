//! Property-based tests for the data factory.
//!
//! Uses proptest with 100 iterations per property.

use harness_contract::{Contract, FieldKind, NamedContract, validate};
use harness_data::generators::{
    email_domain_strategy, email_prefix_strategy, password_length_strategy,
    payload_field_strategy, worker_id_strategy,
};
use harness_data::{DataFactory, PayloadField, PayloadOverrides};
use proptest::prelude::*;
use std::collections::HashSet;
use std::thread;

fn email_contract() -> Contract {
    Contract::new("generated_email").required("email", FieldKind::Email)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Generated emails are well formed for any prefix, worker and domain.
    #[test]
    fn prop_generated_email_is_well_formed(
        prefix in email_prefix_strategy(),
        worker in worker_id_strategy(),
        domain in email_domain_strategy(),
    ) {
        let factory = DataFactory::new(&worker).with_domain(&domain);
        let email = factory.unique_email_with_prefix(&prefix).unwrap();

        let body = serde_json::json!({ "email": email });
        prop_assert!(validate(&body, &email_contract()).is_empty());

        let expected_prefix = format!("{}_", prefix);
        let expected_domain = format!("@{}", domain);
        prop_assert!(email.starts_with(&expected_prefix));
        prop_assert!(email.ends_with(&expected_domain));
    }

    /// Default payloads satisfy the advertised signup request contract for any
    /// worker, domain and locale, with or without a confirmation.
    #[test]
    fn prop_default_payload_satisfies_request_contract(
        worker in worker_id_strategy(),
        domain in email_domain_strategy(),
        locale in prop::sample::select(vec!["en_US", "en_GB", "de_DE", "es_ES"]),
        with_confirmation in any::<bool>(),
    ) {
        let factory = DataFactory::new(&worker).with_domain(&domain);
        let contract = NamedContract::SignupRequest.contract();

        let overrides = if with_confirmation {
            PayloadOverrides::default().with_confirmation()
        } else {
            PayloadOverrides::default()
        };
        let payload = factory.signup_payload(overrides).unwrap();
        let body = serde_json::to_value(&payload).unwrap();
        let violations = validate(&body, &contract);
        prop_assert!(violations.is_empty(), "{:?}", violations);

        let localized = factory
            .signup_payload(PayloadOverrides::default().name(factory.random_name_in(locale).unwrap()))
            .unwrap();
        let body = serde_json::to_value(&localized).unwrap();
        let violations = validate(&body, &contract);
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }

    /// Every password carries all four character classes.
    #[test]
    fn prop_password_has_every_class(length in password_length_strategy()) {
        let password = DataFactory::default().random_password(length).unwrap();
        prop_assert_eq!(password.len(), length.max(4));
        prop_assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        prop_assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        prop_assert!(password.chars().any(|c| c.is_ascii_digit()));
        prop_assert!(password.chars().any(|c| "!@#$%^&*".contains(c)));
    }

    /// `invalid_payload` changes exactly the requested field.
    #[test]
    fn prop_invalid_payload_replaces_only_target(field in payload_field_strategy()) {
        let payload = DataFactory::default().invalid_payload(field, "bad value").unwrap();
        prop_assert_eq!(payload.get(field), Some("bad value"));
        for other in [PayloadField::Name, PayloadField::Email, PayloadField::Password] {
            if other != field {
                prop_assert_ne!(payload.get(other), Some("bad value"));
            }
        }
    }
}

/// Ten thousand emails drawn concurrently by eight workers never collide.
#[test]
fn concurrent_workers_never_collide() {
    const WORKERS: usize = 8;
    const PER_WORKER: usize = 1250;

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            thread::spawn(move || {
                let factory = DataFactory::new(format!("gw{worker}"));
                (0..PER_WORKER)
                    .map(|_| factory.unique_email().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for email in handle.join().unwrap() {
            assert!(all.insert(email.clone()), "duplicate email {email}");
        }
    }
    assert_eq!(all.len(), WORKERS * PER_WORKER);
}

/// Workers sharing one id still never collide inside a process.
#[test]
fn shared_worker_id_never_collides() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(|| {
                let factory = DataFactory::new("shared");
                (0..2500)
                    .map(|_| factory.unique_email().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }
    assert_eq!(all.len(), 10_000);
}

/// Payloads built from the same factory carry distinct emails.
#[test]
fn payloads_carry_distinct_emails() {
    let factory = DataFactory::new("gw0");
    let emails: HashSet<_> = (0..1000)
        .map(|_| {
            factory
                .signup_payload(PayloadOverrides::default())
                .unwrap()
                .email
        })
        .collect();
    assert_eq!(emails.len(), 1000);
}
