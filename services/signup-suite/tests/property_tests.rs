//! Property-based tests for classification and run summaries.
//!
//! Uses proptest with 100 iterations per property.

use proptest::prelude::*;
use signup_suite::metadata::{Facet, classify};
use signup_suite::{Category, ClassificationError, Outcome, RunSummary, Severity, Tag};

fn severity_label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("BLOCKER".to_string()),
        Just("critical".to_string()),
        Just("Normal".to_string()),
        Just("minor".to_string()),
        Just("TRIVIAL".to_string()),
        "[a-z]{1,10}",
    ]
}

fn category_tag_strategy() -> impl Strategy<Value = Tag> {
    prop_oneof![
        ("[A-Z]{3,6}", "/[a-z/]{1,20}").prop_map(|(m, e)| Tag::smoke(&m, &e)),
        ("[a-z_]{1,12}", "[a-z ]{1,12}").prop_map(|(f, t)| Tag::validation(&f, &t)),
        severity_label_strategy().prop_map(|s| Tag::regression(None, &s)),
        Just(Tag::Security),
    ]
}

fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Passed),
        Just(Outcome::Failed),
        Just(Outcome::XFailed),
        Just(Outcome::XPassed),
        Just(Outcome::NotRun),
        Just(Outcome::Deselected),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Two category-setting tags on one test are always ambiguous.
    #[test]
    fn two_category_tags_conflict(a in category_tag_strategy(), b in category_tag_strategy()) {
        let result = classify("test_x", &[a, b]);
        let is_category_conflict = matches!(
            result,
            Err(ClassificationError::Ambiguous { facet: Facet::Category, .. })
        );
        prop_assert!(is_category_conflict);
    }

    /// Facets from different groups merge in any order.
    #[test]
    fn distinct_facets_merge_in_any_order(
        tag in category_tag_strategy(),
        bug in "[A-Z]{3}-[0-9]{3}",
        reverse in any::<bool>(),
    ) {
        let mut tags = vec![
            tag,
            Tag::known_bug(&bug, "reason"),
            Tag::feature_story("Authentication", "Resend OTP"),
        ];
        if reverse {
            tags.reverse();
        }

        let record = classify("test_x", &tags).unwrap();
        prop_assert!(record.category.is_some());
        prop_assert!(record.is_known_bug());
        prop_assert_eq!(record.story.as_deref(), Some("Resend OTP"));
    }

    /// Unknown severity labels fall back to normal.
    #[test]
    fn unknown_severity_is_normal(label in "[a-z]{1,10}") {
        let known = ["blocker", "critical", "normal", "minor", "trivial"];
        prop_assume!(!known.contains(&label.as_str()));
        prop_assert_eq!(Severity::from_label(&label), Severity::Normal);
    }

    /// Category labels parse regardless of case.
    #[test]
    fn category_labels_parse_case_insensitively(index in 0..4usize, upper in any::<bool>()) {
        let category = Category::ALL[index];
        let label = if upper {
            category.as_str().to_ascii_uppercase()
        } else {
            category.as_str().to_string()
        };
        prop_assert_eq!(label.parse::<Category>().unwrap(), category);
    }

    /// Merging per-worker summaries matches recording everything in one.
    #[test]
    fn merged_summaries_match_single_summary(
        outcomes in prop::collection::vec(outcome_strategy(), 0..60),
        workers in 1..6usize,
    ) {
        let mut single = RunSummary::default();
        let mut parts = vec![RunSummary::default(); workers];
        for (i, outcome) in outcomes.iter().enumerate() {
            single.record(*outcome);
            parts[i % workers].record(*outcome);
        }

        let mut merged = RunSummary::default();
        for part in parts {
            merged.merge(part);
        }

        prop_assert_eq!(&merged, &single);
        prop_assert_eq!(merged.total, outcomes.len());
        prop_assert_eq!(merged.is_success(), !outcomes.contains(&Outcome::Failed));
    }
}
