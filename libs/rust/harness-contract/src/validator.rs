//! Generic contract validator.

use crate::contract::{Contract, FieldKind, FieldSpec};
use harness_common::Retryable;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

const MAX_ACTUAL_LEN: usize = 60;

/// A single mismatch between a body and its contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractViolation {
    /// Dotted path to the field, e.g. `data.user_confirmed` or `errors[0].message`
    pub field_path: String,
    /// What the contract expects
    pub expected: String,
    /// What the body contains
    pub actual: String,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field_path, self.expected, self.actual
        )
    }
}

/// Aggregate contract failure listing every violation found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render(self))]
pub struct ContractFailure {
    /// Contract that was checked
    pub contract: String,
    /// Caller-supplied context, e.g. the operation under test
    pub context: Option<String>,
    /// All violations, in validation order
    pub violations: Vec<ContractViolation>,
}

fn render(failure: &ContractFailure) -> String {
    let mut message = failure
        .context
        .as_ref()
        .map(|context| format!("{context}: "))
        .unwrap_or_default();
    message.push_str(&format!(
        "response violates contract '{}' ({} violation{})",
        failure.contract,
        failure.violations.len(),
        if failure.violations.len() == 1 { "" } else { "s" }
    ));
    for violation in &failure.violations {
        message.push_str(&format!("\n  - {violation}"));
    }
    message
}

impl Retryable for ContractFailure {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Validate `body` against `contract`, returning every violation found.
///
/// The result is empty when the body complies. Identical inputs always yield
/// the identical sequence.
#[must_use]
pub fn validate(body: &Value, contract: &Contract) -> Vec<ContractViolation> {
    let mut violations = Vec::new();
    match body {
        Value::Object(map) => validate_object(map, contract, "", &mut violations),
        other => violations.push(ContractViolation {
            field_path: "$".to_string(),
            expected: format!("object ({})", contract.name),
            actual: describe_value(other),
        }),
    }
    violations
}

/// Validate and fail with the full violation list when non-compliant.
///
/// # Errors
///
/// Returns a [`ContractFailure`] carrying every violation when the body does
/// not satisfy the contract.
pub fn assert_contract(
    body: &Value,
    contract: &Contract,
    context: Option<&str>,
) -> Result<(), ContractFailure> {
    let violations = validate(body, contract);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ContractFailure {
            contract: contract.name.clone(),
            context: context.map(str::to_string),
            violations,
        })
    }
}

fn validate_object(
    map: &Map<String, Value>,
    contract: &Contract,
    prefix: &str,
    out: &mut Vec<ContractViolation>,
) {
    for spec in &contract.fields {
        let path = join_path(prefix, &spec.name);
        match map.get(&spec.name) {
            None if spec.required => out.push(ContractViolation {
                field_path: path,
                expected: spec.kind.describe(),
                actual: "missing".to_string(),
            }),
            None => {}
            Some(value) => check_field(value, spec, &path, out),
        }
    }

    for (field, other) in &contract.equal_fields {
        let Some(value) = map.get(field) else {
            continue;
        };
        if map.get(other) != Some(value) {
            out.push(ContractViolation {
                field_path: join_path(prefix, field),
                expected: format!("same value as {other}"),
                actual: describe_value(value),
            });
        }
    }

    if !contract.allow_extra {
        for key in map.keys() {
            if contract.field_spec(key).is_none() {
                out.push(ContractViolation {
                    field_path: join_path(prefix, key),
                    expected: "no such field".to_string(),
                    actual: describe_value(&map[key]),
                });
            }
        }
    }
}

fn check_field(value: &Value, spec: &FieldSpec, path: &str, out: &mut Vec<ContractViolation>) {
    if value.is_null() && spec.nullable {
        return;
    }
    check_kind(value, &spec.kind, path, out);
}

fn check_kind(value: &Value, kind: &FieldKind, path: &str, out: &mut Vec<ContractViolation>) {
    let matches = match (kind, value) {
        (FieldKind::Any, _)
        | (FieldKind::Boolean, Value::Bool(_))
        | (FieldKind::String, Value::String(_))
        | (FieldKind::Number, Value::Number(_)) => true,
        (FieldKind::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (
            FieldKind::BoundedString {
                min,
                max,
                forbid_digits,
            },
            Value::String(s),
        ) => {
            let length = s.chars().count();
            length >= *min
                && max.is_none_or(|max| length <= max)
                && !(*forbid_digits && s.chars().any(char::is_numeric))
        }
        (FieldKind::Email, Value::String(s)) => EMAIL_PATTERN.is_match(s),
        (FieldKind::OneOf { values }, Value::String(s)) => values.iter().any(|v| v == s),
        (FieldKind::Const { value: expected }, actual) => expected == actual,
        (FieldKind::Object { contract }, Value::Object(map)) => {
            validate_object(map, contract, path, out);
            true
        }
        (FieldKind::ArrayOf { items }, Value::Array(elements)) => {
            for (i, element) in elements.iter().enumerate() {
                check_kind(element, items, &format!("{path}[{i}]"), out);
            }
            true
        }
        _ => false,
    };

    if !matches {
        out.push(ContractViolation {
            field_path: path.to_string(),
            expected: kind.describe(),
            actual: describe_value(value),
        });
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) if n.is_i64() || n.is_u64() => format!("integer {n}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.chars().count() > MAX_ACTUAL_LEN => {
            let truncated: String = s.chars().take(MAX_ACTUAL_LEN).collect();
            format!("string \"{truncated}...\"")
        }
        Value::String(s) => format!("string \"{s}\""),
        Value::Array(items) => format!("array of {} element(s)", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_contract() -> Contract {
        Contract::new("sample")
            .required("error", FieldKind::Boolean)
            .required("code", FieldKind::one_of(["UserCreated"]))
            .optional(
                "data",
                FieldKind::object(Contract::new("data").required("user_confirmed", FieldKind::Boolean)),
            )
    }

    #[test]
    fn test_valid_body_has_no_violations() {
        let body = json!({"error": false, "code": "UserCreated", "data": {"user_confirmed": false}});
        assert!(validate(&body, &sample_contract()).is_empty());
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let body = json!({"code": "UserCreated"});
        let violations = validate(&body, &sample_contract());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field_path, "error");
        assert_eq!(violations[0].actual, "missing");
    }

    #[test]
    fn test_all_violations_are_reported() {
        let body = json!({"error": "no", "code": "Created", "data": {"user_confirmed": 1}});
        let violations = validate(&body, &sample_contract());
        let paths: Vec<_> = violations.iter().map(|v| v.field_path.as_str()).collect();
        assert_eq!(paths, ["error", "code", "data.user_confirmed"]);
        assert_eq!(violations[0].expected, "boolean");
        assert_eq!(violations[0].actual, "string \"no\"");
    }

    #[test]
    fn test_nullable_optional_field_accepts_null() {
        let body = json!({"error": false, "code": "UserCreated", "data": null});
        assert!(validate(&body, &sample_contract()).is_empty());
    }

    #[test]
    fn test_array_elements_are_validated_with_index() {
        let contract = Contract::new("errors").required(
            "errors",
            FieldKind::array_of(FieldKind::object(
                Contract::new("detail").required("message", FieldKind::String),
            )),
        );
        let body = json!({"errors": [{"message": "ok"}, {"field": "email"}]});
        let violations = validate(&body, &contract);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field_path, "errors[1].message");
    }

    #[test]
    fn test_extra_fields_rejected_when_denied() {
        let contract = Contract::new("strict")
            .required("error", FieldKind::Boolean)
            .deny_extra();
        let violations = validate(&json!({"error": true, "debug": "trace"}), &contract);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field_path, "debug");
        assert_eq!(violations[0].expected, "no such field");
    }

    #[test]
    fn test_non_object_body() {
        let violations = validate(&json!("Internal Server Error"), &sample_contract());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field_path, "$");
    }

    #[test]
    fn test_email_and_integer_kinds() {
        let contract = Contract::new("kinds")
            .required("email", FieldKind::Email)
            .required("status_code", FieldKind::Integer);
        assert!(validate(&json!({"email": "a@b.co", "status_code": 400}), &contract).is_empty());
        let violations = validate(&json!({"email": "a-b.co", "status_code": 400.5}), &contract);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].actual, "number 400.5");
    }

    #[test]
    fn test_assert_contract_lists_every_violation() {
        let body = json!({"error": "no", "code": "Created"});
        let failure = assert_contract(&body, &sample_contract(), Some("signup")).unwrap_err();
        assert_eq!(failure.violations.len(), 2);

        let message = failure.to_string();
        assert!(message.starts_with("signup: response violates contract 'sample' (2 violations)"));
        assert!(message.contains("error: expected boolean, got string \"no\""));
        assert!(message.contains("code: expected one of [UserCreated], got string \"Created\""));
        assert!(!failure.is_retryable());
    }

    #[test]
    fn test_bounded_string_kind() {
        let contract = Contract::new("lengths")
            .required("name", FieldKind::bounded_string(3, Some(5)).without_digits())
            .required("password", FieldKind::bounded_string(8, None));

        let ok = json!({"name": "Anna", "password": "Secret1!"});
        assert!(validate(&ok, &contract).is_empty());

        for name in ["Al", "Annabel", "Ann4"] {
            let violations = validate(&json!({"name": name, "password": "Secret1!"}), &contract);
            assert_eq!(violations.len(), 1, "{name}");
            assert_eq!(violations[0].expected, "string of 3 to 5 characters without digits");
        }
        let violations = validate(&json!({"name": "Anna", "password": "short"}), &contract);
        assert_eq!(violations[0].field_path, "password");
    }

    #[test]
    fn test_equal_fields() {
        let contract = Contract::new("confirm")
            .required("password", FieldKind::String)
            .optional("confirm_password", FieldKind::String)
            .equal("confirm_password", "password");

        assert!(validate(&json!({"password": "a"}), &contract).is_empty());
        assert!(validate(&json!({"password": "a", "confirm_password": "a"}), &contract).is_empty());

        let violations = validate(&json!({"password": "a", "confirm_password": "b"}), &contract);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field_path, "confirm_password");
        assert_eq!(violations[0].expected, "same value as password");
    }

    #[test]
    fn test_single_violation_message() {
        let failure = assert_contract(&json!({"code": "UserCreated"}), &sample_contract(), None)
            .unwrap_err();
        assert_eq!(
            failure.to_string(),
            "response violates contract 'sample' (1 violation)\n  - error: expected boolean, got missing"
        );
    }

    #[test]
    fn test_long_strings_are_truncated() {
        let long = "x".repeat(200);
        assert!(describe_value(&json!(long)).ends_with("...\""));
    }
}
