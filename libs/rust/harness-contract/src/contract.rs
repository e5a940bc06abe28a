//! Contract descriptor types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expected kind of a single field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// JSON boolean
    Boolean,
    /// JSON string
    String,
    /// JSON integer
    Integer,
    /// Any JSON number
    Number,
    /// String whose length in characters lies within bounds
    BoundedString {
        /// Minimum length
        min: usize,
        /// Maximum length, unbounded when absent
        #[serde(default)]
        max: Option<usize>,
        /// Reject strings containing digits
        #[serde(default)]
        forbid_digits: bool,
    },
    /// String in `local@domain.tld` form
    Email,
    /// String restricted to an enumerated set
    OneOf {
        /// Allowed values
        values: Vec<String>,
    },
    /// Exactly this JSON value
    Const {
        /// Expected value
        value: Value,
    },
    /// Nested object validated against its own contract
    Object {
        /// Nested contract
        contract: Contract,
    },
    /// Array whose every element has the given kind
    ArrayOf {
        /// Element kind
        items: Box<FieldKind>,
    },
    /// Any value, presence only
    Any,
}

impl FieldKind {
    /// Enumerated string kind.
    #[must_use]
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Length-bounded string kind.
    #[must_use]
    pub const fn bounded_string(min: usize, max: Option<usize>) -> Self {
        Self::BoundedString {
            min,
            max,
            forbid_digits: false,
        }
    }

    /// Same kind, rejecting digits when it is a bounded string.
    #[must_use]
    pub fn without_digits(self) -> Self {
        match self {
            Self::BoundedString { min, max, .. } => Self::BoundedString {
                min,
                max,
                forbid_digits: true,
            },
            other => other,
        }
    }

    /// Exact value kind.
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Const { value: value.into() }
    }

    /// Nested object kind.
    #[must_use]
    pub const fn object(contract: Contract) -> Self {
        Self::Object { contract }
    }

    /// Array kind.
    #[must_use]
    pub fn array_of(items: Self) -> Self {
        Self::ArrayOf {
            items: Box::new(items),
        }
    }

    /// Human-readable expectation used in violation reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Boolean => "boolean".to_string(),
            Self::String => "string".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Number => "number".to_string(),
            Self::BoundedString {
                min,
                max,
                forbid_digits,
            } => {
                let length = match max {
                    Some(max) => format!("string of {min} to {max} characters"),
                    None => format!("string of at least {min} characters"),
                };
                if *forbid_digits {
                    format!("{length} without digits")
                } else {
                    length
                }
            }
            Self::Email => "email address".to_string(),
            Self::OneOf { values } => format!("one of [{}]", values.join(", ")),
            Self::Const { value } => value.to_string(),
            Self::Object { contract } => format!("object ({})", contract.name),
            Self::ArrayOf { items } => format!("array of {}", items.describe()),
            Self::Any => "any value".to_string(),
        }
    }
}

/// One field of a contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Expected kind
    pub kind: FieldKind,
    /// Whether the field must be present
    #[serde(default)]
    pub required: bool,
    /// Whether `null` is accepted in place of the kind
    #[serde(default)]
    pub nullable: bool,
}

/// A named response shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    /// Contract name
    pub name: String,
    /// Fields in validation order
    pub fields: Vec<FieldSpec>,
    /// Whether fields not listed are tolerated
    #[serde(default = "default_allow_extra")]
    pub allow_extra: bool,
    /// Pairs `(field, other)` whose values must be equal when `field` is present
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equal_fields: Vec<(String, String)>,
}

const fn default_allow_extra() -> bool {
    true
}

impl Contract {
    /// Create an empty contract that tolerates extra fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            allow_extra: true,
            equal_fields: Vec::new(),
        }
    }

    /// Add a required, non-nullable field.
    #[must_use]
    pub fn required(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field(name, kind, true, false)
    }

    /// Add an optional field that may also be `null`.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.field(name, kind, false, true)
    }

    /// Add a field with explicit flags.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        required: bool,
        nullable: bool,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            required,
            nullable,
        });
        self
    }

    /// Require `field`, when present, to hold the same value as `other`.
    #[must_use]
    pub fn equal(mut self, field: impl Into<String>, other: impl Into<String>) -> Self {
        self.equal_fields.push((field.into(), other.into()));
        self
    }

    /// Reject fields not listed in the contract.
    #[must_use]
    pub const fn deny_extra(mut self) -> Self {
        self.allow_extra = false;
        self
    }

    /// Look up a field spec by name.
    #[must_use]
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Parse a contract descriptor from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid descriptor.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
