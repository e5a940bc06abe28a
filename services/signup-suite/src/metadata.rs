//! Test classification metadata.
//!
//! Tags are declared next to each test (and once per group) and folded into a
//! single [`TestClassification`] before the run starts. Each tag writes one or
//! more facets; writing the same facet twice is an [`ClassificationError::Ambiguous`]
//! error, so a suite with conflicting tags never runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Test category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Quick checks of the happy path of each endpoint
    Smoke,
    /// Input validation
    Validation,
    /// Regression coverage
    Regression,
    /// Security-related behavior
    Security,
}

impl Category {
    /// Every category.
    pub const ALL: [Self; 4] = [Self::Smoke, Self::Validation, Self::Regression, Self::Security];

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Validation => "validation",
            Self::Regression => "regression",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ClassificationError::UnknownCategory(s.to_string()))
    }
}

/// Severity of a test's subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the product
    Blocker,
    /// Breaks a core flow
    Critical,
    /// Ordinary defect
    Normal,
    /// Minor defect
    Minor,
    /// Cosmetic
    Trivial,
}

impl Severity {
    /// Parse a label case-insensitively; unknown labels map to [`Severity::Normal`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "BLOCKER" => Self::Blocker,
            "CRITICAL" => Self::Critical,
            "MINOR" => Self::Minor,
            "TRIVIAL" => Self::Trivial,
            _ => Self::Normal,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocker => "blocker",
            Self::Critical => "critical",
            Self::Normal => "normal",
            Self::Minor => "minor",
            Self::Trivial => "trivial",
        }
    }
}

/// Independently settable parts of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// `category` (and the title that comes with it)
    Category,
    /// `severity`
    Severity,
    /// `feature` and `story`
    FeatureStory,
    /// `validation_field` and `validation_type`
    Validation,
    /// `bug_id` and `bug_reason`
    KnownBug,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::Severity => "severity",
            Self::FeatureStory => "feature/story",
            Self::Validation => "validation field",
            Self::KnownBug => "known bug",
        })
    }
}

/// Classification errors, all raised while the suite is being collected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// Two tags on one test set the same facet
    #[error("Ambiguous classification for {test_id}: {facet} declared more than once")]
    Ambiguous {
        /// Test carrying the conflicting tags
        test_id: String,
        /// Facet written twice
        facet: Facet,
    },

    /// Two tests share an id
    #[error("Duplicate test id: {0}")]
    DuplicateTest(String),

    /// Category label not recognized
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// One declarative tag on a test or a group of tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Smoke check of one endpoint: category smoke, severity critical,
    /// title `"<METHOD> <endpoint>"`.
    Smoke {
        /// HTTP method
        method: String,
        /// Endpoint path
        endpoint: String,
    },
    /// Validation check: category validation, title `"Validate <field> - <type>"`.
    Validation {
        /// Field under validation
        field: String,
        /// Kind of validation
        validation_type: String,
    },
    /// Regression check with a severity.
    Regression {
        /// Display title
        title: Option<String>,
        /// Severity
        severity: Severity,
    },
    /// Security-related behavior.
    Security,
    /// Known product bug: the test is expected to fail.
    KnownBug {
        /// Tracker id
        bug_id: String,
        /// Why the test fails
        reason: String,
    },
    /// Feature and story labels.
    FeatureStory {
        /// Feature
        feature: String,
        /// Story
        story: String,
    },
}

impl Tag {
    /// `api_smoke(method, endpoint)`.
    #[must_use]
    pub fn smoke(method: &str, endpoint: &str) -> Self {
        Self::Smoke {
            method: method.to_ascii_uppercase(),
            endpoint: endpoint.to_string(),
        }
    }

    /// `validation_test(field, type)`.
    #[must_use]
    pub fn validation(field: &str, validation_type: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            validation_type: validation_type.to_string(),
        }
    }

    /// `regression_test(title, severity)`; unknown severities map to normal.
    #[must_use]
    pub fn regression(title: Option<&str>, severity: &str) -> Self {
        Self::Regression {
            title: title.map(str::to_string),
            severity: Severity::from_label(severity),
        }
    }

    /// `known_bug(bug_id, reason)`.
    #[must_use]
    pub fn known_bug(bug_id: &str, reason: &str) -> Self {
        Self::KnownBug {
            bug_id: bug_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// `feature_story(feature, story)`.
    #[must_use]
    pub fn feature_story(feature: &str, story: &str) -> Self {
        Self::FeatureStory {
            feature: feature.to_string(),
            story: story.to_string(),
        }
    }
}

/// Merged classification of one test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestClassification {
    /// Category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Severity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Feature label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    /// Story label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    /// Field under validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_field: Option<String>,
    /// Kind of validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_type: Option<String>,
    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Known bug id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bug_id: Option<String>,
    /// Known bug reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bug_reason: Option<String>,
}

impl TestClassification {
    /// Whether failure is the expected outcome.
    #[must_use]
    pub const fn is_known_bug(&self) -> bool {
        self.bug_id.is_some()
    }

    /// `"Known Bug [<id>]: <reason>"` for known-bug tests.
    #[must_use]
    pub fn xfail_reason(&self) -> Option<String> {
        self.bug_id.as_ref().map(|id| {
            format!(
                "Known Bug [{id}]: {}",
                self.bug_reason.as_deref().unwrap_or_default()
            )
        })
    }

    /// Fold one tag into the record.
    ///
    /// # Errors
    ///
    /// Returns the facet that was already set.
    pub fn apply(mut self, tag: &Tag) -> Result<Self, Facet> {
        match tag {
            Tag::Smoke { method, endpoint } => {
                self.set_category(Category::Smoke)?;
                self.set_severity(Severity::Critical)?;
                self.title = Some(format!("{method} {endpoint}"));
            }
            Tag::Validation {
                field,
                validation_type,
            } => {
                self.set_category(Category::Validation)?;
                if self.validation_field.is_some() {
                    return Err(Facet::Validation);
                }
                self.validation_field = Some(field.clone());
                self.validation_type = Some(validation_type.clone());
                self.title = Some(format!("Validate {field} - {validation_type}"));
            }
            Tag::Regression { title, severity } => {
                self.set_category(Category::Regression)?;
                self.set_severity(*severity)?;
                if title.is_some() {
                    self.title.clone_from(title);
                }
            }
            Tag::Security => self.set_category(Category::Security)?,
            Tag::KnownBug { bug_id, reason } => {
                if self.bug_id.is_some() {
                    return Err(Facet::KnownBug);
                }
                self.bug_id = Some(bug_id.clone());
                self.bug_reason = Some(reason.clone());
            }
            Tag::FeatureStory { feature, story } => {
                if self.feature.is_some() {
                    return Err(Facet::FeatureStory);
                }
                self.feature = Some(feature.clone());
                self.story = Some(story.clone());
            }
        }
        Ok(self)
    }

    fn set_category(&mut self, category: Category) -> Result<(), Facet> {
        if self.category.is_some() {
            return Err(Facet::Category);
        }
        self.category = Some(category);
        Ok(())
    }

    fn set_severity(&mut self, severity: Severity) -> Result<(), Facet> {
        if self.severity.is_some() {
            return Err(Facet::Severity);
        }
        self.severity = Some(severity);
        Ok(())
    }
}

/// Fold a test's tags into its classification.
///
/// Group tags come first, then the test's own. A test whose id mentions
/// `security` and declares no category is classified as security.
///
/// # Errors
///
/// Returns [`ClassificationError::Ambiguous`] when two tags set the same facet.
pub fn classify<'a>(
    test_id: &str,
    tags: impl IntoIterator<Item = &'a Tag>,
) -> Result<TestClassification, ClassificationError> {
    let mut record = tags
        .into_iter()
        .try_fold(TestClassification::default(), TestClassification::apply)
        .map_err(|facet| ClassificationError::Ambiguous {
            test_id: test_id.to_string(),
            facet,
        })?;

    if record.category.is_none() && test_id.to_ascii_lowercase().contains("security") {
        record.category = Some(Category::Security);
    }
    Ok(record)
}

/// Classifications of every collected test, keyed by test id.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entries: BTreeMap<String, TestClassification>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and register a test.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::DuplicateTest`] for a repeated id and
    /// [`ClassificationError::Ambiguous`] for conflicting tags.
    pub fn register<'a>(
        &mut self,
        test_id: &str,
        tags: impl IntoIterator<Item = &'a Tag>,
    ) -> Result<&TestClassification, ClassificationError> {
        if self.entries.contains_key(test_id) {
            return Err(ClassificationError::DuplicateTest(test_id.to_string()));
        }
        let record = classify(test_id, tags)?;
        Ok(self.entries.entry(test_id.to_string()).or_insert(record))
    }

    /// Classification of a registered test.
    #[must_use]
    pub fn classification_of(&self, test_id: &str) -> Option<&TestClassification> {
        self.entries.get(test_id)
    }

    /// Number of registered tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no test is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tests in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestClassification)> {
        self.entries.iter().map(|(id, c)| (id.as_str(), c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_tag() {
        let record = classify("test_verify_otp_success", &[Tag::smoke(
            "post",
            "/api/authentication/signup/confirm/",
        )])
        .unwrap();
        assert_eq!(record.category, Some(Category::Smoke));
        assert_eq!(record.severity, Some(Severity::Critical));
        assert_eq!(
            record.title.as_deref(),
            Some("POST /api/authentication/signup/confirm/")
        );
    }

    #[test]
    fn test_validation_tag() {
        let record = classify("t", &[Tag::validation("confirmation_code", "invalid OTP")]).unwrap();
        assert_eq!(record.category, Some(Category::Validation));
        assert_eq!(record.validation_field.as_deref(), Some("confirmation_code"));
        assert_eq!(
            record.title.as_deref(),
            Some("Validate confirmation_code - invalid OTP")
        );
    }

    #[test]
    fn test_different_facets_merge() {
        let tags = [
            Tag::feature_story("Authentication", "User Registration"),
            Tag::validation("name", "format"),
            Tag::known_bug("API-001", "API accepts invalid names"),
        ];
        let record = classify("test_name_validation[Ab]", &tags).unwrap();
        assert_eq!(record.feature.as_deref(), Some("Authentication"));
        assert_eq!(record.category, Some(Category::Validation));
        assert!(record.is_known_bug());
        assert_eq!(
            record.xfail_reason().as_deref(),
            Some("Known Bug [API-001]: API accepts invalid names")
        );
    }

    #[test]
    fn test_same_facet_is_ambiguous() {
        let tags = [Tag::smoke("POST", "/x"), Tag::regression(None, "NORMAL")];
        let err = classify("test_x", &tags).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::Ambiguous {
                test_id: "test_x".to_string(),
                facet: Facet::Category,
            }
        );

        let tags = [Tag::known_bug("A", "a"), Tag::known_bug("B", "b")];
        assert!(matches!(
            classify("t", &tags),
            Err(ClassificationError::Ambiguous { facet: Facet::KnownBug, .. })
        ));

        let tags = [Tag::feature_story("A", "a"), Tag::feature_story("B", "b")];
        assert!(matches!(
            classify("t", &tags),
            Err(ClassificationError::Ambiguous { facet: Facet::FeatureStory, .. })
        ));
    }

    #[test]
    fn test_regression_severity_labels() {
        assert_eq!(Severity::from_label("blocker"), Severity::Blocker);
        assert_eq!(Severity::from_label("TRIVIAL"), Severity::Trivial);
        assert_eq!(Severity::from_label("urgent"), Severity::Normal);

        let record = classify("t", &[Tag::regression(Some("Rate limit"), "CRITICAL")]).unwrap();
        assert_eq!(record.severity, Some(Severity::Critical));
        assert_eq!(record.title.as_deref(), Some("Rate limit"));
    }

    #[test]
    fn test_security_auto_tag() {
        let record = classify("test_security_headers", &[] as &[Tag]).unwrap();
        assert_eq!(record.category, Some(Category::Security));

        let record = classify("test_security_smoke", &[Tag::smoke("POST", "/x")]).unwrap();
        assert_eq!(record.category, Some(Category::Smoke));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(" Smoke ".parse::<Category>().unwrap(), Category::Smoke);
        assert!(matches!(
            "performance".parse::<Category>(),
            Err(ClassificationError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_registry() {
        let mut registry = MetadataRegistry::new();
        registry.register("a", &[Tag::Security]).unwrap();
        assert!(matches!(
            registry.register("a", &[] as &[Tag]),
            Err(ClassificationError::DuplicateTest(_))
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.classification_of("a").and_then(|c| c.category),
            Some(Category::Security)
        );
        assert!(registry.classification_of("b").is_none());
    }
}
