//! Test case definitions.

use crate::error::TestFailure;
use crate::metadata::Tag;
use futures::future::BoxFuture;
use harness_client::ApiClient;
use harness_data::DataFactory;
use std::fmt;
use std::sync::Arc;

/// Result of one test attempt.
pub type TestResult = Result<(), TestFailure>;

/// Future returned by a test body.
pub type TestFuture<'a> = BoxFuture<'a, TestResult>;

/// Executable body of a test case.
pub type TestBody = Arc<dyn for<'a> Fn(&'a TestContext<'a>) -> TestFuture<'a> + Send + Sync>;

/// What a test attempt gets to work with.
///
/// Borrowed from the worker session for the duration of one attempt.
#[derive(Debug, Clone, Copy)]
pub struct TestContext<'a> {
    /// The session's API client
    pub client: &'a ApiClient,
    /// The session's data factory
    pub data: &'a DataFactory,
    /// Id of the running test
    pub test_id: &'a str,
    /// 1-based attempt number
    pub attempt: u32,
}

/// A single test case.
#[derive(Clone)]
pub struct TestCase {
    /// Unique id, e.g. `test_name_validation[Ab]`
    pub id: String,
    /// Tags declared on the test itself
    pub tags: Vec<Tag>,
    /// Body executed for each attempt
    pub body: TestBody,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl TestCase {
    /// Create a test case.
    pub fn new<F>(id: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a TestContext<'a>) -> TestFuture<'a> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            tags: Vec::new(),
            body: Arc::new(body),
        }
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

/// A named group of tests sharing group-level tags.
#[derive(Debug, Clone)]
pub struct TestGroup {
    /// Group name, e.g. `TestSignupVerification`
    pub name: String,
    /// Tags merged into every member
    pub tags: Vec<Tag>,
    /// Members
    pub cases: Vec<TestCase>,
}

impl TestGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            cases: Vec::new(),
        }
    }

    /// Add a group-level tag.
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Add a test case.
    #[must_use]
    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Add one case per parameter, with ids `"<id>[<label>]"`.
    #[must_use]
    pub fn parametrized<P, F>(mut self, id: &str, tags: &[Tag], params: Vec<(String, P)>, body: F) -> Self
    where
        P: Clone + Send + Sync + 'static,
        F: for<'a> Fn(&'a TestContext<'a>, P) -> TestFuture<'a> + Clone + Send + Sync + 'static,
    {
        for (label, param) in params {
            let body = body.clone();
            let mut case = TestCase::new(format!("{id}[{label}]"), move |ctx| {
                body(ctx, param.clone())
            });
            case.tags = tags.to_vec();
            self.cases.push(case);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_parametrized_ids() {
        let group = TestGroup::new("TestSignup")
            .tag(Tag::feature_story("Authentication", "User Registration"))
            .parametrized(
                "test_public_domains",
                &[Tag::validation("email", "public domain")],
                vec![
                    ("gmail.com".to_string(), "gmail.com"),
                    ("yahoo.com".to_string(), "yahoo.com"),
                ],
                |_ctx, _domain| async { TestResult::Ok(()) }.boxed(),
            );

        let ids: Vec<_> = group.cases.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            ["test_public_domains[gmail.com]", "test_public_domains[yahoo.com]"]
        );
        assert_eq!(group.cases[0].tags.len(), 1);
        assert_eq!(group.tags.len(), 1);
    }
}
