//! Suite tree nodes

use crate::testcase::TestCase;

/// Named, ordered container of test cases and nested suites
///
/// Insertion order is run order. A suite is addressed from the outside by its
/// slash-joined path from the root, e.g. `parent/child`.
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    tests: Vec<TestCase>,
    suites: Vec<Suite>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
            suites: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Test cases directly in this suite, in registration order
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Sub-suites, in registration order
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Direct sub-suite by name
    pub fn child(&self, name: &str) -> Option<&Suite> {
        self.suites.iter().find(|suite| suite.name == name)
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut Suite> {
        self.suites.iter_mut().find(|suite| suite.name == name)
    }

    /// Direct test case by name
    pub fn test(&self, name: &str) -> Option<&TestCase> {
        self.tests.iter().find(|test| test.name() == name)
    }

    /// Append a test case without any duplicate checking
    ///
    /// Use [`SuiteRegistry::register_test`](crate::SuiteRegistry::register_test)
    /// for checked registration.
    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Append a sub-suite without any duplicate checking
    pub fn add_suite(&mut self, suite: Suite) {
        self.suites.push(suite);
    }

    /// Number of test cases in this suite and all of its descendants
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(Suite::test_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_tree() {
        let mut child = Suite::new("child");
        child.add_test(TestCase::new("inner", || Ok(())));

        let mut parent = Suite::new("parent");
        parent.add_test(TestCase::new("first", || Ok(())));
        parent.add_test(TestCase::new("second", || Ok(())));
        parent.add_suite(child);

        assert_eq!(parent.name(), "parent");
        assert_eq!(
            parent.tests().iter().map(TestCase::name).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        assert!(parent.child("child").is_some());
        assert!(parent.child("missing").is_none());
        assert!(parent.test("second").is_some());
        assert_eq!(parent.test_count(), 3);
    }
}
