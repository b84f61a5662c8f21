//! Qualified test paths (`suite/.../test`)

use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedPath {
    suites: Vec<String>,
    test: String,
}

impl QualifiedPath {
    /// Parse `suite/.../test`; at least one `/` is required
    pub fn parse(text: &str) -> Result<Self> {
        let Some((suites, test)) = text.rsplit_once('/') else {
            return Err(Error::InvalidTestName(text.to_string()));
        };

        Ok(Self {
            suites: suites.split('/').map(str::to_string).collect(),
            test: test.to_string(),
        })
    }

    /// Suite names from the root down
    pub fn suites(&self) -> &[String] {
        &self.suites
    }

    pub fn suite_path(&self) -> String {
        self.suites.join("/")
    }

    pub fn test(&self) -> &str {
        &self.test
    }

    /// Check if a suite at `prefix` (root first) could contain this test
    pub fn could_contain<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        prefix.len() <= self.suites.len()
            && prefix
                .iter()
                .zip(&self.suites)
                .all(|(segment, suite)| segment.as_ref() == suite)
    }

    /// Check if this is exactly the test `name` inside the suite at `suites`
    pub fn matches<S: AsRef<str>>(&self, suites: &[S], name: &str) -> bool {
        suites.len() == self.suites.len() && self.could_contain(suites) && name == self.test
    }
}

impl fmt::Display for QualifiedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.suite_path(), self.test)
    }
}
