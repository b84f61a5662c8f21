//! Suite registry - builds the suite tree from path strings
//!
//! Registration happens once at startup, from a list of [`Definition`]
//! functions. The runner only ever sees the finished, immutable tree.
//!
//! Invariants:
//! - every registered suite path is unique; re-registering one is a no-op
//! - a sub-suite can only be added under an already registered path
//! - test names are unique within their suite

use crate::assertion::Outcome;
use crate::suite::Suite;
use crate::testcase::TestCase;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tried to add a suite to a non-existent parent suite `{parent}`")]
    UnknownParent { parent: String },

    #[error("tried to add a test case to a non-existent suite `{path}`")]
    UnknownSuite { path: String },

    #[error("duplicate test case `{test}` in suite `{suite}`")]
    DuplicateTestcase { suite: String, test: String },

    #[error("invalid name `{name}`: names must be non-empty and may not contain `/`")]
    InvalidName { name: String },
}

/// A source of suites and tests, run once at startup
pub type Definition = fn(&mut SuiteRegistry) -> Result<(), RegistryError>;

/// Root collection of suites
#[derive(Debug, Default)]
pub struct SuiteRegistry {
    suites: Vec<Suite>,
    paths: HashSet<String>,
    test_names: HashMap<String, HashSet<String>>,
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() || name.contains('/') {
        return Err(RegistryError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry by running every definition in order
    pub fn from_definitions(definitions: &[Definition]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for definition in definitions {
            definition(&mut registry)?;
        }
        Ok(registry)
    }

    /// Root suites, in registration order
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Check if a suite path was registered
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Look up a suite by its slash-joined path
    pub fn find(&self, path: &str) -> Option<&Suite> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut suite = self.suites.iter().find(|suite| suite.name() == first)?;
        for segment in segments {
            suite = suite.child(segment)?;
        }
        Some(suite)
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut Suite> {
        let mut segments = path.split('/');
        let first = segments.next()?;
        let mut suite = self.suites.iter_mut().find(|suite| suite.name() == first)?;
        for segment in segments {
            suite = suite.child_mut(segment)?;
        }
        Some(suite)
    }

    /// Number of registered test cases across the whole tree
    pub fn test_count(&self) -> usize {
        self.suites.iter().map(Suite::test_count).sum()
    }

    /// Add a suite at the root (`parent_path` empty) or under a registered suite
    ///
    /// Registering an already known path is a silent no-op. Tests and
    /// sub-suites already inside `suite` are indexed along with it. The whole
    /// subtree is checked first, so a rejected suite leaves no trace.
    pub fn register_suite(
        &mut self,
        suite: Suite,
        parent_path: &str,
    ) -> Result<(), RegistryError> {
        validate_name(suite.name())?;

        if !parent_path.is_empty() && !self.paths.contains(parent_path) {
            return Err(RegistryError::UnknownParent {
                parent: parent_path.to_string(),
            });
        }

        let path = join(parent_path, suite.name());
        if self.paths.contains(&path) {
            tracing::debug!(suite = %path, "suite already registered");
            return Ok(());
        }

        Self::validate(&suite, &path)?;

        if !parent_path.is_empty() && self.find(parent_path).is_none() {
            return Err(RegistryError::UnknownParent {
                parent: parent_path.to_string(),
            });
        }

        self.index(&suite, &path);
        if parent_path.is_empty() {
            self.suites.push(suite);
        } else if let Some(parent) = self.find_mut(parent_path) {
            parent.add_suite(suite);
        }
        Ok(())
    }

    fn validate(suite: &Suite, path: &str) -> Result<(), RegistryError> {
        let mut names = HashSet::new();
        for test in suite.tests() {
            validate_name(test.name())?;
            if !names.insert(test.name()) {
                return Err(RegistryError::DuplicateTestcase {
                    suite: path.to_string(),
                    test: test.name().to_string(),
                });
            }
        }

        for child in suite.suites() {
            validate_name(child.name())?;
            Self::validate(child, &join(path, child.name()))?;
        }
        Ok(())
    }

    // Only called once `validate` accepted the whole subtree
    fn index(&mut self, suite: &Suite, path: &str) {
        for child in suite.suites() {
            self.index(child, &join(path, child.name()));
        }

        let names = suite.tests().iter().map(|test| test.name().to_string()).collect();
        self.paths.insert(path.to_string());
        self.test_names.insert(path.to_string(), names);
    }

    /// Append a test case to the suite at `path`
    pub fn register_test(&mut self, path: &str, test: TestCase) -> Result<(), RegistryError> {
        validate_name(test.name())?;

        let names = self
            .test_names
            .get_mut(path)
            .ok_or_else(|| RegistryError::UnknownSuite {
                path: path.to_string(),
            })?;

        if names.contains(test.name()) {
            return Err(RegistryError::DuplicateTestcase {
                suite: path.to_string(),
                test: test.name().to_string(),
            });
        }
        names.insert(test.name().to_string());

        match self.find_mut(path) {
            Some(suite) => {
                suite.add_test(test);
                Ok(())
            }
            None => Err(RegistryError::UnknownSuite {
                path: path.to_string(),
            }),
        }
    }

    /// Open (or re-open) a root suite and register its contents
    pub fn suite<F>(&mut self, name: &str, define: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut SuiteScope<'_>) -> Result<(), RegistryError>,
    {
        self.register_suite(Suite::new(name), "")?;
        let mut scope = SuiteScope {
            registry: self,
            path: name.to_string(),
        };
        define(&mut scope)
    }
}

/// Builder handle for the contents of one registered suite
pub struct SuiteScope<'r> {
    registry: &'r mut SuiteRegistry,
    path: String,
}

impl SuiteScope<'_> {
    /// Path of the suite being defined
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open (or re-open) a nested suite
    pub fn suite<F>(&mut self, name: &str, define: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut SuiteScope<'_>) -> Result<(), RegistryError>,
    {
        self.registry.register_suite(Suite::new(name), &self.path)?;
        let mut scope = SuiteScope {
            path: join(&self.path, name),
            registry: &mut *self.registry,
        };
        define(&mut scope)
    }

    pub fn test<F>(&mut self, name: &str, body: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Outcome + Send + Sync + 'static,
    {
        self.registry
            .register_test(&self.path, TestCase::new(name, body))
    }

    /// Register a test that must fail at least one assertion
    pub fn negative_test<F>(&mut self, name: &str, body: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Outcome + Send + Sync + 'static,
    {
        self.registry
            .register_test(&self.path, TestCase::negative(name, body))
    }

    /// Register a test that must fail exactly `count` assertions
    pub fn negative_test_n<F>(
        &mut self,
        name: &str,
        count: usize,
        body: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> Outcome + Send + Sync + 'static,
    {
        self.registry
            .register_test(&self.path, TestCase::negative_n(name, count, body))
    }
}
