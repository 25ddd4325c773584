//! Environment snapshot access.
//!
//! The `ConfigEnv` trait abstracts environment-variable lookup so the build
//! operation can read the live process environment in production and an
//! in-memory snapshot in tests. Nothing here ever writes to the environment.

use std::collections::{BTreeMap, HashMap};

/// Read-only view of environment variables.
///
/// # Example
///
/// ```
/// use typenv::env::{ConfigEnv, MockEnv};
///
/// let env = MockEnv::new().with_env("APP_PORT", "3000");
/// assert_eq!(env.get_env("APP_PORT"), Some("3000".to_string()));
/// assert_eq!(env.get_env("APP_HOST"), None);
/// ```
pub trait ConfigEnv {
    /// Get an environment variable by name.
    ///
    /// Returns `None` if the variable is not set.
    fn get_env(&self, name: &str) -> Option<String>;
}

/// The live process environment.
///
/// Variables whose value is not valid UTF-8 are treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl ConfigEnv for RealEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment for tests and explicit snapshots.
///
/// # Example
///
/// ```
/// use typenv::env::MockEnv;
///
/// let env = MockEnv::new()
///     .with_env("APP_PORT", "8080")
///     .with_envs([("APP_HOST", "example.com"), ("DEBUG", "true")]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    env_vars: HashMap<String, String>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable.
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(name.into(), value.into());
        self
    }

    /// Set multiple environment variables from an iterator.
    pub fn with_envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl ConfigEnv for MockEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        self.env_vars.get(name).cloned()
    }
}

impl ConfigEnv for HashMap<String, String> {
    fn get_env(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl ConfigEnv for BTreeMap<String, String> {
    fn get_env(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
