//! Error types for typenv.
//!
//! Only validation failures ever leave the crate. Introspection irregularities
//! and coercion mismatches are absorbed before the validator runs, so every
//! error here describes why a candidate object was rejected.

use std::fmt;

use stillwater::{NonEmptyVec, Semigroup, Validation};
use thiserror::Error;

/// A single reason a configuration field was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The field holds a value of the wrong type.
    #[error("'{path}': expected {expected}, received {received}")]
    InvalidType {
        path: String,
        expected: String,
        received: String,
    },

    /// A required field has no value and no default.
    #[error("'{path}': required")]
    Required { path: String },

    /// The value has the right type but breaks a constraint.
    #[error("'{path}': {message}")]
    Constraint { path: String, message: String },

    /// The validated object could not be deserialized into the target type.
    #[error("'{path}': {message}")]
    Deserialize { path: String, message: String },
}

impl ConfigError {
    /// Field path this error relates to.
    pub fn path(&self) -> &str {
        match self {
            ConfigError::InvalidType { path, .. }
            | ConfigError::Required { path }
            | ConfigError::Constraint { path, .. }
            | ConfigError::Deserialize { path, .. } => path,
        }
    }

    /// Human-readable message without the path prefix.
    pub fn message(&self) -> String {
        match self {
            ConfigError::InvalidType {
                expected, received, ..
            } => format!("expected {}, received {}", expected, received),
            ConfigError::Required { .. } => "required".to_string(),
            ConfigError::Constraint { message, .. } | ConfigError::Deserialize { message, .. } => {
                message.clone()
            }
        }
    }

    pub(crate) fn invalid_type(path: &str, expected: &str, received: &str) -> Self {
        ConfigError::InvalidType {
            path: path.to_string(),
            expected: expected.to_string(),
            received: received.to_string(),
        }
    }

    pub(crate) fn required(path: &str) -> Self {
        ConfigError::Required {
            path: path.to_string(),
        }
    }

    pub(crate) fn constraint(path: &str, message: impl Into<String>) -> Self {
        ConfigError::Constraint {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// A non-empty collection of configuration errors.
///
/// Uses `NonEmptyVec` from stillwater so a failed parse always carries at
/// least one reason.
#[derive(Debug, Clone)]
pub struct ConfigErrors(pub NonEmptyVec<ConfigError>);

impl ConfigErrors {
    /// Create from a single error.
    pub fn single(error: ConfigError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(errors: Vec<ConfigError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Get the first error (always exists).
    pub fn first(&self) -> &ConfigError {
        self.0.head()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over errors.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }

    /// Flatten into `(field path, message)` pairs in report order.
    pub fn issues(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|e| (e.path().to_string(), e.message()))
            .collect()
    }

    /// Errors reported against one field.
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ConfigError> + 'a {
        self.iter().filter(move |e| e.path() == path)
    }
}

impl Semigroup for ConfigErrors {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl From<ConfigError> for ConfigErrors {
    fn from(error: ConfigError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for ConfigErrors {
    type Item = ConfigError;
    type IntoIter = std::vec::IntoIter<ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration errors ({}):", self.len())?;
        for error in self.iter() {
            writeln!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

/// Validation result with accumulated, non-empty errors.
pub type ConfigValidation<T> = Validation<T, ConfigErrors>;

/// Extension trait for creating failing validations easily.
pub trait ConfigValidationExt<T> {
    /// Create a failing validation with a single error.
    fn fail_with(error: ConfigError) -> ConfigValidation<T>;
}

impl<T> ConfigValidationExt<T> for ConfigValidation<T> {
    fn fail_with(error: ConfigError) -> ConfigValidation<T> {
        Validation::Failure(ConfigErrors::single(error))
    }
}
