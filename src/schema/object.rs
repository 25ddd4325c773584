//! Object schemas: an ordered set of named fields parsed into a serde type.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use stillwater::Validation;

use crate::error::{ConfigError, ConfigErrors, ConfigValidation};
use crate::loader::Schema;
use crate::schema::FieldSchema;
use crate::value::Candidate;

type ObjectRefinement<T> = Arc<dyn Fn(&T) -> ConfigValidation<()> + Send + Sync>;

/// Schema for a whole configuration object.
///
/// Fields are kept in declaration order. Parsing checks every field, reports
/// all failures together, then deserializes the validated object into `T`.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use typenv::schema::{boolean, number, string, ObjectSchema, SchemaExt};
/// use typenv::{Candidate, Schema, Value};
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct AppConfig {
///     port: u16,
///     host: String,
///     debug: bool,
/// }
///
/// let schema = ObjectSchema::<AppConfig>::new()
///     .field("port", number().int().positive())
///     .field("host", string().default("localhost"))
///     .field("debug", boolean().default(false));
///
/// let mut candidate = Candidate::new();
/// candidate.insert("port", Value::Integer(8080));
///
/// let config = schema.parse(candidate).unwrap();
/// assert_eq!(config.host, "localhost");
/// ```
pub struct ObjectSchema<T = serde_json::Value> {
    fields: Vec<(String, FieldSchema)>,
    refinements: Vec<ObjectRefinement<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ObjectSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObjectSchema<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            refinements: self.refinements.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ObjectSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("fields", &self.fields)
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

impl<T> ObjectSchema<T> {
    /// Create an empty object schema.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            refinements: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a field.
    ///
    /// Declaring a name twice replaces the earlier schema in place, so field
    /// names stay unique and keep their original position.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<FieldSchema>) -> Self {
        let name = name.into();
        let schema = schema.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = schema,
            None => self.fields.push((name, schema)),
        }
        self
    }

    /// Add a check over the whole deserialized object.
    ///
    /// Refinements run only when every field validated and deserialization
    /// succeeded. All refinement failures are reported together.
    pub fn refine<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> ConfigValidation<()> + Send + Sync + 'static,
    {
        self.refinements.push(Arc::new(check));
        self
    }

    /// Get a field's schema by name.
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, schema)| schema)
    }

    /// Iterate over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T: DeserializeOwned> ObjectSchema<T> {
    fn parse_candidate(&self, mut candidate: Candidate) -> Result<T, ConfigErrors> {
        let checks: Vec<ConfigValidation<Option<(String, serde_json::Value)>>> = self
            .fields
            .iter()
            .map(|(name, schema)| {
                schema
                    .check(name, candidate.take(name))
                    .map(|value| value.map(|v| (name.clone(), v.to_json())))
            })
            .collect();

        for key in candidate.fields() {
            tracing::trace!(field = %key, "dropping undeclared field");
        }

        let entries = match Validation::all_vec(checks) {
            Validation::Success(entries) => entries,
            Validation::Failure(errors) => return Err(errors),
        };

        let object = serde_json::Value::Object(entries.into_iter().flatten().collect());
        let config = deserialize::<T>(object)?;

        let failures: Vec<ConfigError> = self
            .refinements
            .iter()
            .filter_map(|refine| match refine(&config) {
                Validation::Success(()) => None,
                Validation::Failure(errors) => Some(errors),
            })
            .flatten()
            .collect();

        match ConfigErrors::from_vec(failures) {
            Some(errors) => Err(errors),
            None => Ok(config),
        }
    }
}

impl<T: DeserializeOwned> Schema for ObjectSchema<T> {
    type Node = FieldSchema;
    type Output = T;
    type Error = ConfigErrors;

    fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn node(&self, name: &str) -> Option<&FieldSchema> {
        self.get(name)
    }

    fn parse(&self, candidate: Candidate) -> Result<T, ConfigErrors> {
        self.parse_candidate(candidate)
    }
}

fn deserialize<T: DeserializeOwned>(object: serde_json::Value) -> Result<T, ConfigErrors> {
    serde_path_to_error::deserialize(object).map_err(|e| {
        // an empty path renders as "."
        let path = match e.path().to_string() {
            root if root == "." => None,
            path => Some(path),
        };
        let message = e.into_inner().to_string();

        // serde reports struct fields the schema never declared against the
        // enclosing struct, so the field name only lives in the message
        if let Some(field) = missing_field(&message) {
            return ConfigErrors::single(ConfigError::required(field));
        }

        ConfigErrors::single(ConfigError::Deserialize {
            path: path.unwrap_or_else(|| "(root)".to_string()),
            message,
        })
    })
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.find('`').map(|end| &rest[..end])
}
