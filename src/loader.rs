//! Building configuration from the environment.
//!
//! For each declared field the loader looks up its mapped variable, coerces
//! the raw string according to the field's primitive kind and collects the
//! results into a [`Candidate`]. The candidate is then handed to the schema's
//! own parse operation, whose result is returned untouched.
//!
//! # Example
//!
//! ```
//! use serde::Deserialize;
//! use typenv::env::MockEnv;
//! use typenv::schema::{boolean, number, string, ObjectSchema, SchemaExt};
//! use typenv::{build_with_env, Mapping};
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     port: u16,
//!     host: String,
//!     debug: bool,
//! }
//!
//! let schema = ObjectSchema::<AppConfig>::new()
//!     .field("port", number().int().positive())
//!     .field("host", string().default("localhost"))
//!     .field("debug", boolean().default(false));
//! let mapping = Mapping::new().map("port", "APP_PORT").map("debug", "DEBUG");
//! let env = MockEnv::new().with_env("APP_PORT", "8080").with_env("DEBUG", "yes");
//!
//! let config = build_with_env(&schema, &mapping, &env).unwrap();
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.host, "localhost");
//! assert!(config.debug);
//! ```

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::coerce::coerce_str;
use crate::env::{ConfigEnv, RealEnv};
use crate::introspect::{classify, Kind, SchemaNode};
use crate::value::{Candidate, Value};

/// A validator the loader can drive.
///
/// Implementors expose their fields for introspection and a parse operation
/// that turns a candidate into a typed result or a structured error.
pub trait Schema {
    /// Native field representation, adapted for introspection.
    type Node: SchemaNode + ?Sized;
    /// Validated configuration.
    type Output;
    /// Structured validation error, returned to callers as-is.
    type Error;

    /// Declared field names in declaration order.
    fn field_names(&self) -> Vec<&str>;

    /// The schema node for a declared field.
    fn node(&self, name: &str) -> Option<&Self::Node>;

    /// Validate a candidate object.
    fn parse(&self, candidate: Candidate) -> Result<Self::Output, Self::Error>;
}

/// Partial mapping from field name to environment variable name.
///
/// Fields without an entry are never read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    vars: BTreeMap<String, String>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a field to an environment variable.
    pub fn map(mut self, field: impl Into<String>, var: impl Into<String>) -> Self {
        self.insert(field, var);
        self
    }

    /// Map a field to an environment variable in place.
    pub fn insert(&mut self, field: impl Into<String>, var: impl Into<String>) {
        self.vars.insert(field.into(), var.into());
    }

    /// Map every declared field to `prefix` followed by its
    /// SCREAMING_SNAKE_CASE name.
    ///
    /// ```
    /// use typenv::schema::{string, ObjectSchema};
    /// use typenv::Mapping;
    ///
    /// let schema: ObjectSchema = ObjectSchema::new().field("apiKey", string());
    /// let mapping = Mapping::derived(&schema, "APP_");
    /// assert_eq!(mapping.var("apiKey"), Some("APP_API_KEY"));
    /// ```
    pub fn derived<S: Schema + ?Sized>(schema: &S, prefix: &str) -> Self {
        schema
            .field_names()
            .into_iter()
            .map(|field| (field, format!("{}{}", prefix, env_var_name(field))))
            .collect()
    }

    /// The variable mapped to `field`, if any.
    pub fn var(&self, field: &str) -> Option<&str> {
        self.vars.get(field).map(String::as_str)
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if no field is mapped.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over `(field, variable)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Convert a field name to SCREAMING_SNAKE_CASE.
///
/// Word boundaries are lower-to-upper case transitions, the end of an
/// uppercase run followed by a lowercase letter, and any of `-`, `.`, ` `.
pub fn env_var_name(field: &str) -> String {
    let chars: Vec<char> = field.chars().collect();
    let mut out = String::with_capacity(field.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '.' | ' ') {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
    }

    out
}

/// Assemble the candidate object for `schema` from `env`.
///
/// Unmapped fields, unset variables and fields the schema has no node for
/// are left out entirely.
pub fn candidate<S: Schema + ?Sized>(schema: &S, mapping: &Mapping, env: &dyn ConfigEnv) -> Candidate {
    let mut candidate = Candidate::new();

    for field in schema.field_names() {
        let Some(var) = mapping.var(field) else {
            trace!(field, "no environment variable mapped");
            continue;
        };
        let Some(node) = schema.node(field) else {
            debug!(field, "declared field has no schema node, skipping");
            continue;
        };

        let Some(raw) = env.get_env(var) else {
            trace!(field, var, "environment variable not set");
            continue;
        };

        let kind = classify(node);
        let value = coerce_str(kind, &raw);
        if matches!(value, Value::String(_)) && matches!(kind, Kind::Number | Kind::Boolean) {
            debug!(field, var, ?kind, "value not coercible, deferring to schema");
        } else {
            trace!(field, var, ?kind, "read environment variable");
        }
        candidate.insert(field, value);
    }

    candidate
}

/// Build configuration from the live process environment.
pub fn build<S: Schema + ?Sized>(schema: &S, mapping: &Mapping) -> Result<S::Output, S::Error> {
    build_with_env(schema, mapping, &RealEnv::new())
}

/// Build configuration from an explicit environment.
///
/// The schema's parse result is returned as-is: validated output on success,
/// the schema's own error on failure.
pub fn build_with_env<S: Schema + ?Sized>(
    schema: &S,
    mapping: &Mapping,
    env: &dyn ConfigEnv,
) -> Result<S::Output, S::Error> {
    let candidate = candidate(schema, mapping, env);
    debug!(fields = candidate.len(), "validating configuration candidate");

    let result = schema.parse(candidate);
    if result.is_err() {
        debug!("configuration rejected by schema");
    }
    result
}
