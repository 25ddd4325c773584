//! Field schemas: primitive declarations plus modifier layers.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use stillwater::Validation;

use crate::error::{ConfigError, ConfigErrors, ConfigValidation, ConfigValidationExt};
use crate::introspect::{Modifier, Primitive, SchemaNode, Shape};
use crate::value::Value;

type PreprocessFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;
type RefineFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Declared type and constraints of one configuration field.
///
/// Build these with [`number`], [`string`], [`boolean`] and [`any`], then
/// layer modifiers through [`SchemaExt`].
#[derive(Debug, Clone)]
pub enum FieldSchema {
    Number(NumberSchema),
    Boolean,
    String(StringSchema),
    /// Accepts anything, including absence.
    Any,
    Optional(Box<FieldSchema>),
    Nullable(Box<FieldSchema>),
    Default {
        inner: Box<FieldSchema>,
        value: Value,
    },
    Catch {
        inner: Box<FieldSchema>,
        fallback: Value,
    },
    Readonly(Box<FieldSchema>),
    Effects {
        schema: Box<FieldSchema>,
        effect: Effect,
    },
    Pipe {
        input: Box<FieldSchema>,
        output: Box<FieldSchema>,
    },
}

/// A user function attached to a field.
#[derive(Clone)]
pub enum Effect {
    /// Rewrites the input before the underlying schema sees it.
    Preprocess(PreprocessFn),
    /// Rewrites the validated value; `Err` becomes a constraint error.
    Transform(TransformFn),
    /// Rejects validated values for which the predicate is false.
    Refine { check: RefineFn, message: String },
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Preprocess(_) => f.write_str("Preprocess(..)"),
            Effect::Transform(_) => f.write_str("Transform(..)"),
            Effect::Refine { message, .. } => f
                .debug_struct("Refine")
                .field("message", message)
                .finish_non_exhaustive(),
        }
    }
}

impl FieldSchema {
    /// Validate one field's input.
    ///
    /// `None` means the field is absent from the candidate. A successful
    /// `None` result means the field stays absent from the output.
    pub fn check(&self, path: &str, input: Option<Value>) -> ConfigValidation<Option<Value>> {
        match self {
            FieldSchema::Number(rules) => match input {
                Some(value) => rules.check(path, value).map(Some),
                None => ConfigValidation::fail_with(ConfigError::required(path)),
            },
            FieldSchema::Boolean => match input {
                Some(Value::Bool(b)) => Validation::Success(Some(Value::Bool(b))),
                Some(other) => ConfigValidation::fail_with(ConfigError::invalid_type(
                    path,
                    "boolean",
                    other.type_name(),
                )),
                None => ConfigValidation::fail_with(ConfigError::required(path)),
            },
            FieldSchema::String(rules) => match input {
                Some(value) => rules.check(path, value).map(Some),
                None => ConfigValidation::fail_with(ConfigError::required(path)),
            },
            FieldSchema::Any => Validation::Success(input),
            FieldSchema::Optional(inner) => match input {
                None => Validation::Success(None),
                present => inner.check(path, present),
            },
            FieldSchema::Nullable(inner) => match input {
                Some(Value::Null) => Validation::Success(Some(Value::Null)),
                other => inner.check(path, other),
            },
            FieldSchema::Default { inner, value } => {
                inner.check(path, Some(input.unwrap_or_else(|| value.clone())))
            }
            FieldSchema::Catch { inner, fallback } => match inner.check(path, input) {
                Validation::Failure(_) => Validation::Success(Some(fallback.clone())),
                success => success,
            },
            FieldSchema::Readonly(inner) => inner.check(path, input),
            FieldSchema::Effects { schema, effect } => effect.apply(schema, path, input),
            FieldSchema::Pipe { input: first, output } => match first.check(path, input) {
                Validation::Success(value) => output.check(path, value),
                failure => failure,
            },
        }
    }
}

impl Effect {
    fn apply(
        &self,
        schema: &FieldSchema,
        path: &str,
        input: Option<Value>,
    ) -> ConfigValidation<Option<Value>> {
        match self {
            Effect::Preprocess(f) => schema.check(path, input.map(|v| f(v))),
            Effect::Transform(f) => match schema.check(path, input) {
                Validation::Success(Some(value)) => match f(value) {
                    Ok(transformed) => Validation::Success(Some(transformed)),
                    Err(message) => {
                        ConfigValidation::fail_with(ConfigError::constraint(path, message))
                    }
                },
                other => other,
            },
            Effect::Refine { check, message } => match schema.check(path, input) {
                Validation::Success(Some(value)) if !check(&value) => {
                    ConfigValidation::fail_with(ConfigError::constraint(path, message.clone()))
                }
                other => other,
            },
        }
    }
}

impl SchemaNode for FieldSchema {
    fn shape(&self) -> Shape<'_, Self> {
        match self {
            FieldSchema::Number(_) => Shape::Primitive(Primitive::Number),
            FieldSchema::Boolean => Shape::Primitive(Primitive::Boolean),
            FieldSchema::String(_) => Shape::Primitive(Primitive::String),
            FieldSchema::Any => Shape::Opaque,
            FieldSchema::Optional(inner) => wrapped(Modifier::Optional, inner),
            FieldSchema::Nullable(inner) => wrapped(Modifier::Nullable, inner),
            FieldSchema::Default { inner, .. } => wrapped(Modifier::Default, inner),
            FieldSchema::Catch { inner, .. } => wrapped(Modifier::Catch, inner),
            FieldSchema::Readonly(inner) => wrapped(Modifier::Readonly, inner),
            FieldSchema::Effects { schema, .. } => wrapped(Modifier::Effects, schema),
            FieldSchema::Pipe { output, .. } => wrapped(Modifier::Pipeline, output),
        }
    }
}

fn wrapped(modifier: Modifier, inner: &FieldSchema) -> Shape<'_, FieldSchema> {
    Shape::Wrapped {
        modifier,
        inner: Some(inner),
    }
}

#[derive(Debug, Clone)]
enum NumberCheck {
    Int,
    Min { bound: f64, inclusive: bool },
    Max { bound: f64, inclusive: bool },
}

/// Number declaration with its constraints.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    checks: Vec<NumberCheck>,
}

/// Declare a number field.
pub fn number() -> NumberSchema {
    NumberSchema {
        checks: Vec::new(),
    }
}

impl NumberSchema {
    /// Require an integral value. Integral floats are normalised to integers.
    pub fn int(mut self) -> Self {
        self.checks.push(NumberCheck::Int);
        self
    }

    /// Require a value greater than zero.
    pub fn positive(mut self) -> Self {
        self.checks.push(NumberCheck::Min {
            bound: 0.0,
            inclusive: false,
        });
        self
    }

    /// Require a value of zero or more.
    pub fn nonnegative(self) -> Self {
        self.min(0.0)
    }

    /// Require a value greater than or equal to `bound`.
    pub fn min(mut self, bound: f64) -> Self {
        self.checks.push(NumberCheck::Min {
            bound,
            inclusive: true,
        });
        self
    }

    /// Require a value less than or equal to `bound`.
    pub fn max(mut self, bound: f64) -> Self {
        self.checks.push(NumberCheck::Max {
            bound,
            inclusive: true,
        });
        self
    }

    fn check(&self, path: &str, value: Value) -> ConfigValidation<Value> {
        let n = match value {
            Value::Integer(i) => i as f64,
            Value::Float(f) => f,
            other => {
                return ConfigValidation::fail_with(ConfigError::invalid_type(
                    path,
                    "number",
                    other.type_name(),
                ))
            }
        };

        let mut errors = Vec::new();
        let mut integral = false;
        for check in &self.checks {
            match *check {
                NumberCheck::Int if n.fract() != 0.0 || !n.is_finite() => {
                    errors.push(ConfigError::constraint(path, "must be an integer"));
                }
                NumberCheck::Int => integral = true,
                NumberCheck::Min { bound, inclusive } if n < bound || (!inclusive && n == bound) => {
                    let op = if inclusive { "greater than or equal to" } else { "greater than" };
                    errors.push(ConfigError::constraint(path, format!("must be {} {}", op, bound)));
                }
                NumberCheck::Max { bound, inclusive } if n > bound || (!inclusive && n == bound) => {
                    let op = if inclusive { "less than or equal to" } else { "less than" };
                    errors.push(ConfigError::constraint(path, format!("must be {} {}", op, bound)));
                }
                NumberCheck::Min { .. } | NumberCheck::Max { .. } => {}
            }
        }

        match ConfigErrors::from_vec(errors) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(normalise(value, integral)),
        }
    }
}

// Integral floats within i64 range become integers so they deserialize into
// integer fields.
fn normalise(value: Value, integral: bool) -> Value {
    match value {
        Value::Float(f) if integral && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Value::Integer(f as i64)
        }
        other => other,
    }
}

#[derive(Debug, Clone)]
enum StringCheck {
    MinLen(usize),
    MaxLen(usize),
    Pattern(Regex),
    OneOf(Vec<String>),
}

/// String declaration with its constraints.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    checks: Vec<StringCheck>,
}

/// Declare a string field.
pub fn string() -> StringSchema {
    StringSchema {
        checks: Vec::new(),
    }
}

impl StringSchema {
    /// Require at least `len` characters.
    pub fn min_len(mut self, len: usize) -> Self {
        self.checks.push(StringCheck::MinLen(len));
        self
    }

    /// Require at most `len` characters.
    pub fn max_len(mut self, len: usize) -> Self {
        self.checks.push(StringCheck::MaxLen(len));
        self
    }

    /// Reject the empty string.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Require the value to match `regex`.
    pub fn pattern(mut self, regex: Regex) -> Self {
        self.checks.push(StringCheck::Pattern(regex));
        self
    }

    /// Require the value to be one of `allowed`.
    pub fn one_of<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks
            .push(StringCheck::OneOf(allowed.into_iter().map(Into::into).collect()));
        self
    }

    fn check(&self, path: &str, value: Value) -> ConfigValidation<Value> {
        let s = match value {
            Value::String(s) => s,
            other => {
                return ConfigValidation::fail_with(ConfigError::invalid_type(
                    path,
                    "string",
                    other.type_name(),
                ))
            }
        };

        let len = s.chars().count();
        let errors: Vec<ConfigError> = self
            .checks
            .iter()
            .filter_map(|check| match check {
                StringCheck::MinLen(min) if len < *min => Some(format!(
                    "must contain at least {} character(s)",
                    min
                )),
                StringCheck::MaxLen(max) if len > *max => Some(format!(
                    "must contain at most {} character(s)",
                    max
                )),
                StringCheck::Pattern(regex) if !regex.is_match(&s) => {
                    Some(format!("must match pattern {}", regex.as_str()))
                }
                StringCheck::OneOf(allowed) if !allowed.contains(&s) => {
                    Some(format!("must be one of: {}", allowed.join(", ")))
                }
                _ => None,
            })
            .map(|message| ConfigError::constraint(path, message))
            .collect();

        match ConfigErrors::from_vec(errors) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(Value::String(s)),
        }
    }
}

/// Declare a boolean field.
pub fn boolean() -> FieldSchema {
    FieldSchema::Boolean
}

/// Declare a field that accepts any value and is never coerced.
pub fn any() -> FieldSchema {
    FieldSchema::Any
}

impl From<NumberSchema> for FieldSchema {
    fn from(schema: NumberSchema) -> Self {
        FieldSchema::Number(schema)
    }
}

impl From<StringSchema> for FieldSchema {
    fn from(schema: StringSchema) -> Self {
        FieldSchema::String(schema)
    }
}

/// Modifier layers available on every field declaration.
pub trait SchemaExt: Into<FieldSchema> + Sized {
    /// Allow the field to be absent.
    fn optional(self) -> FieldSchema {
        FieldSchema::Optional(Box::new(self.into()))
    }

    /// Allow an explicit null.
    fn nullable(self) -> FieldSchema {
        FieldSchema::Nullable(Box::new(self.into()))
    }

    /// Use `value` when the field is absent.
    fn default(self, value: impl Into<Value>) -> FieldSchema {
        FieldSchema::Default {
            inner: Box::new(self.into()),
            value: value.into(),
        }
    }

    /// Use `fallback` whenever validation of the field fails.
    fn catch(self, fallback: impl Into<Value>) -> FieldSchema {
        FieldSchema::Catch {
            inner: Box::new(self.into()),
            fallback: fallback.into(),
        }
    }

    /// Mark the field read-only. Validation is unaffected.
    fn readonly(self) -> FieldSchema {
        FieldSchema::Readonly(Box::new(self.into()))
    }

    /// Rewrite present input before validation.
    fn preprocess<F>(self, f: F) -> FieldSchema
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.effect(Effect::Preprocess(Arc::new(f)))
    }

    /// Rewrite the validated value.
    fn transform<F>(self, f: F) -> FieldSchema
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.effect(Effect::Transform(Arc::new(f)))
    }

    /// Reject validated values for which `check` returns false.
    fn refine<F>(self, check: F, message: impl Into<String>) -> FieldSchema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.effect(Effect::Refine {
            check: Arc::new(check),
            message: message.into(),
        })
    }

    /// Feed this field's output into `next`.
    fn pipe(self, next: impl Into<FieldSchema>) -> FieldSchema {
        FieldSchema::Pipe {
            input: Box::new(self.into()),
            output: Box::new(next.into()),
        }
    }

    #[doc(hidden)]
    fn effect(self, effect: Effect) -> FieldSchema {
        FieldSchema::Effects {
            schema: Box::new(self.into()),
            effect,
        }
    }
}

impl<T: Into<FieldSchema>> SchemaExt for T {}
