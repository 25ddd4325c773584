//! Convenient imports for common usage.
//!
//! ```
//! use typenv::prelude::*;
//! ```

pub use crate::env::{ConfigEnv, MockEnv, RealEnv};
pub use crate::error::{ConfigError, ConfigErrors, ConfigValidation, ConfigValidationExt};
pub use crate::loader::{build, build_with_env, Mapping, Schema};
pub use crate::schema::{any, boolean, number, string, FieldSchema, ObjectSchema, SchemaExt};
pub use crate::value::{Candidate, Value};

pub use stillwater::Validation;
