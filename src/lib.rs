// Allow large error types - detailed config errors are expected
#![allow(clippy::result_large_err)]

//! typenv: typed, validated configuration from environment variables.
//!
//! Declare the shape of your configuration once as a schema, say which
//! environment variable feeds each field, and get back a typed value with
//! defaults applied, or every reason the environment was rejected.
//!
//! # Core Concepts
//!
//! - **Schema-aware coercion**: raw strings are converted according to the
//!   primitive each field declares, seen through any optional, default or
//!   transform wrappers
//! - **Deferred mismatches**: a string that cannot be coerced is passed on
//!   unchanged so the validator reports the mismatch against the right field
//! - **True absence**: unmapped fields and unset variables never appear in the
//!   candidate object, so schema defaults and optionality apply
//! - **Pluggable validator**: anything implementing [`Schema`] can be driven;
//!   [`schema::ObjectSchema`] is the built-in one
//! - **Testable I/O**: environment access goes through [`ConfigEnv`]
//!
//! # Quick Start
//!
//! ```
//! use serde::Deserialize;
//! use typenv::prelude::*;
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
//!
//! let mapping = Mapping::new()
//!     .map("port", "APP_PORT")
//!     .map("host", "APP_HOST")
//!     .map("debug", "DEBUG");
//!
//! let env = MockEnv::new()
//!     .with_env("APP_PORT", "3000")
//!     .with_env("DEBUG", "true");
//!
//! let config = build_with_env(&schema, &mapping, &env)?;
//! assert_eq!(config.port, 3000);
//! assert_eq!(config.host, "localhost");
//! assert!(config.debug);
//! # Ok::<(), ConfigErrors>(())
//! ```
//!
//! In production call [`build`], which reads the live process environment.
//!
//! # Module Structure
//!
//! - [`introspect`]: `SchemaNode` adapter trait, `unwrap_modifiers`, `classify`
//! - [`coerce`]: string-to-value coercion rules
//! - [`loader`]: `Schema` trait, `Mapping`, `build`, `build_with_env`
//! - [`schema`]: built-in validator (`ObjectSchema`, `FieldSchema`)
//! - [`descriptor`]: introspection of JSON field descriptors
//! - [`value`]: `Value` and `Candidate`
//! - [`mod@env`]: `ConfigEnv`, `RealEnv`, `MockEnv`
//! - [`error`]: `ConfigError`, `ConfigErrors`, `ConfigValidation`

pub mod coerce;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod introspect;
pub mod loader;
pub mod prelude;
pub mod schema;
pub mod value;

pub use coerce::{coerce, coerce_str, coerce_value};
pub use env::{ConfigEnv, MockEnv, RealEnv};
pub use error::{ConfigError, ConfigErrors, ConfigValidation, ConfigValidationExt};
pub use introspect::{classify, unwrap_modifiers, Kind, SchemaNode};
pub use loader::{build, build_with_env, candidate, env_var_name, Mapping, Schema};
pub use value::{Candidate, Value};

// Re-export stillwater types used in refinements
pub use stillwater::{NonEmptyVec, Semigroup, Validation};
