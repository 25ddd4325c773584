//! Built-in validator.
//!
//! Field declarations are a closed set of tagged variants, so introspection
//! is a plain match and never needs to guess at a schema's internals. Any
//! other validator can take this module's place by implementing
//! [`Schema`](crate::Schema) and [`SchemaNode`](crate::introspect::SchemaNode).

mod field;
mod object;

pub use field::{
    any, boolean, number, string, Effect, FieldSchema, NumberSchema, SchemaExt, StringSchema,
};
pub use object::ObjectSchema;
