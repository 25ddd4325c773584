//! Introspection of serialized field descriptors.
//!
//! Schemas exported from other tools often arrive as JSON, one descriptor per
//! field, tagged by a `"type"` key:
//!
//! ```json
//! {"type": "optional", "inner": {"type": "default", "inner": {"type": "number"}}}
//! ```
//!
//! Wrappers name their child differently: `"inner"` for optional, nullable,
//! default, catch and readonly, `"schema"` for effects and `"out"` for
//! pipelines. Malformed descriptors never fail introspection; they classify
//! as [`Kind::Other`](crate::introspect::Kind::Other) and their raw strings
//! pass through uncoerced.

use serde_json::Value as Json;

use crate::introspect::{Modifier, Primitive, SchemaNode, Shape};

impl SchemaNode for Json {
    fn shape(&self) -> Shape<'_, Self> {
        let Some(tag) = self.get("type").and_then(Json::as_str) else {
            return Shape::Opaque;
        };

        match tag {
            "number" | "integer" => Shape::Primitive(Primitive::Number),
            "boolean" => Shape::Primitive(Primitive::Boolean),
            "string" => Shape::Primitive(Primitive::String),
            "optional" => child(self, Modifier::Optional, "inner"),
            "nullable" => child(self, Modifier::Nullable, "inner"),
            "default" => child(self, Modifier::Default, "inner"),
            "catch" => child(self, Modifier::Catch, "inner"),
            "readonly" => child(self, Modifier::Readonly, "inner"),
            "effects" => child(self, Modifier::Effects, "schema"),
            "pipeline" => child(self, Modifier::Pipeline, "out"),
            _ => Shape::Opaque,
        }
    }
}

// Only an object counts as a present child; anything else is a missing one.
fn child<'a>(node: &'a Json, modifier: Modifier, key: &str) -> Shape<'a, Json> {
    Shape::Wrapped {
        modifier,
        inner: node.get(key).filter(|inner| inner.is_object()),
    }
}
