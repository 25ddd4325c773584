//! Schema introspection.
//!
//! Validation libraries describe fields with layered wrappers: optional,
//! nullable, defaulted, transformed and so on. Coercion only cares about the
//! primitive at the bottom of that stack. The [`SchemaNode`] trait is the
//! adapter a validator implements to expose its native field representation
//! as a [`Shape`]; [`unwrap_modifiers`] and [`classify`] then work uniformly
//! over any implementation.
//!
//! Introspection never fails. A node whose shape is not recognised is
//! [`Shape::Opaque`], and a wrapper that does not expose its inner node stops
//! the descent where it is.

/// Primitive declarations coercion knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Number,
    Boolean,
    String,
}

/// Modifier layers that wrap another field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Optional,
    Nullable,
    /// Substitutes a value when the input is absent.
    Default,
    /// Substitutes a value when the inner schema rejects the input.
    Catch,
    Readonly,
    /// Pre- or post-validation transform around an underlying schema.
    Effects,
    /// Two-stage pipeline; introspection follows the output stage.
    Pipeline,
}

/// Tagged view of one field-schema node.
#[derive(Debug)]
pub enum Shape<'a, N: ?Sized> {
    /// A primitive declaration.
    Primitive(Primitive),
    /// A modifier around another node. `inner` is `None` when the wrapper
    /// does not expose the node it wraps.
    Wrapped {
        modifier: Modifier,
        inner: Option<&'a N>,
    },
    /// Anything else: composites, enums, unknown shapes.
    Opaque,
}

/// Adapter from a validator's native field representation to [`Shape`].
pub trait SchemaNode {
    /// Describe this node's outermost layer.
    fn shape(&self) -> Shape<'_, Self>;
}

/// The coercion target of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Number,
    Boolean,
    String,
    /// Leave the raw string alone and let the validator decide.
    Other,
}

impl From<Primitive> for Kind {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Number => Kind::Number,
            Primitive::Boolean => Kind::Boolean,
            Primitive::String => Kind::String,
        }
    }
}

/// Strip every modifier layer and return the innermost node.
///
/// Stops at the first node that is not a wrapper, or at a wrapper whose
/// inner node is unavailable. Applying it to its own result returns the same
/// node.
pub fn unwrap_modifiers<N: SchemaNode + ?Sized>(node: &N) -> &N {
    let mut current = node;
    while let Shape::Wrapped {
        inner: Some(inner), ..
    } = current.shape()
    {
        current = inner;
    }
    current
}

/// Classify a field by the primitive it ultimately declares.
pub fn classify<N: SchemaNode + ?Sized>(node: &N) -> Kind {
    match unwrap_modifiers(node).shape() {
        Shape::Primitive(primitive) => primitive.into(),
        Shape::Wrapped { .. } | Shape::Opaque => Kind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal node type so the walk can be tested without a validator.
    #[derive(Debug, PartialEq)]
    enum Node {
        Leaf(Primitive),
        Wrap(Modifier, Option<Box<Node>>),
        Unknown,
    }

    impl SchemaNode for Node {
        fn shape(&self) -> Shape<'_, Self> {
            match self {
                Node::Leaf(p) => Shape::Primitive(*p),
                Node::Wrap(modifier, inner) => Shape::Wrapped {
                    modifier: *modifier,
                    inner: inner.as_deref(),
                },
                Node::Unknown => Shape::Opaque,
            }
        }
    }

    fn wrap(modifier: Modifier, inner: Node) -> Node {
        Node::Wrap(modifier, Some(Box::new(inner)))
    }

    #[test]
    fn test_unwrap_primitive_is_identity() {
        let node = Node::Leaf(Primitive::Number);
        assert_eq!(unwrap_modifiers(&node), &node);
    }

    #[test]
    fn test_unwrap_nested_modifiers() {
        let node = wrap(
            Modifier::Optional,
            wrap(
                Modifier::Default,
                wrap(Modifier::Effects, Node::Leaf(Primitive::Boolean)),
            ),
        );
        assert_eq!(unwrap_modifiers(&node), &Node::Leaf(Primitive::Boolean));
        assert_eq!(classify(&node), Kind::Boolean);
    }

    #[test]
    fn test_unwrap_is_idempotent() {
        let node = wrap(
            Modifier::Nullable,
            wrap(Modifier::Pipeline, Node::Leaf(Primitive::String)),
        );
        let once = unwrap_modifiers(&node);
        assert_eq!(unwrap_modifiers(once), once);
    }

    #[test]
    fn test_wrapper_without_inner_stops() {
        let node = wrap(Modifier::Catch, Node::Wrap(Modifier::Readonly, None));
        assert_eq!(
            unwrap_modifiers(&node),
            &Node::Wrap(Modifier::Readonly, None)
        );
        assert_eq!(classify(&node), Kind::Other);
    }

    #[test]
    fn test_opaque_is_other() {
        assert_eq!(classify(&Node::Unknown), Kind::Other);
        assert_eq!(classify(&wrap(Modifier::Optional, Node::Unknown)), Kind::Other);
    }

    #[test]
    fn test_every_primitive_classifies() {
        assert_eq!(classify(&Node::Leaf(Primitive::Number)), Kind::Number);
        assert_eq!(classify(&Node::Leaf(Primitive::Boolean)), Kind::Boolean);
        assert_eq!(classify(&Node::Leaf(Primitive::String)), Kind::String);
    }
}
