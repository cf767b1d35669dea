//! Definition of the fields a [crate::schema::Schema] is made of.

use std::{fmt, sync::Arc};

use crate::{
    primitive::{ByteOrder, PrimitiveKind},
    schema::Schema,
};

/// A single named field: its kind and an optional byte-order override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name used in the parsed [crate::record::Record].
    pub name: String,
    pub kind: FieldKind,
    /// Byte order applied while this field is processed; the surrounding order is restored afterwards.
    pub order: Option<ByteOrder>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        FieldSpec {
            name: name.into(),
            kind: kind.into(),
            order: None,
        }
    }

    pub fn with_order(mut self, order: ByteOrder) -> Self {
        self.order = Some(order);
        self
    }
}

/// The closed set of field kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Primitive(PrimitiveKind),
    Bytes(ByteSpan),
    Array(ArraySpec),
    Nested(Arc<Schema>),
}

impl FieldKind {
    /// True if the field consumes the rest of the stream.
    pub fn is_open_ended(&self) -> bool {
        match self {
            FieldKind::Primitive(_) => false,
            FieldKind::Bytes(span) => span.is_remainder(),
            FieldKind::Array(spec) => {
                spec.count == ArrayCount::UntilExhausted || spec.element.is_open_ended()
            }
            FieldKind::Nested(schema) => schema.is_open_ended(),
        }
    }
}

impl From<PrimitiveKind> for FieldKind {
    fn from(value: PrimitiveKind) -> Self {
        FieldKind::Primitive(value)
    }
}

impl From<ByteSpan> for FieldKind {
    fn from(value: ByteSpan) -> Self {
        FieldKind::Bytes(value)
    }
}

impl From<ArraySpec> for FieldKind {
    fn from(value: ArraySpec) -> Self {
        FieldKind::Array(value)
    }
}

impl From<Arc<Schema>> for FieldKind {
    fn from(value: Arc<Schema>) -> Self {
        FieldKind::Nested(value)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Primitive(kind) => write!(f, "{kind}"),
            FieldKind::Bytes(span) => write!(f, "{span}"),
            FieldKind::Array(spec) => write!(f, "{spec}"),
            FieldKind::Nested(schema) => write!(f, "schema {}", schema.name()),
        }
    }
}

/// A raw run of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteSpan {
    Fixed(usize),
    /// Everything up to the end of the stream. Only valid as the last field of a schema.
    Remainder,
}

impl ByteSpan {
    pub fn is_remainder(self) -> bool {
        self == ByteSpan::Remainder
    }
}

impl fmt::Display for ByteSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteSpan::Fixed(n) => write!(f, "bytes[{n}]"),
            ByteSpan::Remainder => f.write_str("bytes[..]"),
        }
    }
}

/// Number of elements in an array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayCount {
    Fixed(usize),
    /// Parse elements while bytes remain. Writes whatever elements the value holds.
    UntilExhausted,
}

/// What an array repeats. Arrays of arrays are expressed through a nested schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Primitive(PrimitiveKind),
    Bytes(ByteSpan),
    Nested(Arc<Schema>),
}

impl ElementKind {
    pub fn is_open_ended(&self) -> bool {
        match self {
            ElementKind::Primitive(_) => false,
            ElementKind::Bytes(span) => span.is_remainder(),
            ElementKind::Nested(schema) => schema.is_open_ended(),
        }
    }
}

impl From<PrimitiveKind> for ElementKind {
    fn from(value: PrimitiveKind) -> Self {
        ElementKind::Primitive(value)
    }
}

impl From<ByteSpan> for ElementKind {
    fn from(value: ByteSpan) -> Self {
        ElementKind::Bytes(value)
    }
}

impl From<Arc<Schema>> for ElementKind {
    fn from(value: Arc<Schema>) -> Self {
        ElementKind::Nested(value)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Primitive(kind) => write!(f, "{kind}"),
            ElementKind::Bytes(span) => write!(f, "{span}"),
            ElementKind::Nested(schema) => write!(f, "schema {}", schema.name()),
        }
    }
}

/// Parameters for an array field: element kind and count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySpec {
    pub element: ElementKind,
    pub count: ArrayCount,
}

impl ArraySpec {
    pub fn new(element: impl Into<ElementKind>, count: ArrayCount) -> Self {
        ArraySpec {
            element: element.into(),
            count,
        }
    }
}

impl fmt::Display for ArraySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            ArrayCount::Fixed(n) => write!(f, "array[{n}] of {}", self.element),
            ArrayCount::UntilExhausted => write!(f, "array[..] of {}", self.element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_ended_kinds() {
        assert!(!FieldKind::from(PrimitiveKind::U8).is_open_ended());
        assert!(!FieldKind::from(ByteSpan::Fixed(4)).is_open_ended());
        assert!(FieldKind::from(ByteSpan::Remainder).is_open_ended());
        assert!(
            FieldKind::from(ArraySpec::new(PrimitiveKind::U16, ArrayCount::UntilExhausted))
                .is_open_ended()
        );
        assert!(
            !FieldKind::from(ArraySpec::new(PrimitiveKind::U16, ArrayCount::Fixed(3)))
                .is_open_ended()
        );
    }

    #[test]
    fn test_display() {
        let kind = FieldKind::from(ArraySpec::new(ByteSpan::Fixed(3), ArrayCount::Fixed(2)));
        assert_eq!(kind.to_string(), "array[2] of bytes[3]");
        assert_eq!(
            FieldKind::from(ArraySpec::new(PrimitiveKind::I32, ArrayCount::UntilExhausted))
                .to_string(),
            "array[..] of i32"
        );
    }

    #[test]
    fn test_with_order() {
        let field = FieldSpec::new("len", PrimitiveKind::U32).with_order(ByteOrder::Big);
        assert_eq!(field.order, Some(ByteOrder::Big));
        assert_eq!(field.kind, FieldKind::Primitive(PrimitiveKind::U32));
    }
}
