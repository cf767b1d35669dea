//! Statically known byte sizes.
//!
//! Open-ended fields (remainder spans, until-exhausted arrays) count as zero, so the
//! result is the size of the fixed-size prefix. It is exact only for schemas that are
//! not [open-ended](crate::schema::Schema::is_open_ended). Sizes saturate at
//! `usize::MAX` instead of overflowing.

use crate::{
    field::{ArrayCount, ByteSpan, ElementKind, FieldKind},
    schema::Schema,
};

impl Schema {
    pub fn static_size(&self) -> usize {
        self.fields()
            .iter()
            .map(|field| field.kind.static_size())
            .fold(0, usize::saturating_add)
    }
}

impl FieldKind {
    pub fn static_size(&self) -> usize {
        match self {
            FieldKind::Primitive(kind) => kind.width(),
            FieldKind::Bytes(span) => span.static_size(),
            FieldKind::Array(spec) => match spec.count {
                ArrayCount::Fixed(count) => spec.element.static_size().saturating_mul(count),
                ArrayCount::UntilExhausted => 0,
            },
            FieldKind::Nested(schema) => schema.static_size(),
        }
    }
}

impl ElementKind {
    pub fn static_size(&self) -> usize {
        match self {
            ElementKind::Primitive(kind) => kind.width(),
            ElementKind::Bytes(span) => span.static_size(),
            ElementKind::Nested(schema) => schema.static_size(),
        }
    }
}

impl ByteSpan {
    pub fn static_size(self) -> usize {
        match self {
            ByteSpan::Fixed(n) => n,
            ByteSpan::Remainder => 0,
        }
    }
}
