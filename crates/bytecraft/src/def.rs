//! Textual schema description.
//!
//! These types describe the *shape* of a binary layout with string tokens for kinds
//! and byte orders, so a schema can ship as data (e.g. a JSON file with the `serde`
//! feature). [Schema::try_from] resolves every token and validates the result before
//! any stream is touched.
//!
//! Kind tokens are the Rust integer names (`u8` … `i64`) or the Windows names
//! (`BYTE`, `WORD`, `DWORD`, `QWORD`, `CHAR`, `SHORT`, `LONG`, `LLONG`), any case.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    errors::SchemaError,
    field::{ArrayCount, ArraySpec, ByteSpan, ElementKind, FieldKind, FieldSpec},
    primitive::{ByteOrder, PrimitiveKind},
    schema::Schema,
};

/// Top-level schema definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchemaDef {
    pub name: String,
    /// Schema-wide byte order token (`big` / `little`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: Option<String>,
    pub fields: Vec<FieldDef>,
}

/// Description of a single field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKindDef,
    /// Optional byte order override for this field.
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: Option<String>,
}

/// Kind of a field. In JSON the variant is selected by a `type` key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum FieldKindDef {
    /// Fixed-width integer named by a kind token.
    Primitive { primitive: String },
    /// Raw bytes; a missing `len` means the rest of the stream.
    Bytes {
        #[cfg_attr(feature = "serde", serde(default))]
        len: Option<usize>,
    },
    /// Repeated element; a missing `count` repeats until the stream is exhausted.
    Array {
        element: Box<FieldKindDef>,
        #[cfg_attr(feature = "serde", serde(default))]
        count: Option<usize>,
    },
    /// Inline nested schema.
    Nested { schema: SchemaDef },
}

impl TryFrom<SchemaDef> for Arc<Schema> {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        resolve_schema(&def)
    }
}

impl TryFrom<&SchemaDef> for Arc<Schema> {
    type Error = SchemaError;

    fn try_from(def: &SchemaDef) -> Result<Self, Self::Error> {
        resolve_schema(def)
    }
}

fn resolve_schema(def: &SchemaDef) -> Result<Arc<Schema>, SchemaError> {
    let order = def
        .order
        .as_deref()
        .map(|token| resolve_order(&def.name, "order", token))
        .transpose()?;

    let mut fields = Vec::with_capacity(def.fields.len());
    for field in &def.fields {
        let kind = resolve_kind(&def.name, &field.name, &field.kind)?;
        let order = field
            .order
            .as_deref()
            .map(|token| resolve_order(&def.name, &field.name, token))
            .transpose()?;

        fields.push(FieldSpec {
            name: field.name.clone(),
            kind,
            order,
        });
    }

    Schema::new(def.name.clone(), order, fields)
}

fn resolve_order(schema: &str, field: &str, token: &str) -> Result<ByteOrder, SchemaError> {
    ByteOrder::from_token(token).ok_or_else(|| SchemaError::InvalidByteOrder {
        schema: schema.to_string(),
        field: field.to_string(),
        token: token.to_string(),
    })
}

fn resolve_primitive(schema: &str, field: &str, token: &str) -> Result<PrimitiveKind, SchemaError> {
    PrimitiveKind::from_token(token).ok_or_else(|| SchemaError::UnknownKind {
        schema: schema.to_string(),
        field: field.to_string(),
        token: token.to_string(),
    })
}

fn resolve_span(len: Option<usize>) -> ByteSpan {
    len.map_or(ByteSpan::Remainder, ByteSpan::Fixed)
}

fn resolve_kind(schema: &str, field: &str, def: &FieldKindDef) -> Result<FieldKind, SchemaError> {
    let kind = match def {
        FieldKindDef::Primitive { primitive } => {
            FieldKind::Primitive(resolve_primitive(schema, field, primitive)?)
        }
        FieldKindDef::Bytes { len } => FieldKind::Bytes(resolve_span(*len)),
        FieldKindDef::Array { element, count } => {
            let element = match element.as_ref() {
                FieldKindDef::Primitive { primitive } => {
                    ElementKind::Primitive(resolve_primitive(schema, field, primitive)?)
                }
                FieldKindDef::Bytes { len } => ElementKind::Bytes(resolve_span(*len)),
                FieldKindDef::Nested { schema: nested } => {
                    ElementKind::Nested(resolve_schema(nested)?)
                }
                FieldKindDef::Array { .. } => {
                    return Err(SchemaError::InvalidElement {
                        schema: schema.to_string(),
                        field: field.to_string(),
                    });
                }
            };
            let count = count.map_or(ArrayCount::UntilExhausted, ArrayCount::Fixed);
            FieldKind::Array(ArraySpec { element, count })
        }
        FieldKindDef::Nested { schema: nested } => FieldKind::Nested(resolve_schema(nested)?),
    };

    Ok(kind)
}
