//! Schema: a named, ordered list of [FieldSpec]s describing one binary layout.

use std::{
    collections::HashSet,
    io::{Read, Seek, Write},
    sync::Arc,
};

use crate::{
    errors::{ReadError, SchemaError, WriteError},
    field::{ArrayCount, FieldKind, FieldSpec},
    primitive::ByteOrder,
    record::Record,
    stream::{Reader, Writer},
};

/// A validated schema. Use [Schema::new] or [crate::builder::SchemaBuilder] to build one,
/// then [Schema::parse] to read a [Record] from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    order: Option<ByteOrder>,
    /// Fields in wire order.
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Validates `fields` and wraps them in a shareable schema.
    ///
    /// Fails if a name is empty or repeated, if an open-ended field (remainder span or
    /// until-exhausted array) is not the last field, or if an array element is open-ended
    /// or, for until-exhausted arrays, zero-sized.
    pub fn new(
        name: impl Into<String>,
        order: Option<ByteOrder>,
        fields: Vec<FieldSpec>,
    ) -> Result<Arc<Self>, SchemaError> {
        let name = name.into();
        validate(&name, &fields)?;

        Ok(Arc::new(Self {
            name,
            order,
            fields,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte order applied over the whole schema, if any.
    pub fn order(&self) -> Option<ByteOrder> {
        self.order
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// True if the last field consumes the rest of the stream.
    pub fn is_open_ended(&self) -> bool {
        self.fields
            .last()
            .is_some_and(|field| field.kind.is_open_ended())
    }

    /// Parses a [Record] from the current position of `reader`.
    pub fn parse<R: Read + Seek>(self: &Arc<Self>, reader: &mut Reader<R>) -> Result<Record, ReadError> {
        crate::engine::parse(self, reader)
    }

    /// Writes `record` according to this schema.
    pub fn dump<W: Write + Seek>(
        &self,
        record: &Record,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError> {
        crate::engine::dump(record, self, writer)
    }
}

fn validate(schema: &str, fields: &[FieldSpec]) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(fields.len());
    let last = fields.len().saturating_sub(1);

    for (index, field) in fields.iter().enumerate() {
        if field.name.is_empty() {
            return Err(SchemaError::EmptyFieldName {
                schema: schema.to_string(),
                index,
            });
        }

        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                schema: schema.to_string(),
                field: field.name.clone(),
            });
        }

        if let FieldKind::Array(spec) = &field.kind {
            if spec.element.is_open_ended() {
                return Err(SchemaError::OpenEndedElement {
                    schema: schema.to_string(),
                    field: field.name.clone(),
                });
            }

            if spec.count == ArrayCount::UntilExhausted && spec.element.static_size() == 0 {
                return Err(SchemaError::ZeroSizedElement {
                    schema: schema.to_string(),
                    field: field.name.clone(),
                });
            }
        }

        if field.kind.is_open_ended() && index != last {
            return Err(SchemaError::OpenEndedNotLast {
                schema: schema.to_string(),
                field: field.name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        field::{ArraySpec, ByteSpan},
        primitive::PrimitiveKind,
    };

    use super::*;

    #[test]
    fn test_empty_schema() {
        let schema = Schema::new("Empty", None, vec![]).unwrap();
        assert!(schema.fields().is_empty());
        assert!(!schema.is_open_ended());
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let schema = Schema::new(
            "Header",
            Some(ByteOrder::Big),
            vec![
                FieldSpec::new("magic", ByteSpan::Fixed(2)),
                FieldSpec::new("size", PrimitiveKind::U32),
                FieldSpec::new("flags", PrimitiveKind::U16),
            ],
        )
        .unwrap();

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["magic", "size", "flags"]);
        assert_eq!(schema.order(), Some(ByteOrder::Big));
        assert_eq!(
            schema.field("size").map(|f| &f.kind),
            Some(&FieldKind::Primitive(PrimitiveKind::U32))
        );
    }

    #[test]
    fn test_duplicate_field_name() {
        let result = Schema::new(
            "Dup",
            None,
            vec![
                FieldSpec::new("a", PrimitiveKind::U8),
                FieldSpec::new("a", PrimitiveKind::U16),
            ],
        );
        assert_eq!(
            result.unwrap_err(),
            SchemaError::DuplicateField {
                schema: "Dup".to_string(),
                field: "a".to_string()
            }
        );
    }

    #[test]
    fn test_empty_field_name() {
        let result = Schema::new("S", None, vec![FieldSpec::new("", PrimitiveKind::U8)]);
        assert_eq!(
            result.unwrap_err(),
            SchemaError::EmptyFieldName {
                schema: "S".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn test_remainder_must_be_last() {
        let result = Schema::new(
            "S",
            None,
            vec![
                FieldSpec::new("rest", ByteSpan::Remainder),
                FieldSpec::new("tail", PrimitiveKind::U8),
            ],
        );
        assert_eq!(
            result.unwrap_err(),
            SchemaError::OpenEndedNotLast {
                schema: "S".to_string(),
                field: "rest".to_string()
            }
        );

        let ok = Schema::new(
            "S",
            None,
            vec![
                FieldSpec::new("head", PrimitiveKind::U8),
                FieldSpec::new("rest", ByteSpan::Remainder),
            ],
        )
        .unwrap();
        assert!(ok.is_open_ended());
    }

    #[test]
    fn test_open_ended_nested_schema_must_be_last() {
        let tail = Schema::new("Tail", None, vec![FieldSpec::new("rest", ByteSpan::Remainder)])
            .unwrap();
        let result = Schema::new(
            "Outer",
            None,
            vec![
                FieldSpec::new("tail", tail),
                FieldSpec::new("after", PrimitiveKind::U8),
            ],
        );
        assert!(matches!(
            result.unwrap_err(),
            SchemaError::OpenEndedNotLast { field, .. } if field == "tail"
        ));
    }

    #[test]
    fn test_open_ended_array_element() {
        let result = Schema::new(
            "S",
            None,
            vec![FieldSpec::new(
                "chunks",
                ArraySpec::new(ByteSpan::Remainder, ArrayCount::Fixed(2)),
            )],
        );
        assert!(matches!(
            result.unwrap_err(),
            SchemaError::OpenEndedElement { .. }
        ));
    }

    #[test]
    fn test_zero_sized_exhaustion_element() {
        let result = Schema::new(
            "S",
            None,
            vec![FieldSpec::new(
                "items",
                ArraySpec::new(ByteSpan::Fixed(0), ArrayCount::UntilExhausted),
            )],
        );
        assert!(matches!(
            result.unwrap_err(),
            SchemaError::ZeroSizedElement { .. }
        ));

        let fixed_zero = Schema::new(
            "S",
            None,
            vec![FieldSpec::new(
                "items",
                ArraySpec::new(ByteSpan::Fixed(0), ArrayCount::Fixed(3)),
            )],
        );
        assert!(fixed_zero.is_ok());
    }
}
