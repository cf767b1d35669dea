//! Recursive parse/dump driven by a [Schema].
//!
//! Every field kind implements [Codec]; the engine walks the schema's fields in order,
//! applies schema- and field-level byte-order overrides through
//! [ByteOrderScope::scoped] and wraps failures with the schema and field name.

use std::{
    io::{Read, Seek, Write},
    sync::Arc,
};

use tracing::{trace, warn};

use crate::{
    errors::{ReadError, WriteError},
    field::{ArrayCount, ArraySpec, ByteSpan, ElementKind, FieldKind, FieldSpec},
    primitive::PrimitiveKind,
    record::Record,
    schema::Schema,
    stream::{ByteOrderScope, Reader, Writer},
    value::Value,
};

// Upper bound on capacity reserved from a declared array count.
const MAX_PREALLOCATED_ELEMENTS: usize = 4096;

/// Something that can be read from and written to a byte stream as a [Value].
pub trait Codec {
    fn parse_value<R: Read + Seek>(&self, reader: &mut Reader<R>) -> Result<Value, ReadError>;

    fn dump_value<W: Write + Seek>(
        &self,
        value: &Value,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError>;
}

/// Parses `schema` from the current position of `reader`.
///
/// No partial record is returned on failure; the stream is left wherever the failing
/// read stopped, with its byte order restored.
pub fn parse<R: Read + Seek>(
    schema: &Arc<Schema>,
    reader: &mut Reader<R>,
) -> Result<Record, ReadError> {
    reader.scoped(schema.order(), |reader| {
        let mut values = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = parse_field(schema, field, reader)?;
            values.push((field.name.clone(), value));
        }

        Ok(Record::new(Arc::clone(schema), values))
    })
}

fn parse_field<R: Read + Seek>(
    schema: &Schema,
    field: &FieldSpec,
    reader: &mut Reader<R>,
) -> Result<Value, ReadError> {
    trace!(schema = schema.name(), field = %field.name, kind = %field.kind, "parse field");

    reader
        .scoped(field.order, |reader| field.kind.parse_value(reader))
        .map_err(|source| ReadError::Field {
            schema: schema.name().to_string(),
            field: field.name.clone(),
            source: Box::new(source),
        })
}

/// Writes `record` following `schema`. Values are looked up by field name.
pub fn dump<W: Write + Seek>(
    record: &Record,
    schema: &Schema,
    writer: &mut Writer<W>,
) -> Result<(), WriteError> {
    writer.scoped(schema.order(), |writer| {
        for field in schema.fields() {
            let value = record
                .get(&field.name)
                .ok_or_else(|| WriteError::MissingField {
                    schema: schema.name().to_string(),
                    field: field.name.clone(),
                })?;
            dump_field(schema, field, value, writer)?;
        }

        Ok(())
    })
}

fn dump_field<W: Write + Seek>(
    schema: &Schema,
    field: &FieldSpec,
    value: &Value,
    writer: &mut Writer<W>,
) -> Result<(), WriteError> {
    trace!(schema = schema.name(), field = %field.name, kind = %field.kind, "dump field");

    writer
        .scoped(field.order, |writer| field.kind.dump_value(value, writer))
        .map_err(|source| WriteError::Field {
            schema: schema.name().to_string(),
            field: field.name.clone(),
            source: Box::new(source),
        })
}

fn unknown_type(expected: &impl ToString, value: &Value) -> WriteError {
    WriteError::UnknownType {
        expected: expected.to_string(),
        found: value.kind_name(),
    }
}

impl Codec for PrimitiveKind {
    fn parse_value<R: Read + Seek>(&self, reader: &mut Reader<R>) -> Result<Value, ReadError> {
        reader.read_primitive(*self)
    }

    fn dump_value<W: Write + Seek>(
        &self,
        value: &Value,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError> {
        writer.write_primitive(*self, value)
    }
}

impl Codec for ByteSpan {
    fn parse_value<R: Read + Seek>(&self, reader: &mut Reader<R>) -> Result<Value, ReadError> {
        Ok(Value::Bytes(reader.read_bytes(*self)?))
    }

    fn dump_value<W: Write + Seek>(
        &self,
        value: &Value,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError> {
        let bytes = value.as_bytes().ok_or_else(|| unknown_type(self, value))?;

        if let ByteSpan::Fixed(n) = *self {
            if bytes.len() != n {
                warn!(declared = n, actual = bytes.len(), "byte span length differs from declaration");
            }
        }

        writer.write_bytes(bytes)
    }
}

impl Codec for Arc<Schema> {
    fn parse_value<R: Read + Seek>(&self, reader: &mut Reader<R>) -> Result<Value, ReadError> {
        Ok(Value::Record(parse(self, reader)?))
    }

    fn dump_value<W: Write + Seek>(
        &self,
        value: &Value,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError> {
        let record = value
            .as_record()
            .ok_or_else(|| unknown_type(&format!("schema {}", self.name()), value))?;
        dump(record, self, writer)
    }
}

impl Codec for ElementKind {
    fn parse_value<R: Read + Seek>(&self, reader: &mut Reader<R>) -> Result<Value, ReadError> {
        match self {
            ElementKind::Primitive(kind) => kind.parse_value(reader),
            ElementKind::Bytes(span) => span.parse_value(reader),
            ElementKind::Nested(schema) => schema.parse_value(reader),
        }
    }

    fn dump_value<W: Write + Seek>(
        &self,
        value: &Value,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError> {
        match self {
            ElementKind::Primitive(kind) => kind.dump_value(value, writer),
            ElementKind::Bytes(span) => span.dump_value(value, writer),
            ElementKind::Nested(schema) => schema.dump_value(value, writer),
        }
    }
}

impl Codec for ArraySpec {
    fn parse_value<R: Read + Seek>(&self, reader: &mut Reader<R>) -> Result<Value, ReadError> {
        match self.count {
            ArrayCount::Fixed(count) => {
                let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED_ELEMENTS));
                for _ in 0..count {
                    values.push(self.element.parse_value(reader)?);
                }

                Ok(Value::Array(values))
            }
            ArrayCount::UntilExhausted => {
                let mut values = Vec::new();
                while !reader.is_exhausted()? {
                    let offset = reader.tell()?;
                    match self.element.parse_value(reader) {
                        Ok(value) => values.push(value),
                        // A short read consumed everything left, so the position is now the end.
                        Err(err) if matches!(err.root(), ReadError::UnexpectedEof { .. }) => {
                            let remaining = reader.tell()?.saturating_sub(offset);
                            return Err(ReadError::IncompleteElement { offset, remaining });
                        }
                        Err(err) => return Err(err),
                    }
                }

                trace!(elements = values.len(), "array exhausted stream");
                Ok(Value::Array(values))
            }
        }
    }

    fn dump_value<W: Write + Seek>(
        &self,
        value: &Value,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError> {
        let values = value.as_array().ok_or_else(|| unknown_type(self, value))?;

        if let ArrayCount::Fixed(count) = self.count {
            if values.len() != count {
                warn!(declared = count, actual = values.len(), "array length differs from declaration");
            }
        }

        for value in values {
            self.element.dump_value(value, writer)?;
        }

        Ok(())
    }
}

impl Codec for FieldKind {
    fn parse_value<R: Read + Seek>(&self, reader: &mut Reader<R>) -> Result<Value, ReadError> {
        match self {
            FieldKind::Primitive(kind) => kind.parse_value(reader),
            FieldKind::Bytes(span) => span.parse_value(reader),
            FieldKind::Array(spec) => spec.parse_value(reader),
            FieldKind::Nested(schema) => schema.parse_value(reader),
        }
    }

    fn dump_value<W: Write + Seek>(
        &self,
        value: &Value,
        writer: &mut Writer<W>,
    ) -> Result<(), WriteError> {
        match self {
            FieldKind::Primitive(kind) => kind.dump_value(value, writer),
            FieldKind::Bytes(span) => span.dump_value(value, writer),
            FieldKind::Array(spec) => spec.dump_value(value, writer),
            FieldKind::Nested(schema) => schema.dump_value(value, writer),
        }
    }
}
