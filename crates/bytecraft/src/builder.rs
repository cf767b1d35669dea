//! Building schemas at runtime, including schemas whose shape depends on data already parsed.
//!
//! A dependent format is read in two phases: a fixed-size probe schema is parsed first,
//! the probe [Record] is inspected to build the combined schema, then the stream is
//! rewound and the combined schema is parsed once. See [parse_dependent].

use std::{
    io::{Read, Seek},
    sync::Arc,
};

use tracing::debug;

use crate::{
    errors::{ReadError, SchemaError},
    field::{ArrayCount, ArraySpec, ByteSpan, ElementKind, FieldKind, FieldSpec},
    primitive::{ByteOrder, PrimitiveKind},
    record::Record,
    schema::Schema,
    stream::Reader,
};

/// Fluent builder for [Schema]. Validation happens in [SchemaBuilder::build].
///
/// ```
/// use bytecraft::builder::SchemaBuilder;
/// use bytecraft::field::{ArrayCount, ByteSpan};
/// use bytecraft::primitive::{ByteOrder, PrimitiveKind};
///
/// let entry = SchemaBuilder::new("Entry")
///     .primitive("id", PrimitiveKind::U16)
///     .bytes("tag", ByteSpan::Fixed(2))
///     .build()
///     .unwrap();
///
/// let table = SchemaBuilder::new("Table")
///     .order(ByteOrder::Big)
///     .primitive("count", PrimitiveKind::U32)
///     .array("entries", entry, ArrayCount::Fixed(3))
///     .build()
///     .unwrap();
///
/// assert_eq!(table.static_size(), 4 + 3 * 4);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    order: Option<ByteOrder>,
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        SchemaBuilder {
            name: name.into(),
            order: None,
            fields: Vec::new(),
        }
    }

    /// Byte order applied over the whole schema.
    pub fn order(mut self, order: ByteOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn kind(self, name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        self.field(FieldSpec::new(name, kind))
    }

    pub fn primitive(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.kind(name, kind)
    }

    pub fn bytes(self, name: impl Into<String>, span: ByteSpan) -> Self {
        self.kind(name, span)
    }

    pub fn array(
        self,
        name: impl Into<String>,
        element: impl Into<ElementKind>,
        count: ArrayCount,
    ) -> Self {
        self.kind(name, ArraySpec::new(element, count))
    }

    pub fn nested(self, name: impl Into<String>, schema: &Arc<Schema>) -> Self {
        self.kind(name, Arc::clone(schema))
    }

    /// Appends the fields of `schema` inline. If `schema` declares a byte order it is
    /// carried onto each copied field that has no override of its own.
    pub fn extend(mut self, schema: &Schema) -> Self {
        self.fields.extend(schema.fields().iter().map(|field| {
            let mut field = field.clone();
            field.order = field.order.or(schema.order());
            field
        }));
        self
    }

    /// Applies `f` only when `condition` holds; for layouts with optional fields.
    pub fn when(self, condition: bool, f: impl FnOnce(Self) -> Self) -> Self {
        if condition { f(self) } else { self }
    }

    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        Schema::new(self.name, self.order, self.fields)
    }
}

/// Runs the two-phase dependent parse.
///
/// Parses `probe` at the current position, hands the probe record to `build` to obtain
/// the combined schema, seeks back to where the probe started and parses the combined
/// schema once, so the header fields come from the same record as the tail.
pub fn parse_dependent<R, F, E>(
    probe: &Arc<Schema>,
    reader: &mut Reader<R>,
    build: F,
) -> Result<Record, E>
where
    R: Read + Seek,
    F: FnOnce(&Record) -> Result<Arc<Schema>, E>,
    E: From<ReadError>,
{
    let start = reader.tell()?;
    let header = probe.parse(reader)?;
    debug!(probe = probe.name(), start, "probe parsed");

    let combined = build(&header)?;
    debug!(schema = combined.name(), fields = combined.fields().len(), "built combined schema");

    reader.seek(start)?;
    Ok(combined.parse(reader)?)
}

#[cfg(test)]
mod tests {
    use crate::{errors::Error, value::Value};

    use super::*;

    fn header() -> Arc<Schema> {
        SchemaBuilder::new("Header")
            .bytes("magic", ByteSpan::Fixed(2))
            .primitive("count", PrimitiveKind::U8)
            .primitive("width", PrimitiveKind::U8)
            .build()
            .unwrap()
    }

    #[test]
    fn test_extend_carries_schema_order() {
        let be = SchemaBuilder::new("Be")
            .order(ByteOrder::Big)
            .primitive("a", PrimitiveKind::U16)
            .field(FieldSpec::new("b", PrimitiveKind::U16).with_order(ByteOrder::Little))
            .build()
            .unwrap();
        let flat = SchemaBuilder::new("Flat").extend(&be).build().unwrap();

        assert_eq!(flat.order(), None);
        assert_eq!(flat.fields()[0].order, Some(ByteOrder::Big));
        assert_eq!(flat.fields()[1].order, Some(ByteOrder::Little));
    }

    #[test]
    fn test_when() {
        let schema = SchemaBuilder::new("Optional")
            .primitive("a", PrimitiveKind::U8)
            .when(false, |b| b.primitive("b", PrimitiveKind::U8))
            .when(true, |b| b.primitive("c", PrimitiveKind::U8))
            .build()
            .unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_build_validates() {
        let result = SchemaBuilder::new("Bad")
            .primitive("x", PrimitiveKind::U8)
            .primitive("x", PrimitiveKind::U8)
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn test_parse_dependent() {
        // Header says 2 rows of 3 bytes; one leading byte before the document.
        let data = [0xee, b'D', b'P', 2, 3, 1, 2, 3, 4, 5, 6];
        let mut reader = Reader::from_slice(&data);
        reader.seek(1).unwrap();

        let header = header();
        let record = parse_dependent(&header, &mut reader, |probe| {
            let as_len = |name: &str| {
                probe
                    .get_u64(name)
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(0)
            };
            let count = as_len("count");
            let width = as_len("width");
            SchemaBuilder::new("Document")
                .nested("header", &header)
                .array("rows", ByteSpan::Fixed(width), ArrayCount::Fixed(count))
                .build()
                .map_err(Error::from)
        })
        .unwrap();

        assert_eq!(
            record.get_path(&["header", "magic"]),
            Some(&Value::Bytes(b"DP".to_vec()))
        );
        assert_eq!(
            record.get("rows"),
            Some(&Value::Array(vec![
                Value::Bytes(vec![1, 2, 3]),
                Value::Bytes(vec![4, 5, 6])
            ]))
        );
        assert_eq!(reader.tell().unwrap(), data.len() as u64);
    }

    #[test]
    fn test_parse_dependent_build_error() {
        let data = [b'D', b'P', 1, 1, 0];
        let mut reader = Reader::from_slice(&data);
        let result = parse_dependent(&header(), &mut reader, |_| {
            SchemaBuilder::new("Broken")
                .bytes("rest", ByteSpan::Remainder)
                .primitive("after", PrimitiveKind::U8)
                .build()
                .map_err(Error::from)
        });
        assert!(matches!(
            result,
            Err(Error::Schema(SchemaError::OpenEndedNotLast { .. }))
        ));
    }

    #[test]
    fn test_parse_dependent_short_probe() {
        let data = [b'D'];
        let mut reader = Reader::from_slice(&data);
        let result: Result<Record, Error> =
            parse_dependent(&header(), &mut reader, |_| unreachable!());
        assert!(matches!(result, Err(Error::Read(_))));
    }
}
