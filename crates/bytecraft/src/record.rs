//! Ordered name → value mapping produced by parsing a [Schema].

use std::{
    io::{Seek, Write},
    sync::Arc,
};

use crate::{errors::WriteError, schema::Schema, stream::Writer, value::Value};

/// Result of applying a [Schema] to a stream. Values are kept in schema order and the
/// record keeps the schema that produced it, so it can be dumped back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<(String, Value)>,
}

impl Record {
    /// Pairs values with a schema, e.g. to build a record for [Record::dump].
    /// Values are not checked here; mismatches surface when dumping.
    pub fn new(schema: Arc<Schema>, values: Vec<(String, Value)>) -> Self {
        Record { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Follows nested records, e.g. `["infoHeader", "biWidth"]`.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut record = self;
        for name in parents {
            record = record.get(name)?.as_record()?;
        }
        record.get(last)
    }

    /// Shorthand for `get(name)` followed by [Value::as_u64].
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<(String, Value)> {
        self.values
    }

    /// Dumps this record with the schema it carries.
    pub fn dump<W: Write + Seek>(&self, writer: &mut Writer<W>) -> Result<(), WriteError> {
        crate::engine::dump(self, &self.schema, writer)
    }
}
