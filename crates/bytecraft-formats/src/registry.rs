//! Maps file extensions to parse handlers.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use bytecraft::{builder::SchemaBuilder, field::ByteSpan, record::Record, schema::Schema, stream::Reader};
use tracing::{debug, info};

use crate::errors::{FormatError, Result};
use crate::{bmp, dht};

/// Any seekable byte source; lets handlers share one reader type.
pub trait Source: Read + Seek {}

impl<T: Read + Seek> Source for T {}

pub type DynReader = Reader<Box<dyn Source>>;

pub type ParseHandler = fn(&mut DynReader) -> Result<Record>;

/// Schema used when no handler matches: the whole input as one `data` span.
pub fn opaque_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("Opaque")
        .bytes("data", ByteSpan::Remainder)
        .build()?)
}

pub fn parse_opaque<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Record> {
    Ok(opaque_schema()?.parse(reader)?)
}

/// Extension keys are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    handlers: HashMap<String, ParseHandler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bitmap (`BMP`) and aria2 DHT (`ARIA2DHT`) handlers.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("BMP", bmp::parse::<Box<dyn Source>>);
        registry.register("ARIA2DHT", dht::parse::<Box<dyn Source>>);
        registry
    }

    /// Returns the handler previously registered for `extension`, if any.
    pub fn register(&mut self, extension: &str, handler: ParseHandler) -> Option<ParseHandler> {
        self.handlers.insert(extension.to_uppercase(), handler)
    }

    pub fn handler(&self, extension: &str) -> Option<ParseHandler> {
        self.handlers.get(&extension.to_uppercase()).copied()
    }

    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions = self.handlers.keys().map(String::as_str).collect::<Vec<_>>();
        extensions.sort_unstable();
        extensions
    }

    /// Parses with the handler for `extension`, or as one opaque span when there is none.
    pub fn parse(&self, reader: &mut DynReader, extension: &str) -> Result<Record> {
        match self.handler(extension) {
            Some(handler) => handler(reader),
            None => {
                debug!(extension, "no handler registered, reading opaque data");
                parse_opaque(reader)
            }
        }
    }

    /// Opens `path` and parses it. Without an explicit `extension` the one in the
    /// file name is used.
    pub fn parse_file(&self, path: &Path, extension: Option<&str>) -> Result<Record> {
        let extension = extension
            .or_else(|| path.extension().and_then(|ext| ext.to_str()))
            .unwrap_or_default();
        let file = File::open(path).map_err(|source| FormatError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), extension, "parsing file");

        let source: Box<dyn Source> = Box::new(BufReader::new(file));
        self.parse(&mut Reader::new(source), extension)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytecraft::{primitive::PrimitiveKind, value::Value};

    use super::*;

    fn reader(data: &[u8]) -> DynReader {
        let source: Box<dyn Source> = Box::new(Cursor::new(data.to_vec()));
        Reader::new(source)
    }

    fn first_byte(reader: &mut DynReader) -> Result<Record> {
        let schema = SchemaBuilder::new("First")
            .primitive("first", PrimitiveKind::U8)
            .build()?;
        Ok(schema.parse(reader)?)
    }

    #[test]
    fn test_case_insensitive() {
        let registry = Registry::with_builtin();
        assert!(registry.handler("bmp").is_some());
        assert!(registry.handler("Aria2Dht").is_some());
        assert!(registry.handler("png").is_none());
        assert_eq!(registry.extensions(), ["ARIA2DHT", "BMP"]);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::new();
        assert!(registry.register("bin", first_byte).is_none());
        assert!(registry.register("BIN", first_byte).is_some());

        let record = registry.parse(&mut reader(&[7, 8]), "Bin").unwrap();
        assert_eq!(record.get("first"), Some(&Value::U8(7)));
    }

    #[test]
    fn test_opaque_fallback() {
        let registry = Registry::new();
        let record = registry.parse(&mut reader(b"abc"), "xyz").unwrap();
        assert_eq!(record.schema().name(), "Opaque");
        assert_eq!(record.get("data"), Some(&Value::Bytes(b"abc".to_vec())));
    }
}
