//! Error types for schema construction, parsing and dumping.

use thiserror::Error;

/// Errors produced when building a [crate::schema::Schema]. Always raised before any stream I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A kind token does not name a known primitive.
    #[error("{schema}.{field}: unknown field kind `{token}`")]
    UnknownKind {
        schema: String,
        field: String,
        token: String,
    },
    /// A byte-order token is neither big nor little.
    #[error("{schema}.{field}: invalid byte order `{token}`")]
    InvalidByteOrder {
        schema: String,
        field: String,
        token: String,
    },
    /// Field name is empty.
    #[error("{schema}: field #{index} has an empty name")]
    EmptyFieldName { schema: String, index: usize },
    /// Two fields share a name.
    #[error("{schema}.{field}: duplicate field name")]
    DuplicateField { schema: String, field: String },
    /// A remainder span or until-exhausted array is followed by another field.
    #[error("{schema}.{field}: open-ended field must be the last field of its schema")]
    OpenEndedNotLast { schema: String, field: String },
    /// An array element is neither a primitive, a byte span nor a schema.
    #[error("{schema}.{field}: array element must be a primitive, a byte span or a schema")]
    InvalidElement { schema: String, field: String },
    /// An array element would consume the rest of the stream.
    #[error("{schema}.{field}: array element must not be open-ended")]
    OpenEndedElement { schema: String, field: String },
    /// An until-exhausted array element consumes no bytes and would never terminate.
    #[error("{schema}.{field}: until-exhausted array element has zero size")]
    ZeroSizedElement { schema: String, field: String },
}

/// Errors produced while reading a stream (e.g. during [crate::engine::parse]).
#[derive(Error, Debug)]
pub enum ReadError {
    /// Fewer bytes remain than a fixed-size read requires.
    #[error("unexpected end of stream at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: u64,
        needed: usize,
        available: usize,
    },
    /// An until-exhausted array ended on a partial element.
    #[error("{remaining} trailing bytes at offset {offset} do not form a complete element")]
    IncompleteElement { offset: u64, remaining: u64 },
    /// Failure inside a named field; wraps the underlying error.
    #[error("{schema}.{field}: {source}")]
    Field {
        schema: String,
        field: String,
        source: Box<ReadError>,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Strips [ReadError::Field] context and returns the error that actually stopped the parse.
    pub fn root(&self) -> &ReadError {
        match self {
            ReadError::Field { source, .. } => source.root(),
            other => other,
        }
    }

    /// Outermost schema name followed by the field names leading to the failure.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let ReadError::Field {
            schema,
            field,
            source,
        } = current
        {
            if path.is_empty() {
                path.push(schema.as_str());
            }
            path.push(field.as_str());
            current = source.as_ref();
        }
        path
    }
}

/// Errors produced while writing a record (e.g. during [crate::engine::dump]).
#[derive(Error, Debug)]
pub enum WriteError {
    /// The record has no value for a field of the schema.
    #[error("{schema}.{field}: missing value")]
    MissingField { schema: String, field: String },
    /// The value's shape has no codec for the declared field kind.
    #[error("no codec writes a {found} value as {expected}")]
    UnknownType {
        expected: String,
        found: &'static str,
    },
    /// Failure inside a named field; wraps the underlying error.
    #[error("{schema}.{field}: {source}")]
    Field {
        schema: String,
        field: String,
        source: Box<WriteError>,
    },
    /// The sink rejected a write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WriteError {
    /// Strips [WriteError::Field] context and returns the underlying error.
    pub fn root(&self) -> &WriteError {
        match self {
            WriteError::Field { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Any error the engine can raise.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_eof() -> ReadError {
        ReadError::Field {
            schema: "Outer".to_string(),
            field: "inner".to_string(),
            source: Box::new(ReadError::Field {
                schema: "Inner".to_string(),
                field: "value".to_string(),
                source: Box::new(ReadError::UnexpectedEof {
                    offset: 4,
                    needed: 2,
                    available: 1,
                }),
            }),
        }
    }

    #[test]
    fn test_root_skips_field_context() {
        let err = nested_eof();
        assert!(matches!(
            err.root(),
            ReadError::UnexpectedEof { needed: 2, .. }
        ));
    }

    #[test]
    fn test_path() {
        assert_eq!(nested_eof().path(), vec!["Outer", "inner", "value"]);
    }

    #[test]
    fn test_display_includes_path() {
        assert_eq!(
            nested_eof().to_string(),
            "Outer.inner: Inner.value: unexpected end of stream at offset 4: needed 2 bytes, 1 available"
        );
    }
}
