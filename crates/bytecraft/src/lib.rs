//! # bytecraft
//!
//! A library for byte-level parsing of binary files using declarative schemas.
//!
//! Describe a layout as an ordered list of typed fields (fixed-width integers, byte
//! spans, arrays, nested schemas) with optional per-schema or per-field byte order,
//! then parse a seekable stream into a [Record](record::Record) or dump a record back
//! into bytes. Schemas whose later fields depend on values parsed earlier are built at
//! runtime with [SchemaBuilder](builder::SchemaBuilder) and read with
//! [parse_dependent](builder::parse_dependent).
//!
//! ## Example
//!
//! ```
//! use bytecraft::builder::SchemaBuilder;
//! use bytecraft::field::ByteSpan;
//! use bytecraft::primitive::{ByteOrder, PrimitiveKind};
//! use bytecraft::stream::{Reader, Writer};
//! use bytecraft::value::Value;
//!
//! let schema = SchemaBuilder::new("Chunk")
//!     .order(ByteOrder::Big)
//!     .bytes("tag", ByteSpan::Fixed(4))
//!     .primitive("len", PrimitiveKind::U32)
//!     .bytes("data", ByteSpan::Remainder)
//!     .build()
//!     .unwrap();
//!
//! let data = b"IHDR\x00\x00\x00\x02hi";
//! let record = schema.parse(&mut Reader::from_slice(data)).unwrap();
//! assert_eq!(record.get("len"), Some(&Value::U32(2)));
//! assert_eq!(record.get("data"), Some(&Value::Bytes(b"hi".to_vec())));
//!
//! let mut writer = Writer::in_memory();
//! record.dump(&mut writer).unwrap();
//! assert_eq!(writer.into_bytes(), data.to_vec());
//! ```

pub mod builder;
pub mod def;
pub mod engine;
pub mod errors;
pub mod field;
pub mod primitive;
pub mod record;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod size;
pub mod stream;
pub mod value;

pub use errors::{Error, Result};
