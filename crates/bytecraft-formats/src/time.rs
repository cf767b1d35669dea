//! Unix timestamps stored as 32- or 64-bit integers.

use std::sync::Arc;

use bytecraft::{
    builder::SchemaBuilder, errors::SchemaError, primitive::PrimitiveKind, record::Record,
    schema::Schema,
};
use chrono::{DateTime, TimeZone, Utc};

pub fn time64_schema() -> Result<Arc<Schema>, SchemaError> {
    SchemaBuilder::new("Time64")
        .primitive("timestamp", PrimitiveKind::U64)
        .build()
}

pub fn time32_schema() -> Result<Arc<Schema>, SchemaError> {
    SchemaBuilder::new("Time32")
        .primitive("timestamp", PrimitiveKind::U32)
        .build()
}

/// Reads the `timestamp` field of a Time64/Time32 record as seconds since the epoch.
pub fn timestamp_to_datetime(record: &Record) -> Option<DateTime<Utc>> {
    let seconds = record.get("timestamp")?.as_i64()?;
    Utc.timestamp_opt(seconds, 0).single()
}

#[cfg(test)]
mod tests {
    use bytecraft::{primitive::ByteOrder, stream::Reader};

    use super::*;

    #[test]
    fn test_time64() {
        let schema = time64_schema().unwrap();
        let bytes = 1_700_000_000u64.to_be_bytes();
        let mut reader = Reader::with_byte_order(std::io::Cursor::new(&bytes[..]), ByteOrder::Big);
        let record = schema.parse(&mut reader).unwrap();

        let time = timestamp_to_datetime(&record).unwrap();
        assert_eq!(time.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_time32_sizes() {
        assert_eq!(time32_schema().unwrap().static_size(), 4);
        assert_eq!(time64_schema().unwrap().static_size(), 8);
    }

    #[test]
    fn test_out_of_range() {
        let schema = time64_schema().unwrap();
        let record = schema
            .parse(&mut Reader::from_slice(&u64::MAX.to_le_bytes()))
            .unwrap();
        assert_eq!(timestamp_to_datetime(&record), None);
    }
}
