//! aria2 DHT routing table cache (`dht.dat`).

use std::io::{Read, Seek};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use bytecraft::{
    builder::{SchemaBuilder, parse_dependent},
    field::{ArrayCount, ByteSpan},
    primitive::{ByteOrder, PrimitiveKind},
    record::Record,
    schema::Schema,
    stream::Reader,
    value::Value,
};
use tracing::debug;

use crate::errors::{FormatError, Result};
use crate::time::time64_schema;

pub const MAGIC: [u8; 2] = [0xa1, 0xa2];

pub fn header_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("DHTHeader")
        .order(ByteOrder::Big)
        .bytes("magic", ByteSpan::Fixed(2))
        .primitive("format", PrimitiveKind::U8)
        .bytes("reserved1", ByteSpan::Fixed(3))
        .primitive("version", PrimitiveKind::U16)
        .nested("mtime", &time64_schema()?)
        .bytes("reserved2", ByteSpan::Fixed(8))
        .bytes("localNodeID", ByteSpan::Fixed(20))
        .bytes("reserved3", ByteSpan::Fixed(4))
        .primitive("numNode", PrimitiveKind::U32)
        .bytes("reserved4", ByteSpan::Fixed(4))
        .build()?)
}

/// Peer address in compact form. `length` is 6 for IPv4 and 18 for IPv6.
pub fn compact_peer_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("CompactPeerInfo")
        .primitive("length", PrimitiveKind::U8)
        .bytes("reserved", ByteSpan::Fixed(7))
        .bytes("address", ByteSpan::Fixed(24))
        .build()?)
}

pub fn content_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("DHTContent")
        .nested("info", &compact_peer_schema()?)
        .bytes("nodeID", ByteSpan::Fixed(20))
        .bytes("reserved", ByteSpan::Fixed(4))
        .build()?)
}

/// Header followed by `numNode` node entries.
pub fn dht_schema(header: &Record) -> Result<Arc<Schema>> {
    let count = header
        .get_u64("numNode")
        .ok_or_else(|| FormatError::invalid_header("ARIA2DHT", "missing numNode"))?;
    let count = usize::try_from(count)
        .map_err(|_| FormatError::invalid_header("ARIA2DHT", format!("{count} nodes")))?;
    debug!(count, "dht node entries");

    Ok(SchemaBuilder::new("DHT")
        .order(ByteOrder::Big)
        .nested("header", header.schema())
        .array("contents", content_schema()?, ArrayCount::Fixed(count))
        .build()?)
}

pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Record> {
    parse_dependent(&header_schema()?, reader, dht_schema)
}

/// Decodes the address of a `CompactPeerInfo` record. The port is big-endian.
pub fn compact_peer(info: &Record) -> Option<SocketAddr> {
    let address = info.get("address").and_then(Value::as_bytes)?;
    let (ip, port): (IpAddr, &[u8]) = match info.get_u64("length")? {
        6 => {
            let octets: [u8; 4] = address.get(..4)?.try_into().ok()?;
            (Ipv4Addr::from(octets).into(), address.get(4..6)?)
        }
        18 => {
            let octets: [u8; 16] = address.get(..16)?.try_into().ok()?;
            (Ipv6Addr::from(octets).into(), address.get(16..18)?)
        }
        _ => return None,
    };
    let port = u16::from_be_bytes(port.try_into().ok()?);
    Some(SocketAddr::new(ip, port))
}
