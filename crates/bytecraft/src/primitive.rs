//! Fixed-width integer kinds and the byte orders they are encoded in.

use std::fmt;

use byteorder::{BigEndian, LittleEndian};

use crate::value::Value;

/// Byte order used for multi-byte primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Big,
    Little,
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::Little
    }
}

impl ByteOrder {
    /// Resolves `big`/`little` (any case, `be`/`le` accepted).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "big" | "be" | "big_endian" => Some(ByteOrder::Big),
            "little" | "le" | "little_endian" => Some(ByteOrder::Little),
            _ => None,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Big => f.write_str("big"),
            ByteOrder::Little => f.write_str("little"),
        }
    }
}

/// One of the eight fixed-width integer encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::U8,
        PrimitiveKind::U16,
        PrimitiveKind::U32,
        PrimitiveKind::U64,
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
    ];

    /// Encoded size in bytes.
    pub const fn width(self) -> usize {
        match self {
            PrimitiveKind::U8 | PrimitiveKind::I8 => 1,
            PrimitiveKind::U16 | PrimitiveKind::I16 => 2,
            PrimitiveKind::U32 | PrimitiveKind::I32 => 4,
            PrimitiveKind::U64 | PrimitiveKind::I64 => 8,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64
        )
    }

    /// Resolves a kind token. Accepts Rust names (`u32`) and the Windows names
    /// (`BYTE`, `WORD`, `DWORD`, `QWORD`, `CHAR`, `SHORT`, `LONG`, `LLONG`), any case.
    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token.to_ascii_lowercase().as_str() {
            "u8" | "byte" => PrimitiveKind::U8,
            "u16" | "word" => PrimitiveKind::U16,
            "u32" | "dword" => PrimitiveKind::U32,
            "u64" | "qword" => PrimitiveKind::U64,
            "i8" | "char" => PrimitiveKind::I8,
            "i16" | "short" => PrimitiveKind::I16,
            "i32" | "long" => PrimitiveKind::I32,
            "i64" | "llong" => PrimitiveKind::I64,
            _ => return None,
        };
        Some(kind)
    }

    /// Decodes `bytes` (exactly [PrimitiveKind::width] long) in the given order.
    pub fn decode(self, bytes: &[u8], order: ByteOrder) -> Value {
        match order {
            ByteOrder::Big => self.decode_with::<BigEndian>(bytes),
            ByteOrder::Little => self.decode_with::<LittleEndian>(bytes),
        }
    }

    fn decode_with<B: byteorder::ByteOrder>(self, bytes: &[u8]) -> Value {
        match self {
            PrimitiveKind::U8 => Value::U8(bytes[0]),
            PrimitiveKind::U16 => Value::U16(B::read_u16(bytes)),
            PrimitiveKind::U32 => Value::U32(B::read_u32(bytes)),
            PrimitiveKind::U64 => Value::U64(B::read_u64(bytes)),
            PrimitiveKind::I8 => Value::I8(bytes[0] as i8),
            PrimitiveKind::I16 => Value::I16(B::read_i16(bytes)),
            PrimitiveKind::I32 => Value::I32(B::read_i32(bytes)),
            PrimitiveKind::I64 => Value::I64(B::read_i64(bytes)),
        }
    }

    /// Encodes `value` into `buf[..width]`. Returns `false` if the value is not of this kind.
    pub fn encode(self, value: &Value, order: ByteOrder, buf: &mut [u8; 8]) -> bool {
        match order {
            ByteOrder::Big => self.encode_with::<BigEndian>(value, buf),
            ByteOrder::Little => self.encode_with::<LittleEndian>(value, buf),
        }
    }

    fn encode_with<B: byteorder::ByteOrder>(self, value: &Value, buf: &mut [u8; 8]) -> bool {
        match (self, value) {
            (PrimitiveKind::U8, Value::U8(v)) => buf[0] = *v,
            (PrimitiveKind::U16, Value::U16(v)) => B::write_u16(buf, *v),
            (PrimitiveKind::U32, Value::U32(v)) => B::write_u32(buf, *v),
            (PrimitiveKind::U64, Value::U64(v)) => B::write_u64(buf, *v),
            (PrimitiveKind::I8, Value::I8(v)) => buf[0] = *v as u8,
            (PrimitiveKind::I16, Value::I16(v)) => B::write_i16(buf, *v),
            (PrimitiveKind::I32, Value::I32(v)) => B::write_i32(buf, *v),
            (PrimitiveKind::I64, Value::I64(v)) => B::write_i64(buf, *v),
            _ => return false,
        }
        true
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
        };
        f.write_str(name)
    }
}
