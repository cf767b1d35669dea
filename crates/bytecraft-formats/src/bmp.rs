//! Windows bitmap files.
//!
//! The pixel layout depends on the width, height and bit depth found in the headers,
//! so the full `Bitmap` schema is built per file from a probe of both headers.

use std::io::{Read, Seek};
use std::sync::Arc;

use bytecraft::{
    builder::{SchemaBuilder, parse_dependent},
    field::{ArrayCount, ByteSpan},
    primitive::PrimitiveKind,
    record::Record,
    schema::Schema,
    stream::Reader,
    value::Value,
};
use tracing::debug;

use crate::errors::{FormatError, Result};

const FORMAT: &str = "BMP";

pub fn file_header_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("BMPFileHeader")
        .bytes("bfType", ByteSpan::Fixed(2))
        .primitive("bfSize", PrimitiveKind::U32)
        .primitive("bfReserved1", PrimitiveKind::U16)
        .primitive("bfReserved2", PrimitiveKind::U16)
        .primitive("bfOffBits", PrimitiveKind::U32)
        .build()?)
}

pub fn info_header_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("BMPInfoHeader")
        .primitive("biSize", PrimitiveKind::U32)
        .primitive("biWidth", PrimitiveKind::I32)
        .primitive("biHeight", PrimitiveKind::I32)
        .primitive("biPlanes", PrimitiveKind::U16)
        .primitive("biBitCount", PrimitiveKind::U16)
        .primitive("biCompression", PrimitiveKind::U32)
        .primitive("biSizeImage", PrimitiveKind::U32)
        .primitive("biXPelsPerMeter", PrimitiveKind::I32)
        .primitive("biYPelsPerMeter", PrimitiveKind::I32)
        .primitive("biClrUsed", PrimitiveKind::U32)
        .primitive("biClrImportant", PrimitiveKind::U32)
        .build()?)
}

pub fn rgb_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("RGB")
        .primitive("blue", PrimitiveKind::U8)
        .primitive("green", PrimitiveKind::U8)
        .primitive("red", PrimitiveKind::U8)
        .build()?)
}

/// RGB followed by a reserved byte, often used as alpha.
pub fn rgbr_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("RGBR")
        .primitive("blue", PrimitiveKind::U8)
        .primitive("green", PrimitiveKind::U8)
        .primitive("red", PrimitiveKind::U8)
        .primitive("reserved", PrimitiveKind::U8)
        .build()?)
}

/// Both headers back to back. Parsed first to decide the rest of the layout.
pub fn headers_schema() -> Result<Arc<Schema>> {
    Ok(SchemaBuilder::new("BMPHeaders")
        .nested("fileHeader", &file_header_schema()?)
        .nested("infoHeader", &info_header_schema()?)
        .build()?)
}

/// Value of `biCompression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Compression {
    Rgb = 0,
    Rle8 = 1,
    Rle4 = 2,
    Bitfields = 3,
    Jpeg = 4,
    Png = 5,
    AlphaBitfields = 6,
}

impl Compression {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Compression::Rgb,
            1 => Compression::Rle8,
            2 => Compression::Rle4,
            3 => Compression::Bitfields,
            4 => Compression::Jpeg,
            5 => Compression::Png,
            6 => Compression::AlphaBitfields,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Compression::Rgb => "BI_RGB",
            Compression::Rle8 => "BI_RLE8",
            Compression::Rle4 => "BI_RLE4",
            Compression::Bitfields => "BI_BITFIELDS",
            Compression::Jpeg => "BI_JPEG",
            Compression::Png => "BI_PNG",
            Compression::AlphaBitfields => "BI_ALPHABITFIELDS",
        }
    }
}

fn header_field<'a>(headers: &'a Record, header: &str, field: &str) -> Result<&'a Value> {
    headers
        .get_path(&[header, field])
        .ok_or_else(|| FormatError::invalid_header(FORMAT, format!("missing {header}.{field}")))
}

fn header_u64(headers: &Record, header: &str, field: &str) -> Result<u64> {
    header_field(headers, header, field)?
        .as_u64()
        .ok_or_else(|| FormatError::invalid_header(FORMAT, format!("{header}.{field} is not unsigned")))
}

fn header_i64(headers: &Record, header: &str, field: &str) -> Result<i64> {
    header_field(headers, header, field)?
        .as_i64()
        .ok_or_else(|| FormatError::invalid_header(FORMAT, format!("{header}.{field} is not an integer")))
}

fn header_schema(headers: &Record, header: &str) -> Result<Arc<Schema>> {
    headers
        .get(header)
        .and_then(Value::as_record)
        .map(|record| Arc::clone(record.schema()))
        .ok_or_else(|| FormatError::invalid_header(FORMAT, format!("missing {header}")))
}

fn to_len(value: u64, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| FormatError::invalid_header(FORMAT, format!("{what} of {value} bytes is too large")))
}

/// One row of pixels for the given width and bit depth, padded to a 4-byte stride.
pub fn line_schema(width: u64, bit_count: u64) -> Result<Arc<Schema>> {
    let bytes_per_line = (width * bit_count).div_ceil(8);
    let padding = (4 - bytes_per_line % 4) % 4;

    let builder = SchemaBuilder::new("BMPLine");
    let builder = match bit_count {
        1 | 2 | 4 | 16 => builder.bytes("imageData", ByteSpan::Fixed(to_len(bytes_per_line, "line")?)),
        8 => builder.bytes("colorIndex", ByteSpan::Fixed(to_len(width, "line")?)),
        24 => builder.array("colors", rgb_schema()?, ArrayCount::Fixed(to_len(width, "line")?)),
        32 => builder.array("colors", rgbr_schema()?, ArrayCount::Fixed(to_len(width, "line")?)),
        other => {
            return Err(FormatError::invalid_header(
                FORMAT,
                format!("unsupported bit depth {other}"),
            ));
        }
    };

    Ok(builder
        .when(padding > 0, |b| b.bytes("padBytes", ByteSpan::Fixed(padding as usize)))
        .build()?)
}

/// Builds the combined `Bitmap` schema from a record of [`headers_schema`].
pub fn bitmap_schema(headers: &Record) -> Result<Arc<Schema>> {
    let file_header = header_schema(headers, "fileHeader")?;
    let info_header = header_schema(headers, "infoHeader")?;

    let off_bits = header_u64(headers, "fileHeader", "bfOffBits")?;
    let file_size = header_u64(headers, "fileHeader", "bfSize")?;
    let compression = header_u64(headers, "infoHeader", "biCompression")?;
    let size_image = header_u64(headers, "infoHeader", "biSizeImage")?;

    let headers_size = (file_header.static_size() + info_header.static_size()) as u64;
    let gap = off_bits.saturating_sub(headers_size);

    let builder = SchemaBuilder::new("Bitmap")
        .nested("fileHeader", &file_header)
        .nested("infoHeader", &info_header)
        .when(gap > 0, |b| b.bytes("unknown", ByteSpan::Fixed(gap as usize)));

    let builder = if compression != Compression::Rgb as u64 {
        let len = if size_image > 0 {
            size_image
        } else {
            file_size.checked_sub(off_bits).ok_or_else(|| {
                FormatError::invalid_header(FORMAT, "bfSize is smaller than bfOffBits")
            })?
        };
        debug!(
            compression = Compression::from_u32(compression as u32).map(Compression::name),
            len,
            "compressed pixel data kept raw"
        );
        builder.bytes("rleData", ByteSpan::Fixed(to_len(len, "rleData")?))
    } else {
        let width = header_i64(headers, "infoHeader", "biWidth")?;
        let height = header_i64(headers, "infoHeader", "biHeight")?;
        let bit_count = header_u64(headers, "infoHeader", "biBitCount")?;
        let width = u64::try_from(width)
            .map_err(|_| FormatError::invalid_header(FORMAT, format!("negative width {width}")))?;

        let line = line_schema(width, bit_count)?;
        let rows = to_len(height.unsigned_abs(), "lines")?;
        if line.static_size() == 0 && rows > 0 {
            return Err(FormatError::invalid_header(
                FORMAT,
                format!("{rows} rows of zero width"),
            ));
        }
        debug!(width, rows, bit_count, "uncompressed pixel rows");
        builder.array("lines", line, ArrayCount::Fixed(rows))
    };

    Ok(builder.build()?)
}

/// Parses a whole bitmap file from the current position.
pub fn parse<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Record> {
    let probe = headers_schema()?;
    parse_dependent(&probe, reader, bitmap_schema)
}
