//! Seekable byte source and sink with a switchable byte order.
//!
//! Every multi-byte read or write uses the order current at the moment of the call.
//! [ByteOrderScope::scoped] is how the engine applies schema- and field-level overrides.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use crate::{
    errors::{ReadError, WriteError},
    field::ByteSpan,
    primitive::{ByteOrder, PrimitiveKind},
    value::Value,
};

/// Streams whose current byte order can be switched and restored.
pub trait ByteOrderScope {
    fn byte_order(&self) -> ByteOrder;

    /// Sets the current order and returns the previous one.
    fn set_byte_order(&mut self, order: ByteOrder) -> ByteOrder;

    /// Runs `f` with `order` applied (if any) and restores the previous order afterwards,
    /// whether `f` succeeds or fails.
    fn scoped<T, E>(
        &mut self,
        order: Option<ByteOrder>,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        Self: Sized,
    {
        let Some(order) = order else {
            return f(self);
        };

        let previous = self.set_byte_order(order);
        let result = f(self);
        self.set_byte_order(previous);
        result
    }
}

/// Sequential, seekable reader. Defaults to little-endian.
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    order: ByteOrder,
    // Stream length, measured on first use.
    len: Option<u64>,
}

impl<'a> Reader<Cursor<&'a [u8]>> {
    pub fn from_slice(data: &'a [u8]) -> Self {
        Reader::new(Cursor::new(data))
    }
}

impl<R: Read + Seek> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_byte_order(inner, ByteOrder::default())
    }

    pub fn with_byte_order(inner: R, order: ByteOrder) -> Self {
        Reader {
            inner,
            order,
            len: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn tell(&mut self) -> Result<u64, ReadError> {
        Ok(self.inner.stream_position()?)
    }

    /// Moves to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> Result<u64, ReadError> {
        Ok(self.inner.seek(SeekFrom::Start(offset))?)
    }

    fn stream_len(&mut self) -> Result<u64, ReadError> {
        if let Some(len) = self.len {
            return Ok(len);
        }

        let position = self.inner.stream_position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(position))?;
        self.len = Some(len);
        Ok(len)
    }

    /// Bytes between the current position and the end of the stream.
    ///
    /// The length is measured once; later calls only ask for the position, so buffered
    /// sources keep their buffer.
    pub fn remaining(&mut self) -> Result<u64, ReadError> {
        let len = self.stream_len()?;
        let position = self.inner.stream_position()?;
        Ok(len.saturating_sub(position))
    }

    pub fn is_exhausted(&mut self) -> Result<bool, ReadError> {
        Ok(self.remaining()? == 0)
    }

    /// Returns up to `n` upcoming bytes without consuming them.
    pub fn peek(&mut self, n: usize) -> Result<Vec<u8>, ReadError> {
        let mut buf = Vec::with_capacity(n.min(4096));
        (&mut self.inner).take(n as u64).read_to_end(&mut buf)?;
        if !buf.is_empty() {
            self.inner.seek(SeekFrom::Current(-(buf.len() as i64)))?;
        }
        Ok(buf)
    }

    pub fn read_primitive(&mut self, kind: PrimitiveKind) -> Result<Value, ReadError> {
        let width = kind.width();
        let bytes = self.read_exact(width)?;
        Ok(kind.decode(&bytes, self.order))
    }

    /// Reads exactly `n` bytes for [ByteSpan::Fixed], or everything left for [ByteSpan::Remainder].
    pub fn read_bytes(&mut self, span: ByteSpan) -> Result<Vec<u8>, ReadError> {
        match span {
            ByteSpan::Fixed(n) => self.read_exact(n),
            ByteSpan::Remainder => {
                let mut buf = Vec::new();
                self.inner.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }

    // Grows the buffer as data arrives so a bogus length from a header cannot force
    // a huge allocation up front.
    fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, ReadError> {
        let offset = self.inner.stream_position()?;
        let mut buf = Vec::new();
        (&mut self.inner).take(n as u64).read_to_end(&mut buf)?;

        if buf.len() < n {
            return Err(ReadError::UnexpectedEof {
                offset,
                needed: n,
                available: buf.len(),
            });
        }

        Ok(buf)
    }
}

impl<R> ByteOrderScope for Reader<R> {
    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn set_byte_order(&mut self, order: ByteOrder) -> ByteOrder {
        std::mem::replace(&mut self.order, order)
    }
}

/// Sequential, seekable writer. Defaults to little-endian.
#[derive(Debug)]
pub struct Writer<W> {
    inner: W,
    order: ByteOrder,
}

impl Writer<Cursor<Vec<u8>>> {
    pub fn in_memory() -> Self {
        Writer::new(Cursor::new(Vec::new()))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl<W: Write + Seek> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self::with_byte_order(inner, ByteOrder::default())
    }

    pub fn with_byte_order(inner: W, order: ByteOrder) -> Self {
        Writer { inner, order }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn tell(&mut self) -> Result<u64, WriteError> {
        Ok(self.inner.stream_position()?)
    }

    /// Moves to an absolute offset, e.g. to backpatch a length.
    pub fn seek(&mut self, offset: u64) -> Result<u64, WriteError> {
        Ok(self.inner.seek(SeekFrom::Start(offset))?)
    }

    pub fn flush(&mut self) -> Result<(), WriteError> {
        Ok(self.inner.flush()?)
    }

    pub fn write_primitive(&mut self, kind: PrimitiveKind, value: &Value) -> Result<(), WriteError> {
        let mut buf = [0u8; 8];
        if !kind.encode(value, self.order, &mut buf) {
            return Err(WriteError::UnknownType {
                expected: kind.to_string(),
                found: value.kind_name(),
            });
        }

        self.write_bytes(&buf[..kind.width()])
    }

    /// Writes `data` as is; the byte count is always `data.len()`.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError> {
        Ok(self.inner.write_all(data)?)
    }
}

impl<W> ByteOrderScope for Writer<W> {
    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn set_byte_order(&mut self, order: ByteOrder) -> ByteOrder {
        std::mem::replace(&mut self.order, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitive_uses_current_order() {
        let data = [0x00, 0x01, 0x00, 0x01];
        let mut reader = Reader::from_slice(&data);
        assert_eq!(
            reader.read_primitive(PrimitiveKind::U16).unwrap(),
            Value::U16(0x0100)
        );
        reader.set_byte_order(ByteOrder::Big);
        assert_eq!(
            reader.read_primitive(PrimitiveKind::U16).unwrap(),
            Value::U16(0x0001)
        );
    }

    #[test]
    fn test_read_bytes_fixed_and_remainder() {
        let data = [1, 2, 3, 4, 5];
        let mut reader = Reader::from_slice(&data);
        assert_eq!(reader.read_bytes(ByteSpan::Fixed(2)).unwrap(), vec![1, 2]);
        assert_eq!(reader.read_bytes(ByteSpan::Remainder).unwrap(), vec![3, 4, 5]);
        assert_eq!(reader.read_bytes(ByteSpan::Remainder).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_read_bytes_short() {
        let data = [1, 2, 3];
        let mut reader = Reader::from_slice(&data);
        reader.seek(1).unwrap();
        let err = reader.read_bytes(ByteSpan::Fixed(4)).unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnexpectedEof {
                offset: 1,
                needed: 4,
                available: 2
            }
        ));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let data = [9, 8, 7];
        let mut reader = Reader::from_slice(&data);
        assert_eq!(reader.peek(2).unwrap(), vec![9, 8]);
        assert_eq!(reader.tell().unwrap(), 0);
        reader.seek(3).unwrap();
        assert!(reader.peek(1).unwrap().is_empty());
        assert_eq!(reader.remaining().unwrap(), 0);
    }

    #[test]
    fn test_remaining() {
        let data = [0u8; 10];
        let mut reader = Reader::from_slice(&data);
        reader.seek(4).unwrap();
        assert_eq!(reader.remaining().unwrap(), 6);
        assert_eq!(reader.tell().unwrap(), 4);
    }

    #[test]
    fn test_scoped_restores_on_error() {
        let data = [0u8; 1];
        let mut reader = Reader::from_slice(&data);
        let result = reader.scoped(Some(ByteOrder::Big), |reader| {
            assert_eq!(reader.byte_order(), ByteOrder::Big);
            reader.read_primitive(PrimitiveKind::U32)
        });
        assert!(result.is_err());
        assert_eq!(reader.byte_order(), ByteOrder::Little);
    }

    #[test]
    fn test_write_primitive_and_bytes() {
        let mut writer = Writer::in_memory();
        writer.set_byte_order(ByteOrder::Big);
        writer
            .write_primitive(PrimitiveKind::U32, &Value::U32(0x01020304))
            .unwrap();
        writer.write_bytes(&[0xaa]).unwrap();
        assert_eq!(writer.into_bytes(), vec![1, 2, 3, 4, 0xaa]);
    }

    #[test]
    fn test_write_primitive_wrong_value() {
        let mut writer = Writer::in_memory();
        let err = writer
            .write_primitive(PrimitiveKind::U8, &Value::Bytes(vec![1]))
            .unwrap_err();
        assert!(matches!(
            err,
            WriteError::UnknownType { found: "bytes", .. }
        ));
    }

    #[test]
    fn test_writer_seek_backpatch() {
        let mut writer = Writer::in_memory();
        writer.write_bytes(&[0, 0, 7]).unwrap();
        writer.seek(0).unwrap();
        writer.write_bytes(&[5]).unwrap();
        assert_eq!(writer.tell().unwrap(), 1);
        assert_eq!(writer.into_bytes(), vec![5, 0, 7]);
    }
}
