use std::io::{self, Read};

use crate::error::{FormatError, Result, SerdesError};

/// Error returned when a write would exceed the buffer's byte limit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("write would exceed byte buffer limit")]
pub struct BufferFull;

/// A growable byte buffer holding fixed-width big-endian fields and
/// length-prefixed strings. Used as the staging area for an encoded payload.
///
/// An optional byte limit can be set to cap memory usage. When the limit is
/// reached, write operations return `Err(BufferFull)` instead of growing.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    /// Maximum number of bytes the buffer is allowed to hold (`None` = unlimited).
    max_bytes: Option<usize>,
}

impl ByteBuffer {
    /// Creates a new empty `ByteBuffer` with no size limit.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            max_bytes: None,
        }
    }

    /// Creates a `ByteBuffer` with the given pre-allocated capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            max_bytes: None,
        }
    }

    /// Creates a `ByteBuffer` with a maximum byte limit.
    pub fn with_limit(max_bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(max_bytes.min(256)),
            max_bytes: Some(max_bytes),
        }
    }

    /// Returns the number of bytes written.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer and returns the raw byte vector.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Appends `src` verbatim.
    ///
    /// The limit is checked up front, so a rejected write leaves the buffer
    /// unchanged.
    pub fn write_bytes(&mut self, src: &[u8]) -> std::result::Result<(), BufferFull> {
        if let Some(max) = self.max_bytes {
            if self.bytes.len() + src.len() > max {
                return Err(BufferFull);
            }
        }
        self.bytes.extend_from_slice(src);
        Ok(())
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) -> std::result::Result<(), BufferFull> {
        self.write_bytes(&[value])
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) -> std::result::Result<(), BufferFull> {
        self.write_bytes(&value.to_be_bytes())
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) -> std::result::Result<(), BufferFull> {
        self.write_bytes(&value.to_be_bytes())
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) -> std::result::Result<(), BufferFull> {
        self.write_bytes(&value.to_be_bytes())
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads fixed-width big-endian fields from a byte source, pulling exactly
/// the bytes each field needs and nothing more.
///
/// A source that ends mid-field yields `FormatError::UnexpectedEnd`. With a
/// limit set, a read that would take the total past it fails with
/// `InputTooLarge` before touching the source.
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    /// Bytes consumed so far.
    pos: usize,
    /// Maximum number of bytes that may be consumed (`None` = unlimited).
    max_bytes: Option<usize>,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pos: 0,
            max_bytes: None,
        }
    }

    pub fn with_limit(inner: R, max_bytes: usize) -> Self {
        Self {
            inner,
            pos: 0,
            max_bytes: Some(max_bytes),
        }
    }

    /// Returns the number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the underlying source, positioned just past the last field read.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fills `buf` completely from the source.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if let Some(limit) = self.max_bytes {
            if self.pos + buf.len() > limit {
                return Err(SerdesError::InputTooLarge { limit });
            }
        }
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(FormatError::UnexpectedEnd {
                needed: buf.len(),
                offset: self.pos,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads exactly `n` bytes into a new vector.
    pub fn read_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; n];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_be_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_fixed_width() {
        let mut buf = ByteBuffer::new();
        buf.write_u8(0xAB).unwrap();
        buf.write_u16(0x0102).unwrap();
        buf.write_u32(0xDEAD_BEEF).unwrap();
        buf.write_u64(0x0102_0304_0506_0708).unwrap();
        assert_eq!(buf.len(), 1 + 2 + 4 + 8);

        let mut reader = ByteReader::new(buf.as_bytes());
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(reader.position(), 15);
        assert!(reader.into_inner().is_empty());
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = ByteBuffer::new();
        buf.write_u32(1).unwrap();
        assert_eq!(buf.as_bytes(), &[0, 0, 0, 1]);
    }

    #[test]
    fn test_empty_source() {
        let buf = ByteBuffer::new();
        assert!(buf.is_empty());

        let mut reader = ByteReader::new(buf.as_bytes());
        let err = reader.read_u8().unwrap_err();
        assert!(matches!(
            err,
            SerdesError::Format(FormatError::UnexpectedEnd { needed: 1, offset: 0 })
        ));
    }

    #[test]
    fn test_short_read_reports_offset() {
        let mut reader = ByteReader::new(&[0u8, 1, 2][..]);
        assert_eq!(reader.read_u16().unwrap(), 0x0001);
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            SerdesError::Format(FormatError::UnexpectedEnd { needed: 4, offset: 2 })
        ));
    }

    #[test]
    fn test_reader_leaves_following_bytes_in_source() {
        let bytes = [0u8, 7, 9, 9];
        let mut source = &bytes[..];
        let mut reader = ByteReader::new(&mut source);
        assert_eq!(reader.read_u16().unwrap(), 7);
        drop(reader);
        assert_eq!(source, &[9, 9]);
    }

    #[test]
    fn test_reader_limit() {
        let mut reader = ByteReader::with_limit(&[0u8; 8][..], 6);
        reader.read_u32().unwrap();
        reader.read_u16().unwrap();
        let err = reader.read_u8().unwrap_err();
        assert!(matches!(err, SerdesError::InputTooLarge { limit: 6 }));
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_read_vec() {
        let mut reader = ByteReader::new(&b"abc"[..]);
        assert_eq!(reader.read_vec(2).unwrap(), b"ab");
        assert!(reader.read_vec(2).is_err());
    }

    #[test]
    fn test_with_limit_rejects_overflow_atomically() {
        let mut buf = ByteBuffer::with_limit(5);
        buf.write_u32(1).unwrap();
        // Eight more bytes do not fit; nothing of the u64 is written.
        assert_eq!(buf.write_u64(2), Err(BufferFull));
        assert_eq!(buf.len(), 4);
        // One byte still does.
        buf.write_u8(3).unwrap();
        assert_eq!(buf.len(), 5);
    }
}
