use crate::buffer::ByteBuffer;
use crate::config::{SerdesOptions, TagOrder};
use crate::error::{Result, SerdesError};
use crate::groups::{GroupEntry, IteratorGroup, IteratorGroups};
use crate::types::{Sample, SeriesId};

/// Writes collections, groups, series and samples in the wire layout:
///
/// ```text
/// Collection := groupCount:u32 Group*
/// Group      := groupId:LPString entryCount:u32 Entry*
/// Entry      := SeriesId sampleCount:u32 Sample*
/// SeriesId   := metricCount:u16 LPString* tagCount:u16 (LPString LPString)*
/// Sample     := timestamp:u64 typeTag:u8 payload:u64 realCount:u32
/// LPString   := length:u16 UTF-8 bytes
/// ```
///
/// All integers are big-endian.
///
/// # Example
/// ```
/// use series_serdes::{Encoder, Sample};
///
/// let mut encoder = Encoder::new();
/// encoder.encode_sample(&Sample::new(1486045801000, 42i64, 1)).unwrap();
/// assert_eq!(encoder.buffer().len(), 21);
/// ```
pub struct Encoder {
    buf: ByteBuffer,
    tag_order: TagOrder,
    /// Number of samples encoded so far.
    samples: u64,
}

impl Encoder {
    /// Creates a new `Encoder` with default options.
    pub fn new() -> Self {
        Self::with_options(&SerdesOptions::default())
    }

    /// Creates an `Encoder` honoring the tag order and output limit in `options`.
    pub fn with_options(options: &SerdesOptions) -> Self {
        let buf = match options.max_encoded_bytes {
            Some(max) => ByteBuffer::with_limit(max),
            None => ByteBuffer::with_capacity(256),
        };
        Self {
            buf,
            tag_order: options.tag_order,
            samples: 0,
        }
    }

    /// Encodes a whole collection, groups in insertion order.
    pub fn encode_collection(&mut self, groups: &IteratorGroups) -> Result<()> {
        self.write_count_u32("group count", groups.len())?;
        for group in groups {
            self.encode_group(group)?;
        }
        Ok(())
    }

    /// Encodes one group, entries in insertion order.
    pub fn encode_group(&mut self, group: &IteratorGroup) -> Result<()> {
        self.write_string(group.id().as_str())?;
        self.write_count_u32("entry count", group.len())?;
        for entry in group.entries() {
            self.encode_entry(entry)?;
        }
        log::trace!("encoded group {} with {} entries", group.id(), group.len());
        Ok(())
    }

    fn encode_entry(&mut self, entry: &GroupEntry) -> Result<()> {
        let iterator = entry
            .numeric()
            .ok_or_else(|| SerdesError::MissingNumeric(entry.id().to_string()))?;
        self.encode_series(entry.id(), iterator.remaining())
    }

    /// Encodes a series id followed by its samples in the order given.
    pub fn encode_series(&mut self, id: &SeriesId, samples: &[Sample]) -> Result<()> {
        self.encode_series_id(id)?;
        self.write_count_u32("sample count", samples.len())?;
        for sample in samples {
            self.encode_sample(sample)?;
        }
        Ok(())
    }

    fn encode_series_id(&mut self, id: &SeriesId) -> Result<()> {
        self.write_count_u16("metric count", id.metrics().len())?;
        for metric in id.metrics() {
            self.write_string(metric)?;
        }
        let tags = id.tags(self.tag_order);
        self.write_count_u16("tag count", tags.len())?;
        for (key, value) in tags {
            self.write_string(key)?;
            self.write_string(value)?;
        }
        Ok(())
    }

    /// Encodes one sample. The value payload is the raw bit pattern, so no
    /// numeric conversion takes place.
    pub fn encode_sample(&mut self, sample: &Sample) -> Result<()> {
        self.buf.write_u64(sample.timestamp)?;
        self.buf.write_u8(sample.value.type_tag())?;
        self.buf.write_u64(sample.value.to_bits())?;
        self.buf.write_u32(sample.real_count)?;
        self.samples += 1;
        Ok(())
    }

    /// Returns a reference to the underlying `ByteBuffer`.
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buf
    }

    /// Consumes the encoder and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }

    /// Returns the number of samples encoded so far.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    // ── internal helpers ───────────────────────────────────────────────

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_count_u16("string length", s.len())?;
        self.buf.write_bytes(s.as_bytes())?;
        Ok(())
    }

    fn write_count_u16(&mut self, field: &'static str, len: usize) -> Result<()> {
        let value = u16::try_from(len).map_err(|_| overflow(field, len, u16::MAX as usize))?;
        self.buf.write_u16(value)?;
        Ok(())
    }

    fn write_count_u32(&mut self, field: &'static str, len: usize) -> Result<()> {
        let value = u32::try_from(len).map_err(|_| overflow(field, len, u32::MAX as usize))?;
        self.buf.write_u32(value)?;
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

fn overflow(field: &'static str, len: usize, max: usize) -> SerdesError {
    SerdesError::Overflow { field, len, max }
}
