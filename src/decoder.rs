use std::io::Read;

use indexmap::IndexMap;

use crate::buffer::ByteReader;
use crate::config::SerdesOptions;
use crate::error::{FormatError, Result};
use crate::groups::{IteratorGroup, IteratorGroups};
use crate::iterator::SeriesIterator;
use crate::types::{GroupId, NumericValue, Sample, SeriesId};

/// Upper bound on samples preallocated from a declared count. Larger series
/// grow as samples actually arrive.
const PREALLOC_SAMPLES: usize = 1024;

/// Reconstructs collections from the layout written by [`Encoder`](crate::Encoder).
///
/// The decoder pulls exactly the bytes the layout declares from its source, so
/// anything after a collection is left unread. Every method either returns a
/// fully built value or an error; nothing partially decoded escapes.
///
/// # Example
/// ```
/// use series_serdes::{Decoder, Encoder, Sample};
///
/// let mut encoder = Encoder::new();
/// encoder.encode_sample(&Sample::new(1486045801000, -128i64, 1024)).unwrap();
/// let bytes = encoder.into_bytes();
///
/// let mut decoder = Decoder::new(bytes.as_slice());
/// let sample = decoder.decode_sample().unwrap();
/// assert_eq!(sample.value.as_integer(), Some(-128));
/// assert!(decoder.into_inner().is_empty());
/// ```
pub struct Decoder<R> {
    reader: ByteReader<R>,
}

impl<R: Read> Decoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: ByteReader::new(inner),
        }
    }

    /// Creates a decoder honouring `options.max_decoded_bytes`.
    pub fn with_options(inner: R, options: &SerdesOptions) -> Self {
        let reader = match options.max_decoded_bytes {
            Some(limit) => ByteReader::with_limit(inner, limit),
            None => ByteReader::new(inner),
        };
        Self { reader }
    }

    /// Returns the source, positioned just past the last value decoded.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Decodes a collection, keeping groups in the order they were written.
    pub fn decode_collection(&mut self) -> Result<IteratorGroups> {
        let count = self.reader.read_u32()?;
        let mut groups = IteratorGroups::new();
        for _ in 0..count {
            let group = self.decode_group()?;
            if let Err(group) = groups.insert_group(group) {
                return Err(FormatError::DuplicateGroup(group.id().to_string()).into());
            }
        }
        log::trace!(
            "decoded {} groups from {} bytes",
            groups.len(),
            self.reader.position()
        );
        Ok(groups)
    }

    /// Decodes one group; the Nth entry read becomes entry N.
    pub fn decode_group(&mut self) -> Result<IteratorGroup> {
        let id = GroupId::new(self.read_string()?);
        let count = self.reader.read_u32()?;
        let mut group = IteratorGroup::new(id);
        for _ in 0..count {
            let iterator = self.decode_series()?;
            if let Err(iterator) = group.try_push_entry(iterator) {
                return Err(FormatError::DuplicateSeries {
                    group: group.id().to_string(),
                    series: iterator.id().to_string(),
                }
                .into());
            }
        }
        log::trace!("decoded group {} with {} entries", group.id(), group.len());
        Ok(group)
    }

    /// Decodes a series id and its samples into an iterator positioned at the
    /// first sample.
    pub fn decode_series(&mut self) -> Result<SeriesIterator> {
        let id = self.decode_series_id()?;
        let count = self.reader.read_u32()? as usize;
        let mut samples = Vec::with_capacity(count.min(PREALLOC_SAMPLES));
        for _ in 0..count {
            samples.push(self.decode_sample()?);
        }
        Ok(SeriesIterator::new(id, samples))
    }

    fn decode_series_id(&mut self) -> Result<SeriesId> {
        let metric_count = self.reader.read_u16()?;
        if metric_count == 0 {
            return Err(FormatError::EmptyMetrics.into());
        }
        let mut metrics = Vec::with_capacity(metric_count as usize);
        for _ in 0..metric_count {
            metrics.push(self.read_string()?);
        }
        let tag_count = self.reader.read_u16()?;
        let mut tags = IndexMap::with_capacity(tag_count as usize);
        for _ in 0..tag_count {
            let key = self.read_string()?;
            let value = self.read_string()?;
            if tags.contains_key(&key) {
                return Err(FormatError::DuplicateTag { key }.into());
            }
            tags.insert(key, value);
        }
        Ok(SeriesId::from_parts(metrics, tags))
    }

    /// Decodes one sample, restoring the value from its raw bit pattern.
    pub fn decode_sample(&mut self) -> Result<Sample> {
        let timestamp = self.reader.read_u64()?;
        let tag = self.reader.read_u8()?;
        let bits = self.reader.read_u64()?;
        let value = match tag {
            NumericValue::INTEGER_TAG => NumericValue::Integer(bits as i64),
            NumericValue::FLOAT_TAG => NumericValue::Float(f64::from_bits(bits)),
            other => return Err(FormatError::UnknownTypeTag(other).into()),
        };
        let real_count = self.reader.read_u32()?;
        Ok(Sample {
            timestamp,
            value,
            real_count,
        })
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.reader.read_u16()? as usize;
        let bytes = self.reader.read_vec(len)?;
        String::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8.into())
    }
}
