use crate::types::{NumericValue, Sample, SeriesId};

/// Whether a [`SeriesIterator`] can produce another sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorStatus {
    HasData,
    EndOfData,
}

/// Error returned by [`SeriesIterator::next`] once the iterator is at
/// [`IteratorStatus::EndOfData`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("series iterator is exhausted")]
pub struct IteratorExhausted;

/// A pull-based view over the samples of one series.
///
/// The iterator owns its samples and a cursor. `EndOfData` is terminal:
/// calling [`next`](Self::next) there is an error rather than a repeat.
///
/// Two iterators are equal when they have the same id and the same
/// [`remaining`](Self::remaining) samples, i.e. when they would encode to the
/// same bytes. Samples already returned do not take part.
///
/// # Example
/// ```
/// use series_serdes::{IteratorStatus, SeriesId, SeriesIterator};
///
/// let id = SeriesId::builder().metric("sys.cpu.user").build().unwrap();
/// let mut it = SeriesIterator::builder(id)
///     .push(1486045801000, 42i64, 1)
///     .push(1486045871000, 9866.854, 0)
///     .build();
///
/// while it.status() == IteratorStatus::HasData {
///     let sample = it.next().unwrap();
///     println!("{} {}", sample.timestamp, sample.value);
/// }
/// assert!(it.next().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SeriesIterator {
    id: SeriesId,
    samples: Vec<Sample>,
    /// Index of the next sample to return.
    cursor: usize,
}

impl SeriesIterator {
    pub fn new(id: SeriesId, samples: Vec<Sample>) -> Self {
        Self {
            id,
            samples,
            cursor: 0,
        }
    }

    pub fn builder(id: SeriesId) -> SeriesBuilder {
        SeriesBuilder {
            id,
            samples: Vec::new(),
        }
    }

    pub fn id(&self) -> &SeriesId {
        &self.id
    }

    pub fn status(&self) -> IteratorStatus {
        if self.cursor < self.samples.len() {
            IteratorStatus::HasData
        } else {
            IteratorStatus::EndOfData
        }
    }

    /// Returns the next sample and advances.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Sample, IteratorExhausted> {
        let sample = *self.samples.get(self.cursor).ok_or(IteratorExhausted)?;
        self.cursor += 1;
        Ok(sample)
    }

    /// Samples not yet returned by [`next`](Self::next).
    pub fn remaining(&self) -> &[Sample] {
        &self.samples[self.cursor..]
    }

    /// Total number of samples, consumed or not.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl PartialEq for SeriesIterator {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.remaining() == other.remaining()
    }
}

/// Collects samples for one series in the order they are pushed.
#[derive(Debug)]
pub struct SeriesBuilder {
    id: SeriesId,
    samples: Vec<Sample>,
}

impl SeriesBuilder {
    pub fn push(mut self, timestamp: u64, value: impl Into<NumericValue>, real_count: u32) -> Self {
        self.samples.push(Sample::new(timestamp, value, real_count));
        self
    }

    pub fn add(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn build(self) -> SeriesIterator {
        SeriesIterator::new(self.id, self.samples)
    }
}
