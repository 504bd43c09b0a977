//! # series-serdes
//!
//! A binary codec for grouped time-series query results. A collection of
//! named groups, each holding an ordered list of series, each series an
//! ordered run of `(timestamp, value, real_count)` samples, is written to a
//! byte sink and later rebuilt exactly.
//!
//! ## Guarantees
//!
//! - **Type fidelity**: integer values decode as integers and floats as
//!   floats. Payloads are written as raw bit patterns, so NaN, `-0.0` and
//!   `i64::MIN` survive unchanged.
//! - **Order**: groups, entries within a group and samples within a series
//!   come back in the order they were written.
//! - **Pull iteration**: each decoded series is a [`SeriesIterator`] with an
//!   explicit [`IteratorStatus`]; calling `next` after `EndOfData` is an error.
//! - **Validation**: absent arguments fail with
//!   [`SerdesError::InvalidArgument`] before any I/O; malformed input fails
//!   with [`SerdesError::Format`] and yields no partial collection.
//! - **Streaming**: [`deserialize`] reads exactly one collection and leaves
//!   the source positioned after it, so collections can be sent back to back.
//!   [`from_bytes`] additionally rejects trailing bytes.
//!
//! ## Example
//!
//! ```rust
//! use series_serdes::{deserialize, serialize, GroupId, IteratorGroups, IteratorStatus, SeriesId, SeriesIterator};
//!
//! let id = SeriesId::builder()
//!     .metric("sys.cpu.user")
//!     .tag("host", "web01")
//!     .tag("dc", "phx")
//!     .build()
//!     .unwrap();
//! let series = SeriesIterator::builder(id)
//!     .push(1486045801000, 42i64, 1)
//!     .push(1486045871000, 9866.854, 0)
//!     .build();
//!
//! let mut groups = IteratorGroups::new();
//! groups.add_iterator("a", series).unwrap();
//!
//! let mut bytes = Vec::new();
//! serialize(None, Some(&mut bytes), Some(&groups)).unwrap();
//!
//! let mut decoded = deserialize(None, Some(&mut bytes.as_slice())).unwrap();
//! let group = decoded.group_mut(&GroupId::from("a")).unwrap();
//! let it = group.entry_mut(0).unwrap().numeric_mut().unwrap();
//!
//! let first = it.next().unwrap();
//! assert_eq!(first.value.as_integer(), Some(42));
//! let second = it.next().unwrap();
//! assert!(!second.value.is_integer());
//! assert_eq!(it.status(), IteratorStatus::EndOfData);
//! ```

pub mod buffer;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod groups;
pub mod iterator;
pub mod serdes;
pub mod types;

// Re-export primary types at the crate root.
pub use buffer::{BufferFull, ByteBuffer, ByteReader};
pub use config::{SerdesOptions, TagOrder};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{FormatError, SerdesError};
pub use groups::{GroupEntry, IteratorGroup, IteratorGroups, TypedIterator};
pub use iterator::{IteratorExhausted, IteratorStatus, SeriesBuilder, SeriesIterator};
pub use serdes::{deserialize, from_bytes, serialize, to_bytes};
pub use types::{GroupId, NumericValue, Sample, SeriesId, SeriesIdBuilder};
