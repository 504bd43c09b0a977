use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::config::TagOrder;
use crate::error::{Result, SerdesError};

/// Name of a group of series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for GroupId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one series: one or more metric names plus tag pairs.
///
/// Equality and hashing ignore the order in which tags were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesId {
    metrics: Vec<String>,
    tags: IndexMap<String, String>,
}

impl SeriesId {
    /// Starts building an id.
    ///
    /// # Example
    /// ```
    /// use series_serdes::SeriesId;
    ///
    /// let id = SeriesId::builder()
    ///     .metric("sys.cpu.user")
    ///     .tag("host", "web01")
    ///     .tag("dc", "phx")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(id.metrics(), ["sys.cpu.user"]);
    /// assert_eq!(id.tag("dc"), Some("phx"));
    /// ```
    pub fn builder() -> SeriesIdBuilder {
        SeriesIdBuilder::default()
    }

    /// Builds an id from already-validated parts. `metrics` must be non-empty.
    pub(crate) fn from_parts(metrics: Vec<String>, tags: IndexMap<String, String>) -> Self {
        debug_assert!(!metrics.is_empty());
        Self { metrics, tags }
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Returns the tag pairs in the requested order.
    pub fn tags(&self, order: TagOrder) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if order == TagOrder::Sorted {
            pairs.sort_unstable();
        }
        pairs
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.metrics.join(","))?;
        f.write_str("{")?;
        for (i, (k, v)) in self.tags(TagOrder::Sorted).into_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

impl Hash for SeriesId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.metrics.hash(state);
        self.tags(TagOrder::Sorted).hash(state);
    }
}

#[derive(Debug, Default)]
pub struct SeriesIdBuilder {
    metrics: Vec<String>,
    tags: IndexMap<String, String>,
}

impl SeriesIdBuilder {
    pub fn metric(mut self, name: impl Into<String>) -> Self {
        self.metrics.push(name.into());
        self
    }

    pub fn metrics<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a tag pair. A repeated key replaces the earlier value.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Fails with `InvalidArgument` when no metric name was given.
    pub fn build(self) -> Result<SeriesId> {
        if self.metrics.is_empty() {
            return Err(SerdesError::InvalidArgument("series id requires a metric"));
        }
        Ok(SeriesId::from_parts(self.metrics, self.tags))
    }
}

/// A numeric sample value: either a signed integer or a float.
///
/// Equality compares the variant and the exact bit pattern, so `Integer(42)`
/// never equals `Float(42.0)` and a NaN equals an identical NaN.
#[derive(Debug, Clone, Copy)]
pub enum NumericValue {
    Integer(i64),
    Float(f64),
}

impl NumericValue {
    pub const INTEGER_TAG: u8 = 0;
    pub const FLOAT_TAG: u8 = 1;

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, NumericValue::Integer(_))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            NumericValue::Integer(v) => Some(v),
            NumericValue::Float(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            NumericValue::Integer(_) => None,
            NumericValue::Float(v) => Some(v),
        }
    }

    /// Widens to `f64`. Integers beyond 2^53 lose precision.
    pub fn to_f64(&self) -> f64 {
        match *self {
            NumericValue::Integer(v) => v as f64,
            NumericValue::Float(v) => v,
        }
    }

    #[inline]
    pub fn type_tag(&self) -> u8 {
        match self {
            NumericValue::Integer(_) => Self::INTEGER_TAG,
            NumericValue::Float(_) => Self::FLOAT_TAG,
        }
    }

    /// Raw 64-bit payload: two's-complement for integers, IEEE 754 bits for floats.
    #[inline]
    pub fn to_bits(&self) -> u64 {
        match *self {
            NumericValue::Integer(v) => v as u64,
            NumericValue::Float(v) => v.to_bits(),
        }
    }
}

impl PartialEq for NumericValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_tag() == other.type_tag() && self.to_bits() == other.to_bits()
    }
}

impl Eq for NumericValue {}

impl From<i64> for NumericValue {
    fn from(value: i64) -> Self {
        NumericValue::Integer(value)
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Float(value)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Integer(v) => write!(f, "{v}"),
            NumericValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// One data point: millisecond timestamp, value and real count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub value: NumericValue,
    /// Number of raw readings that contributed to `value`; 0 for synthetic values.
    pub real_count: u32,
}

impl Sample {
    pub fn new(timestamp: u64, value: impl Into<NumericValue>, real_count: u32) -> Self {
        Self {
            timestamp,
            value: value.into(),
            real_count,
        }
    }
}
