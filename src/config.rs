/// Order in which a series' tag pairs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagOrder {
    /// Sorted by key, then value. Makes encoded output reproducible for equal
    /// collections regardless of how their ids were built.
    #[default]
    Sorted,
    /// The order the tags were added to the id.
    Insertion,
}

/// Options passed as the `context` of [`serialize`](crate::serialize) and
/// [`deserialize`](crate::deserialize).
///
/// # Example
/// ```
/// use series_serdes::{SerdesOptions, TagOrder};
///
/// let options = SerdesOptions::new()
///     .with_tag_order(TagOrder::Insertion)
///     .with_max_encoded_bytes(1 << 20);
/// assert_eq!(options.max_encoded_bytes, Some(1 << 20));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdesOptions {
    pub tag_order: TagOrder,
    /// Upper bound on the size of an encoded collection (`None` = unlimited).
    pub max_encoded_bytes: Option<usize>,
    /// Upper bound on the size of an input accepted for decoding (`None` = unlimited).
    pub max_decoded_bytes: Option<usize>,
}

impl SerdesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag_order(mut self, tag_order: TagOrder) -> Self {
        self.tag_order = tag_order;
        self
    }

    pub fn with_max_encoded_bytes(mut self, max_bytes: usize) -> Self {
        self.max_encoded_bytes = Some(max_bytes);
        self
    }

    pub fn with_max_decoded_bytes(mut self, max_bytes: usize) -> Self {
        self.max_decoded_bytes = Some(max_bytes);
        self
    }
}
