use std::io::{Read, Write};

use crate::config::SerdesOptions;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{FormatError, Result, SerdesError};
use crate::groups::IteratorGroups;

/// Serializes `groups` to `output`.
///
/// `context` carries encoding options; `None` uses the defaults. The payload
/// is fully encoded in memory and handed to `output` with one `write_all`, so
/// a failed encode writes nothing. `output` is neither flushed nor closed.
///
/// # Errors
/// `InvalidArgument` if `output` or `groups` is `None`, before any I/O.
///
/// # Example
/// ```
/// use series_serdes::{deserialize, serialize, IteratorGroups};
///
/// let groups = IteratorGroups::new();
/// let mut out = Vec::new();
/// serialize(None, Some(&mut out), Some(&groups)).unwrap();
/// assert_eq!(out, [0, 0, 0, 0]);
///
/// let decoded = deserialize(None, Some(&mut out.as_slice())).unwrap();
/// assert!(decoded.is_empty());
/// ```
pub fn serialize<W: Write>(
    context: Option<&SerdesOptions>,
    output: Option<&mut W>,
    groups: Option<&IteratorGroups>,
) -> Result<()> {
    let output = output.ok_or(SerdesError::InvalidArgument("output stream cannot be null"))?;
    let groups = groups.ok_or(SerdesError::InvalidArgument("groups cannot be null"))?;

    let bytes = to_bytes(context, groups)?;
    output.write_all(&bytes)?;
    Ok(())
}

/// Deserializes one collection from `input`.
///
/// Exactly the bytes the collection declares are read, so `input` can carry
/// several collections back to back and is left positioned at the next one.
/// Reads are small and frequent; wrap unbuffered sources such as files or
/// sockets in a `BufReader`.
///
/// # Errors
/// `InvalidArgument` if `input` is `None`, before any I/O. `Format` if the
/// bytes are malformed or end early. `InputTooLarge` if the collection runs
/// past `max_decoded_bytes`.
pub fn deserialize<R: Read>(
    context: Option<&SerdesOptions>,
    input: Option<&mut R>,
) -> Result<IteratorGroups> {
    let input = input.ok_or(SerdesError::InvalidArgument("input stream cannot be null"))?;

    let mut decoder = match context {
        Some(options) => Decoder::with_options(input, options),
        None => Decoder::new(input),
    };
    let groups = decoder.decode_collection()?;
    log::debug!("deserialized {} groups", groups.len());
    Ok(groups)
}

/// Encodes `groups` into a new byte vector.
pub fn to_bytes(context: Option<&SerdesOptions>, groups: &IteratorGroups) -> Result<Vec<u8>> {
    let mut encoder = match context {
        Some(options) => Encoder::with_options(options),
        None => Encoder::new(),
    };
    encoder.encode_collection(groups)?;
    log::debug!(
        "serialized {} groups, {} samples into {} bytes",
        groups.len(),
        encoder.sample_count(),
        encoder.buffer().len()
    );
    Ok(encoder.into_bytes())
}

/// Decodes a collection from a complete payload.
///
/// # Errors
/// As [`deserialize`], plus `Format(TrailingBytes)` if anything follows the
/// collection.
pub fn from_bytes(context: Option<&SerdesOptions>, bytes: &[u8]) -> Result<IteratorGroups> {
    let mut rest = bytes;
    let groups = deserialize(context, Some(&mut rest))?;
    if !rest.is_empty() {
        return Err(FormatError::TrailingBytes(rest.len()).into());
    }
    Ok(groups)
}
