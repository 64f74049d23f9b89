use crate::error::DecodeError;
use crate::parser::primitive_parser::{parse_tag, parse_u32};
use std::io::Read;

/// Tag of the file header chunk
pub const HEADER_TAG: [u8; 4] = *b"MThd";

/// Tag of a track chunk
pub const TRACK_TAG: [u8; 4] = *b"MTrk";

/// Size of the tag + length prefix of every chunk
pub const CHUNK_PREFIX_SIZE: usize = 8;

/// A tagged, length-prefixed block of bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub tag: [u8; 4],
    pub data: Vec<u8>,
}

impl Chunk {
    /// Declared payload length
    pub fn length(&self) -> u32 {
        // payload was read from a u32 length
        self.data.len() as u32
    }

    /// Tag as printable text
    pub fn tag_name(&self) -> String {
        self.tag.escape_ascii().to_string()
    }
}

/// Read up to `n` bytes, returning fewer only at end of source.
fn read_up_to<R: Read>(source: &mut R, n: usize) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::with_capacity(n.min(64 * 1024));
    source.by_ref().take(n as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read one chunk: 4 byte tag, big-endian u32 length, then that many bytes.
///
/// The tag is not validated here.
pub fn read_chunk<R: Read>(source: &mut R) -> Result<Chunk, DecodeError> {
    let prefix = read_up_to(source, CHUNK_PREFIX_SIZE)?;
    if prefix.len() < CHUNK_PREFIX_SIZE {
        return Err(DecodeError::TruncatedInput {
            needed: CHUNK_PREFIX_SIZE,
            available: prefix.len(),
        });
    }
    let (rest, tag) = parse_tag(&prefix)?;
    let (_rest, length) = parse_u32(rest)?;
    log::debug!("Reading chunk {} of {length} bytes", tag.escape_ascii());

    let length = length as usize;
    let data = read_up_to(source, length)?;
    if data.len() < length {
        return Err(DecodeError::TruncatedInput {
            needed: length,
            available: data.len(),
        });
    }
    Ok(Chunk { tag, data })
}

/// Whether the source is exhausted, consuming at most one byte.
pub(crate) fn at_end<R: Read>(source: &mut R) -> Result<bool, DecodeError> {
    Ok(read_up_to(source, 1)?.is_empty())
}
