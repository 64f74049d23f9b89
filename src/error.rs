//! Error types for the smfdump library

use nom::error::{ErrorKind, ParseError};
use std::io;

/// Low level decoding failure, independent of where in the file it happened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A required chunk tag did not match
    #[error("bad magic: expected \"{}\", found \"{}\"", ascii(.expected), ascii(.found))]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    /// Fewer bytes available than declared or needed
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// Text payload is not 7-bit ASCII
    #[error("invalid encoding: byte 0x{byte:02X} at position {position} is not ASCII")]
    InvalidEncoding { byte: u8, position: usize },

    /// Fixed size payload has the wrong length
    #[error("invalid length: expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },

    /// Tempo of zero microseconds per quarter note
    #[error("tempo of 0 microseconds per quarter note")]
    DivideByZero,

    /// Variable length quantity without terminating byte or overflowing 32 bits
    #[error("malformed variable length quantity after {consumed} bytes")]
    MalformedVlq { consumed: usize },

    /// Structurally valid but undecoded event
    #[error("unsupported event type 0x{tag:02X}")]
    Unsupported { tag: u8 },

    /// I/O error while reading the source
    #[error("I/O error: {0}")]
    Io(String),
}

fn ascii(tag: &[u8; 4]) -> String {
    tag.escape_ascii().to_string()
}

impl From<io::Error> for DecodeError {
    fn from(error: io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

// nom only reports running out of input for the complete parsers in use.
impl ParseError<&[u8]> for DecodeError {
    fn from_error_kind(input: &[u8], kind: ErrorKind) -> Self {
        log::debug!("nom error {kind:?} with {} bytes left", input.len());
        Self::TruncatedInput {
            needed: input.len() + 1,
            available: input.len(),
        }
    }

    fn append(_input: &[u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<DecodeError>> for DecodeError {
    fn from(error: nom::Err<DecodeError>) -> Self {
        match error {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(needed) => {
                let needed = match needed {
                    nom::Needed::Size(n) => n.get(),
                    nom::Needed::Unknown => 1,
                };
                Self::TruncatedInput {
                    needed,
                    available: 0,
                }
            }
        }
    }
}

/// Library error type, locating a [`DecodeError`] in the file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmfError {
    /// Failure while decoding the header chunk
    #[error("header: {0}")]
    Header(DecodeError),

    /// Failure while reading a track chunk
    #[error("track {index}: {source}")]
    Track { index: usize, source: DecodeError },

    /// Failure while decoding an event inside a track
    #[error("track {track}, event at offset {offset}: {source}")]
    Event {
        track: usize,
        offset: usize,
        source: DecodeError,
    },

    /// Requested track index is out of range
    #[error("track {index} not found ({track_count} tracks)")]
    TrackNotFound { index: usize, track_count: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SmfError {
    /// The underlying decoding failure, if any
    pub const fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            Self::Header(source) | Self::Track { source, .. } | Self::Event { source, .. } => {
                Some(source)
            }
            Self::TrackNotFound { .. } | Self::IoError(_) => None,
        }
    }
}

impl From<io::Error> for SmfError {
    fn from(error: io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_phase() {
        let err = SmfError::Event {
            track: 2,
            offset: 17,
            source: DecodeError::MalformedVlq { consumed: 5 },
        };
        assert_eq!(
            err.to_string(),
            "track 2, event at offset 17: malformed variable length quantity after 5 bytes"
        );

        let err = SmfError::Header(DecodeError::BadMagic {
            expected: *b"MThd",
            found: *b"XX\x00X",
        });
        assert_eq!(
            err.to_string(),
            r#"header: bad magic: expected "MThd", found "XX\x00X""#
        );
    }

    #[test]
    fn test_nom_incomplete_maps_to_truncation() {
        let err: DecodeError = nom::Err::Incomplete(nom::Needed::new(3)).into();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                needed: 3,
                available: 0
            }
        );
    }
}
