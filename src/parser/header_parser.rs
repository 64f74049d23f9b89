use crate::error::DecodeError;
use crate::parser::chunk_parser::{Chunk, HEADER_TAG};
use crate::parser::primitive_parser::parse_u16;
use std::fmt;

/// Minimum payload size of the header chunk
pub const HEADER_PAYLOAD_SIZE: usize = 6;

/// How delta times map to real time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Division {
    /// Ticks per quarter note (bit 15 clear), 15 bits
    TicksPerBeat(u16),
    /// SMPTE timing (bit 15 set)
    FramesPerSecond {
        /// Low 7 bits of the upper byte, a negative frame rate in two's complement
        fps_code: u8,
        ticks_per_frame: u8,
    },
}

impl Division {
    pub const fn from_raw(raw: u16) -> Self {
        if raw & 0x8000 == 0 {
            Self::TicksPerBeat(raw)
        } else {
            Self::FramesPerSecond {
                fps_code: ((raw >> 8) & 0x7F) as u8,
                ticks_per_frame: (raw & 0xFF) as u8,
            }
        }
    }

    /// The 15 bits below the variant flag
    pub const fn raw_value(&self) -> u16 {
        match self {
            Self::TicksPerBeat(ticks) => *ticks,
            Self::FramesPerSecond {
                fps_code,
                ticks_per_frame,
            } => ((*fps_code as u16) << 8) | *ticks_per_frame as u16,
        }
    }

    /// Frames per second of a SMPTE division (24, 25, 29 for 30 drop frame, 30)
    pub const fn frames_per_second(&self) -> Option<u8> {
        match self {
            Self::TicksPerBeat(_) => None,
            Self::FramesPerSecond { fps_code, .. } => {
                Some(((*fps_code | 0x80) as i8).unsigned_abs())
            }
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::TicksPerBeat(_) => "TicksPerBeat",
            Self::FramesPerSecond { .. } => "FramesPerSecond",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TicksPerBeat(ticks) => write!(f, "{ticks} ticks per beat"),
            Self::FramesPerSecond {
                ticks_per_frame, ..
            } => match self.frames_per_second() {
                Some(fps) => write!(f, "{fps} fps, {ticks_per_frame} ticks per frame"),
                None => write!(f, "{ticks_per_frame} ticks per frame"),
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// 0 single track, 1 simultaneous tracks, 2 independent sequences
    pub format_type: u16,
    pub track_count: u16,
    pub division: Division,
}

/// Decode the `MThd` chunk payload
pub fn decode_header(chunk: &Chunk) -> Result<FileHeader, DecodeError> {
    if chunk.tag != HEADER_TAG {
        return Err(DecodeError::BadMagic {
            expected: HEADER_TAG,
            found: chunk.tag,
        });
    }
    if chunk.data.len() < HEADER_PAYLOAD_SIZE {
        return Err(DecodeError::TruncatedInput {
            needed: HEADER_PAYLOAD_SIZE,
            available: chunk.data.len(),
        });
    }
    if chunk.data.len() > HEADER_PAYLOAD_SIZE {
        log::debug!(
            "Ignoring {} extra header bytes",
            chunk.data.len() - HEADER_PAYLOAD_SIZE
        );
    }
    let (rest, format_type) = parse_u16(&chunk.data)?;
    let (rest, track_count) = parse_u16(rest)?;
    let (_rest, division) = parse_u16(rest)?;
    let header = FileHeader {
        format_type,
        track_count,
        division: Division::from_raw(division),
    };
    log::debug!("Decoded header {header:?}");
    Ok(header)
}
