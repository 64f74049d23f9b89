use crate::error::DecodeError;
use crate::parser::primitive_parser::parse_u24;
use std::fmt;

/// Microseconds in a minute
const MICROS_PER_MINUTE: u32 = 60_000_000;

/// Payload size of a tempo meta event
pub const TEMPO_PAYLOAD_SIZE: usize = 3;

/// Meta event subtype byte following the `0xFF` tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MetaSubtype {
    SequenceNumber,
    Text,
    Copyright,
    TrackName,
    Instrument,
    Lyrics,
    EndOfTrack,
    Tempo,
    Unrecognized(u8),
}

impl MetaSubtype {
    pub const fn from_byte(code: u8) -> Self {
        match code {
            0x00 => Self::SequenceNumber,
            0x01 => Self::Text,
            0x02 => Self::Copyright,
            0x03 => Self::TrackName,
            0x04 => Self::Instrument,
            0x05 => Self::Lyrics,
            0x2F => Self::EndOfTrack,
            0x51 => Self::Tempo,
            other => Self::Unrecognized(other),
        }
    }

    pub const fn code(&self) -> u8 {
        match self {
            Self::SequenceNumber => 0x00,
            Self::Text => 0x01,
            Self::Copyright => 0x02,
            Self::TrackName => 0x03,
            Self::Instrument => 0x04,
            Self::Lyrics => 0x05,
            Self::EndOfTrack => 0x2F,
            Self::Tempo => 0x51,
            Self::Unrecognized(code) => *code,
        }
    }

    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::SequenceNumber => "Sequence Number",
            Self::Text => "Text",
            Self::Copyright => "Copyright",
            Self::TrackName => "Track Name",
            Self::Instrument => "Instrument",
            Self::Lyrics => "Lyrics",
            Self::EndOfTrack => "End Of Track",
            Self::Tempo => "Tempo",
            Self::Unrecognized(_) => "Unsupported Meta Event",
        }
    }
}

impl From<u8> for MetaSubtype {
    fn from(code: u8) -> Self {
        Self::from_byte(code)
    }
}

impl fmt::Display for MetaSubtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unrecognized(code) => write!(f, "{} 0x{code:02X}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Semantic value of a meta event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    TrackName(String),
    Copyright(String),
    TempoBpm(u32),
    EndOfTrack,
    /// Not interpreted, raw payload kept
    Unrecognized {
        subtype: MetaSubtype,
        payload: Vec<u8>,
    },
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TrackName(name) => f.write_str(name),
            Self::Copyright(copyright) => f.write_str(copyright),
            Self::TempoBpm(bpm) => write!(f, "{bpm} bpm"),
            Self::EndOfTrack => f.write_str("EOT"),
            Self::Unrecognized { payload, .. } => write!(f, "{payload:02X?}"),
        }
    }
}

/// Strict 7-bit text
fn decode_ascii(payload: &[u8]) -> Result<String, DecodeError> {
    if let Some(position) = payload.iter().position(|b| !b.is_ascii()) {
        return Err(DecodeError::InvalidEncoding {
            byte: payload[position],
            position,
        });
    }
    Ok(payload.iter().map(|&b| char::from(b)).collect())
}

/// Beats per minute from a 3 byte microseconds-per-quarter-note payload, truncated.
pub fn decode_tempo(payload: &[u8]) -> Result<u32, DecodeError> {
    if payload.len() != TEMPO_PAYLOAD_SIZE {
        return Err(DecodeError::InvalidLength {
            expected: TEMPO_PAYLOAD_SIZE,
            found: payload.len(),
        });
    }
    let (_rest, mpqn) = parse_u24(payload)?;
    MICROS_PER_MINUTE
        .checked_div(mpqn)
        .ok_or(DecodeError::DivideByZero)
}

/// Interpret the payload of a meta event
pub fn interpret(subtype: MetaSubtype, payload: &[u8]) -> Result<MetaValue, DecodeError> {
    let value = match subtype {
        MetaSubtype::TrackName => MetaValue::TrackName(decode_ascii(payload)?),
        MetaSubtype::Copyright => MetaValue::Copyright(decode_ascii(payload)?),
        MetaSubtype::Tempo => MetaValue::TempoBpm(decode_tempo(payload)?),
        MetaSubtype::EndOfTrack => {
            if !payload.is_empty() {
                log::debug!("End of track with {} payload bytes", payload.len());
            }
            MetaValue::EndOfTrack
        }
        MetaSubtype::SequenceNumber
        | MetaSubtype::Text
        | MetaSubtype::Instrument
        | MetaSubtype::Lyrics
        | MetaSubtype::Unrecognized(_) => MetaValue::Unrecognized {
            subtype,
            payload: payload.to_vec(),
        },
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo() {
        assert_eq!(
            interpret(MetaSubtype::Tempo, &[0x07, 0xA1, 0x20]),
            Ok(MetaValue::TempoBpm(120))
        );
        // 60_000_000 / 700_000 truncates
        assert_eq!(decode_tempo(&[0x0A, 0xAE, 0x60]), Ok(85));
        assert_eq!(decode_tempo(&[0x00, 0x00, 0x01]), Ok(60_000_000));
        assert_eq!(
            interpret(MetaSubtype::Tempo, &[0x00, 0x00, 0x00]),
            Err(DecodeError::DivideByZero)
        );
    }

    #[test]
    fn test_tempo_wrong_length() {
        assert_eq!(
            decode_tempo(&[0x07, 0xA1]),
            Err(DecodeError::InvalidLength {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            decode_tempo(&[0x00, 0x07, 0xA1, 0x20]),
            Err(DecodeError::InvalidLength {
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn test_track_name() {
        assert_eq!(
            interpret(MetaSubtype::TrackName, b"Piano"),
            Ok(MetaValue::TrackName("Piano".to_string()))
        );
        assert_eq!(
            interpret(MetaSubtype::TrackName, &[b'P', 0xFF, b'o']),
            Err(DecodeError::InvalidEncoding {
                byte: 0xFF,
                position: 1
            })
        );
        assert_eq!(
            interpret(MetaSubtype::TrackName, b""),
            Ok(MetaValue::TrackName(String::new()))
        );
    }

    #[test]
    fn test_copyright() {
        assert_eq!(
            interpret(MetaSubtype::Copyright, b"(c) 1999"),
            Ok(MetaValue::Copyright("(c) 1999".to_string()))
        );
        assert!(matches!(
            interpret(MetaSubtype::Copyright, "© 1999".as_bytes()),
            Err(DecodeError::InvalidEncoding { position: 0, .. })
        ));
    }

    #[test]
    fn test_end_of_track_is_lenient() {
        assert_eq!(
            interpret(MetaSubtype::EndOfTrack, &[]),
            Ok(MetaValue::EndOfTrack)
        );
        assert_eq!(
            interpret(MetaSubtype::EndOfTrack, &[0x01]),
            Ok(MetaValue::EndOfTrack)
        );
    }

    #[test]
    fn test_uninterpreted_subtypes_keep_payload() {
        assert_eq!(
            interpret(MetaSubtype::Lyrics, b"la"),
            Ok(MetaValue::Unrecognized {
                subtype: MetaSubtype::Lyrics,
                payload: b"la".to_vec()
            })
        );
        let value = interpret(MetaSubtype::from_byte(0x58), &[4, 2, 24, 8]).unwrap();
        assert_eq!(
            value,
            MetaValue::Unrecognized {
                subtype: MetaSubtype::Unrecognized(0x58),
                payload: vec![4, 2, 24, 8]
            }
        );
        assert_eq!(value.to_string(), "[04, 02, 18, 08]");
    }

    #[test]
    fn test_subtype_codes() {
        for code in 0..=u8::MAX {
            assert_eq!(MetaSubtype::from_byte(code).code(), code);
        }
        assert!(MetaSubtype::from(0x51).is_recognized());
        assert!(!MetaSubtype::from(0x7F).is_recognized());
        assert_eq!(
            MetaSubtype::from(0x7F).to_string(),
            "Unsupported Meta Event 0x7F"
        );
        assert_eq!(MetaSubtype::EndOfTrack.to_string(), "End Of Track");
    }
}
