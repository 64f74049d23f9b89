use crate::error::DecodeError;
use nom::combinator::map;
use nom::{bytes, IResult, Parser};

/// Parser result carrying a typed [`DecodeError`]
pub type DecodeResult<'a, T> = IResult<&'a [u8], T, DecodeError>;

/// Upper bound of 7-bit groups in a variable length quantity (covers 32 bits).
pub const VLQ_MAX_BYTES: usize = 5;

/// Take exactly `n` bytes, failing with the precise shortfall.
pub fn take_exact(n: usize) -> impl Fn(&[u8]) -> DecodeResult<'_, &[u8]> {
    move |i: &[u8]| {
        if i.len() < n {
            return Err(nom::Err::Failure(DecodeError::TruncatedInput {
                needed: n,
                available: i.len(),
            }));
        }
        bytes::complete::take(n)(i)
    }
}

/// Parse unsigned byte
pub fn parse_u8(i: &[u8]) -> DecodeResult<'_, u8> {
    map(take_exact(1), |b: &[u8]| b[0]).parse(i)
}

/// Parse big-endian unsigned 16
pub fn parse_u16(i: &[u8]) -> DecodeResult<'_, u16> {
    map(take_exact(2), |b: &[u8]| u16::from_be_bytes([b[0], b[1]])).parse(i)
}

/// Parse big-endian unsigned 24
pub fn parse_u24(i: &[u8]) -> DecodeResult<'_, u32> {
    map(take_exact(3), |b: &[u8]| {
        u32::from_be_bytes([0, b[0], b[1], b[2]])
    })
    .parse(i)
}

/// Parse big-endian unsigned 32
pub fn parse_u32(i: &[u8]) -> DecodeResult<'_, u32> {
    map(take_exact(4), |b: &[u8]| {
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    })
    .parse(i)
}

/// Parse a 4 byte chunk tag
pub fn parse_tag(i: &[u8]) -> DecodeResult<'_, [u8; 4]> {
    map(take_exact(4), |b: &[u8]| [b[0], b[1], b[2], b[3]]).parse(i)
}

/// Parse a MIDI variable length quantity.
///
/// Big-endian 7-bit groups, the high bit of each byte flags a continuation.
/// At most [`VLQ_MAX_BYTES`] groups are read and the value must fit in 32 bits.
pub fn parse_vlq(i: &[u8]) -> DecodeResult<'_, u32> {
    let mut value: u64 = 0;
    let mut rest = i;
    for consumed in 1..=VLQ_MAX_BYTES {
        let (r, byte) = parse_u8(rest)?;
        rest = r;
        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return match u32::try_from(value) {
                Ok(value) => Ok((rest, value)),
                Err(_) => Err(nom::Err::Failure(DecodeError::MalformedVlq { consumed })),
            };
        }
    }
    log::debug!("VLQ continues past {VLQ_MAX_BYTES} bytes");
    Err(nom::Err::Failure(DecodeError::MalformedVlq {
        consumed: VLQ_MAX_BYTES,
    }))
}

/// Decode a variable length quantity at the start of `bytes`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_vlq(bytes: &[u8]) -> Result<(u32, usize), DecodeError> {
    let (rest, value) = parse_vlq(bytes)?;
    Ok((value, bytes.len() - rest.len()))
}

/// Parse a VLQ length followed by that many bytes
pub fn parse_vlq_sized_bytes(i: &[u8]) -> DecodeResult<'_, &[u8]> {
    let (i, len) = parse_vlq(i)?;
    take_exact(len as usize)(i)
}

#[cfg(test)]
pub(crate) fn encode_vlq(mut value: u32) -> Vec<u8> {
    let mut out = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        out.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.reverse();
    out
}
