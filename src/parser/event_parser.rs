use crate::error::{DecodeError, SmfError};
use crate::parser::meta_parser::{interpret, MetaSubtype, MetaValue};
use crate::parser::primitive_parser::{parse_u8, parse_vlq, parse_vlq_sized_bytes, DecodeResult};
use std::fmt;
use std::iter::FusedIterator;

/// Event tag of meta events
pub const META_EVENT_TAG: u8 = 0xFF;

/// Meta event borrowing its payload from the track buffer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MetaEvent<'a> {
    pub subtype: MetaSubtype,
    pub payload: &'a [u8],
}

impl MetaEvent<'_> {
    pub fn value(&self) -> Result<MetaValue, DecodeError> {
        interpret(self.subtype, self.payload)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind<'a> {
    Meta(MetaEvent<'a>),
    /// Any non meta event tag, its payload is not decoded
    Unsupported(u8),
}

impl EventKind<'_> {
    pub const fn name(&self) -> &'static str {
        match self {
            EventKind::Meta(_) => "Meta Event",
            EventKind::Unsupported(_) => "Unsupported Event",
        }
    }
}

impl fmt::Display for EventKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventKind::Meta(meta) => write!(f, "{}: {}", self.name(), meta.subtype),
            EventKind::Unsupported(tag) => write!(f, "{} 0x{tag:02X}", self.name()),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Event<'a> {
    /// Byte offset of the event in the track payload
    pub offset: usize,
    pub delta_time: u32,
    /// Sum of delta times up to and including this event
    pub tick: u64,
    pub kind: EventKind<'a>,
}

impl<'a> Event<'a> {
    pub const fn meta(&self) -> Option<&MetaEvent<'a>> {
        match &self.kind {
            EventKind::Meta(meta) => Some(meta),
            EventKind::Unsupported(_) => None,
        }
    }

    /// Semantic value of a meta event, `Unsupported` for any other event
    pub fn meta_value(&self) -> Result<MetaValue, DecodeError> {
        match &self.kind {
            EventKind::Meta(meta) => meta.value(),
            EventKind::Unsupported(tag) => Err(DecodeError::Unsupported { tag: *tag }),
        }
    }

    pub fn is_end_of_track(&self) -> bool {
        self.meta()
            .is_some_and(|meta| meta.subtype == MetaSubtype::EndOfTrack)
    }
}

/// Parse delta time, tag and for meta events the subtype and payload.
///
/// Returns the rest after the event tag for non meta events.
pub fn parse_event(i: &[u8]) -> DecodeResult<'_, (u32, EventKind<'_>)> {
    let (i, delta_time) = parse_vlq(i)?;
    let (i, event_type) = parse_u8(i)?;
    if event_type != META_EVENT_TAG {
        return Ok((i, (delta_time, EventKind::Unsupported(event_type))));
    }
    let (i, subtype) = parse_u8(i)?;
    let (i, payload) = parse_vlq_sized_bytes(i)?;
    let meta = MetaEvent {
        subtype: MetaSubtype::from_byte(subtype),
        payload,
    };
    Ok((i, (delta_time, EventKind::Meta(meta))))
}

/// Lazy decoder of the events in a track payload.
///
/// Ends when the buffer is exhausted, after an end of track meta event,
/// after an unsupported event or after the first error.
/// Unrecognized meta subtypes also end the stream unless
/// [`EventStream::skip_unknown_meta`] is set.
#[derive(Debug, Clone)]
pub struct EventStream<'a> {
    track: usize,
    data: &'a [u8],
    rest: &'a [u8],
    tick: u64,
    skip_unknown_meta: bool,
    done: bool,
}

impl<'a> EventStream<'a> {
    pub const fn new(track: usize, data: &'a [u8]) -> Self {
        Self {
            track,
            data,
            rest: data,
            tick: 0,
            skip_unknown_meta: false,
            done: false,
        }
    }

    /// Continue past meta events with an unrecognized subtype
    #[must_use]
    pub fn skip_unknown_meta(mut self, skip: bool) -> Self {
        self.skip_unknown_meta = skip;
        self
    }

    /// Current read offset in the track payload
    pub const fn offset(&self) -> usize {
        self.data.len() - self.rest.len()
    }

    fn halts_on(&self, kind: &EventKind) -> bool {
        match kind {
            EventKind::Unsupported(tag) => {
                log::warn!(
                    "Track {}: halting on unsupported event 0x{tag:02X} at offset {}",
                    self.track,
                    self.offset()
                );
                true
            }
            EventKind::Meta(meta) => match meta.subtype {
                MetaSubtype::EndOfTrack => true,
                MetaSubtype::Unrecognized(code) if !self.skip_unknown_meta => {
                    log::warn!(
                        "Track {}: halting on unsupported meta event 0x{code:02X} at offset {}",
                        self.track,
                        self.offset()
                    );
                    true
                }
                _ => false,
            },
        }
    }
}

impl<'a> Iterator for EventStream<'a> {
    type Item = Result<Event<'a>, SmfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.rest.is_empty() {
            return None;
        }
        let offset = self.offset();
        match parse_event(self.rest) {
            Ok((rest, (delta_time, kind))) => {
                self.done = self.halts_on(&kind);
                self.rest = rest;
                self.tick += u64::from(delta_time);
                log::debug!("Track {} offset {offset}: delta={delta_time} {kind}", self.track);
                Some(Ok(Event {
                    offset,
                    delta_time,
                    tick: self.tick,
                    kind,
                }))
            }
            Err(err) => {
                self.done = true;
                Some(Err(SmfError::Event {
                    track: self.track,
                    offset,
                    source: err.into(),
                }))
            }
        }
    }
}

impl FusedIterator for EventStream<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::primitive_parser::encode_vlq;

    fn meta(subtype: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![META_EVENT_TAG, subtype];
        out.extend(encode_vlq(payload.len() as u32));
        out.extend_from_slice(payload);
        out
    }

    fn event(delta: u32, body: Vec<u8>) -> Vec<u8> {
        let mut out = encode_vlq(delta);
        out.extend(body);
        out
    }

    fn collect(data: &[u8]) -> Vec<Result<Event<'_>, SmfError>> {
        EventStream::new(0, data).collect()
    }

    #[test]
    fn test_parse_meta_event() {
        let data = event(0x60, meta(0x03, b"Piano"));
        let (rest, (delta, kind)) = parse_event(&data).unwrap();
        assert!(rest.is_empty());
        assert_eq!(delta, 0x60);
        assert_eq!(
            kind,
            EventKind::Meta(MetaEvent {
                subtype: MetaSubtype::TrackName,
                payload: b"Piano"
            })
        );
    }

    #[test]
    fn test_stream_stops_after_end_of_track() {
        let mut data = event(0, meta(0x03, b"Piano"));
        data.extend(event(0, meta(0x51, &[0x07, 0xA1, 0x20])));
        data.extend(event(10, meta(0x2F, &[])));
        data.extend(event(0, meta(0x01, b"after")));

        let events: Vec<Event> = collect(&data).into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0].meta().unwrap().value(),
            Ok(MetaValue::TrackName("Piano".to_string()))
        );
        assert_eq!(
            events[1].meta().unwrap().value(),
            Ok(MetaValue::TempoBpm(120))
        );
        assert!(events[2].is_end_of_track());
        assert_eq!(events[2].delta_time, 10);
        assert_eq!(events[2].tick, 10);
        assert_eq!(events[1].offset, 9);
        assert_eq!(events[2].offset, 16);
    }

    #[test]
    fn test_stream_ends_with_buffer() {
        let mut data = event(0, meta(0x01, b"a"));
        data.extend(event(0x81, meta(0x05, b"la")));
        let events: Vec<Event> = collect(&data).into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].delta_time, 0x81);
        assert_eq!(events[1].tick, 0x81);
        assert!(collect(&[]).is_empty());
    }

    #[test]
    fn test_stream_halts_on_unsupported_event() {
        let mut data = event(0, meta(0x03, b"Bass"));
        // note on, channel 0
        data.extend(event(0x80, vec![0x90, 0x3C, 0x40]));
        data.extend(event(0, meta(0x2F, &[])));

        let events: Vec<Event> = collect(&data).into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, EventKind::Unsupported(0x90));
        assert_eq!(events[1].delta_time, 0x80);
        assert_eq!(events[1].kind.to_string(), "Unsupported Event 0x90");
        assert_eq!(
            events[1].meta_value(),
            Err(DecodeError::Unsupported { tag: 0x90 })
        );
    }

    #[test]
    fn test_stream_halts_on_unrecognized_meta() {
        let mut data = event(0, meta(0x58, &[4, 2, 24, 8]));
        data.extend(event(0, meta(0x03, b"Lead")));
        data.extend(event(0, meta(0x2F, &[])));

        let events: Vec<Event> = collect(&data).into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].meta().unwrap().subtype,
            MetaSubtype::Unrecognized(0x58)
        );

        let skipping: Vec<Event> = EventStream::new(0, &data)
            .skip_unknown_meta(true)
            .map(Result::unwrap)
            .collect();
        assert_eq!(skipping.len(), 3);
        assert!(skipping[2].is_end_of_track());
    }

    #[test]
    fn test_stream_aborts_on_truncated_payload() {
        let mut data = event(0, meta(0x03, b"Piano"));
        data.extend_from_slice(&[0x00, 0xFF, 0x01, 0x10, b'x']);

        let results = collect(&data);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(SmfError::Event {
                track: 0,
                offset: 9,
                source: DecodeError::TruncatedInput {
                    needed: 16,
                    available: 1
                }
            })
        );
    }

    #[test]
    fn test_stream_aborts_on_malformed_delta() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x2F, 0x00];
        let results = collect(&data);
        assert_eq!(
            results,
            vec![Err(SmfError::Event {
                track: 0,
                offset: 0,
                source: DecodeError::MalformedVlq { consumed: 5 }
            })]
        );
    }

    #[test]
    fn test_stream_aborts_on_missing_tag() {
        let results = collect(&[0x81, 0x00]);
        assert_eq!(
            results,
            vec![Err(SmfError::Event {
                track: 0,
                offset: 0,
                source: DecodeError::TruncatedInput {
                    needed: 1,
                    available: 0
                }
            })]
        );
    }

    #[test]
    fn test_fresh_streams_are_identical() {
        let mut data = event(0, meta(0x02, b"ACME"));
        data.extend(event(0x60, meta(0x51, &[0x07, 0xA1, 0x20])));
        data.extend(event(0, meta(0x2F, &[])));
        assert_eq!(collect(&data), collect(&data));
    }
}
