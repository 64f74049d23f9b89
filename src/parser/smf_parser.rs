use crate::error::SmfError;
use crate::parser::chunk_parser::{at_end, read_chunk, HEADER_TAG, TRACK_TAG};
use crate::parser::event_parser::EventStream;
use crate::parser::header_parser::{decode_header, FileHeader};
use std::io::Read;

/// Raw payload of a track chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Position among the track chunks, 0-based
    pub index: usize,
    pub data: Vec<u8>,
}

impl Track {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Fresh event decoder over the track payload
    pub fn events(&self) -> EventStream<'_> {
        EventStream::new(self.index, &self.data)
    }
}

/// Sequential reader over a Standard MIDI File source.
///
/// The header is decoded on creation, track chunks are then read on demand.
pub struct SmfReader<R> {
    source: R,
    header: FileHeader,
    next_index: usize,
    done: bool,
}

impl<R: Read> SmfReader<R> {
    pub fn new(mut source: R) -> Result<Self, SmfError> {
        let chunk = read_chunk(&mut source).map_err(SmfError::Header)?;
        let header = decode_header(&chunk).map_err(SmfError::Header)?;
        log::debug!(
            "MIDI file type {} with {} tracks",
            header.format_type,
            header.track_count
        );
        Ok(Self {
            source,
            header,
            next_index: 0,
            done: false,
        })
    }

    pub const fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Read the next track chunk, skipping chunks of other types.
    ///
    /// Returns `None` once `track_count` tracks were read or after an error.
    pub fn next_track(&mut self) -> Option<Result<Track, SmfError>> {
        if self.done || self.next_index >= usize::from(self.header.track_count) {
            return None;
        }
        let index = self.next_index;
        loop {
            let chunk = match read_chunk(&mut self.source) {
                Ok(chunk) => chunk,
                Err(source) => {
                    self.done = true;
                    return Some(Err(SmfError::Track { index, source }));
                }
            };
            if chunk.tag != TRACK_TAG {
                log::warn!(
                    "Skipping {} chunk of {} bytes before track {index}",
                    chunk.tag_name(),
                    chunk.length()
                );
                continue;
            }
            log::debug!("Track {index} of {} bytes", chunk.length());
            self.next_index += 1;
            return Some(Ok(Track {
                index,
                data: chunk.data,
            }));
        }
    }

    /// Whether bytes remain after the last read chunk, consuming at most one
    pub fn has_trailing_data(&mut self) -> Result<bool, SmfError> {
        at_end(&mut self.source)
            .map(|end| !end)
            .map_err(|source| SmfError::Track {
                index: self.next_index,
                source,
            })
    }
}

impl<R: Read> Iterator for SmfReader<R> {
    type Item = Result<Track, SmfError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_track()
    }
}

/// Fully decoded file structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smf {
    pub header: FileHeader,
    pub tracks: Vec<Track>,
}

impl Smf {
    pub fn read<R: Read>(source: R) -> Result<Self, SmfError> {
        let mut reader = SmfReader::new(source)?;
        let header = *reader.header();
        let tracks = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
        if reader.has_trailing_data()? {
            log::debug!("Ignoring data after track {}", tracks.len());
        }
        Ok(Self { header, tracks })
    }

    pub fn track(&self, index: usize) -> Result<&Track, SmfError> {
        self.tracks.get(index).ok_or(SmfError::TrackNotFound {
            index,
            track_count: self.tracks.len(),
        })
    }
}

/// Decode a whole file held in memory
pub fn parse_smf_data(file_data: &[u8]) -> Result<Smf, SmfError> {
    Smf::read(file_data).inspect_err(|err| log::error!("Failed to parse MIDI data: {err}"))
}

/// Whether the data starts with a MIDI header tag
pub fn is_smf_data(file_data: &[u8]) -> bool {
    file_data.starts_with(&HEADER_TAG)
}
