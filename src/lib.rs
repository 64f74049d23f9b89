//! smfdump - Standard MIDI File structure decoder
//!
//! This library provides:
//! - Reading of header and track chunks from any byte source
//! - Lazy decoding of the delta-timed events of a track
//! - Interpretation of track name, copyright, tempo and end of track meta events
//!
//! # Example
//!
//! ```no_run
//! use smfdump::{parse_smf_data, EventKind};
//!
//! let file_data = std::fs::read("song.mid").unwrap();
//! let smf = parse_smf_data(&file_data).unwrap();
//! for event in smf.track(0).unwrap().events() {
//!     let event = event.unwrap();
//!     if let EventKind::Meta(meta) = event.kind {
//!         println!("{}: {:?}", meta.subtype, meta.value());
//!     }
//! }
//! ```

pub mod error;
pub mod parser;

// Re-export main types for convenience
pub use error::{DecodeError, SmfError};
pub use parser::{
    chunk_parser::{read_chunk, Chunk, HEADER_TAG, TRACK_TAG},
    event_parser::{Event, EventKind, EventStream, MetaEvent, META_EVENT_TAG},
    header_parser::{decode_header, Division, FileHeader},
    meta_parser::{interpret, MetaSubtype, MetaValue},
    primitive_parser::decode_vlq,
    smf_parser::{is_smf_data, parse_smf_data, Smf, SmfReader, Track},
};
