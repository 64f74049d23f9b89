use serde::Serialize;
use smfdump::{Event, EventKind, FileHeader, SmfError, SmfReader, Track};
use std::fmt;
use std::io::Read;

#[derive(Debug, Serialize)]
pub struct HeaderReport {
    pub format_type: u16,
    pub track_count: u16,
    pub division_type: &'static str,
    pub division_value: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_per_second: Option<u8>,
}

impl From<&FileHeader> for HeaderReport {
    fn from(header: &FileHeader) -> Self {
        Self {
            format_type: header.format_type,
            track_count: header.track_count,
            division_type: header.division.type_name(),
            division_value: header.division.raw_value(),
            frames_per_second: header.division.frames_per_second(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackSummary {
    pub index: usize,
    pub size: usize,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        Self {
            index: track.index,
            size: track.size(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetaReport {
    pub subtype: String,
    pub code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventReport {
    pub offset: usize,
    pub delta_time: u32,
    pub tick: u64,
    pub event_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaReport>,
}

impl From<&Event<'_>> for EventReport {
    fn from(event: &Event<'_>) -> Self {
        let (tag, meta) = match &event.kind {
            EventKind::Unsupported(tag) => (Some(*tag), None),
            EventKind::Meta(meta) => {
                // interpretation failures stay local to the event
                let (value, error) = match meta.value() {
                    Ok(value) => (Some(value.to_string()), None),
                    Err(err) => {
                        log::warn!("Meta event at offset {}: {err}", event.offset);
                        (None, Some(err.to_string()))
                    }
                };
                let report = MetaReport {
                    subtype: meta.subtype.to_string(),
                    code: meta.subtype.code(),
                    value,
                    error,
                };
                (None, Some(report))
            }
        };
        Self {
            offset: event.offset,
            delta_time: event.delta_time,
            tick: event.tick,
            event_type: event.kind.name(),
            tag,
            meta,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    List {
        header: HeaderReport,
        tracks: Vec<TrackSummary>,
    },
    Track {
        header: HeaderReport,
        track: TrackSummary,
        events: Vec<EventReport>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Report plus the error that aborted event decoding, if any
pub struct TrackOutcome {
    pub report: Report,
    pub error: Option<SmfError>,
}

/// Header summary and the size of every track
pub fn list<R: Read>(reader: SmfReader<R>) -> Result<Report, SmfError> {
    let header = HeaderReport::from(reader.header());
    let tracks = reader
        .map(|track| track.map(|t| TrackSummary::from(&t)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Report::List { header, tracks })
}

/// Header summary and the decoded events of track `index`
pub fn track<R: Read>(
    mut reader: SmfReader<R>,
    index: usize,
    skip_unknown_meta: bool,
) -> Result<TrackOutcome, SmfError> {
    let header = *reader.header();
    let track_count = usize::from(header.track_count);
    if index >= track_count {
        return Err(SmfError::TrackNotFound { index, track_count });
    }
    let track = loop {
        match reader.next_track() {
            Some(track) => {
                let track = track?;
                if track.index == index {
                    break track;
                }
            }
            None => return Err(SmfError::TrackNotFound { index, track_count }),
        }
    };

    let mut events = vec![];
    let mut error = None;
    for event in track.events().skip_unknown_meta(skip_unknown_meta) {
        match event {
            Ok(event) => events.push(EventReport::from(&event)),
            Err(err) => error = Some(err),
        }
    }
    let report = Report::Track {
        header: HeaderReport::from(&header),
        track: TrackSummary::from(&track),
        events,
        error: error.as_ref().map(ToString::to_string),
    };
    Ok(TrackOutcome { report, error })
}

impl fmt::Display for HeaderReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "MIDI File, Type {}.", self.format_type)?;
        writeln!(f, "Tracks: {}", self.track_count)?;
        writeln!(f, "Time Division:")?;
        writeln!(f, "\tType: {}", self.division_type)?;
        writeln!(f, "\tValue: {}", self.division_value)?;
        if let Some(fps) = self.frames_per_second {
            writeln!(f, "\tFrames per second: {fps}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TrackSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Track {}", self.index)?;
        writeln!(f, "Track Size: {}", self.size)
    }
}

impl fmt::Display for EventReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] delta={} tick={} {}",
            self.offset, self.delta_time, self.tick, self.event_type
        )?;
        if let Some(tag) = self.tag {
            write!(f, " 0x{tag:02X}")?;
        }
        if let Some(meta) = &self.meta {
            write!(f, ": {}", meta.subtype)?;
            if let Some(value) = &meta.value {
                write!(f, " -> {value}")?;
            }
            if let Some(error) = &meta.error {
                write!(f, " -> error: {error}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::List { header, tracks } => {
                write!(f, "{header}")?;
                for track in tracks {
                    write!(f, "\n{track}")?;
                }
            }
            Self::Track {
                header,
                track,
                events,
                error,
            } => {
                write!(f, "{header}\n{track}")?;
                for event in events {
                    writeln!(f, "{event}")?;
                }
                if let Some(error) = error {
                    writeln!(f, "Decoding aborted: {error}")?;
                }
            }
        }
        Ok(())
    }
}
