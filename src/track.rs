//! Per-track cursor state.
//!
//! One `TrackCursor` per track, stored in a fixed array owned by the
//! session — the Rust equivalent of the source's `MIDI_FILE_TRACK` struct
//! (`ptrNew`/`pBaseNew`/`pEndNew`/`pos`/`deltaTime`/`last_status`).

use crate::cache::FileCache;
use crate::error::SmfError;
use std::io::{Read, Seek};

#[derive(Clone, Copy, Debug)]
pub struct TrackCursor {
    /// Absolute offset of the first event byte in this track's `MTrk` data.
    pub start: u64,
    /// Absolute offset one past the end of this track's `MTrk` data.
    pub end: u64,
    /// Absolute offset of the next event to decode.
    pub pos: u64,
    /// Running status byte carried across channel voice messages.
    pub running_status: u8,
    /// Absolute tick of the next undispatched event on this track.
    pub next_event_tick: u64,
    /// Set once this track's `EndOfTrack` meta event has been dispatched.
    pub finished: bool,
}

impl TrackCursor {
    pub fn is_finished(&self) -> bool {
        self.finished || self.pos >= self.end
    }
}

/// Parses one `MTrk` chunk header and returns a cursor positioned at its
/// first event. The source never verified this tag; this implementation
/// does, raising `SmfError::InvalidTrackTag` on mismatch.
pub fn parse_track_header<R: Read + Seek>(cache: &mut FileCache<R>) -> Result<TrackCursor, SmfError> {
    let tag = cache.read_tag()?;
    if &tag != b"MTrk" {
        return Err(SmfError::InvalidTrackTag(tag));
    }
    let length = cache.read_u32_be()? as u64;
    let start = cache.position();
    Ok(TrackCursor {
        start,
        end: start + length,
        pos: start,
        running_status: 0,
        next_event_tick: 0,
        finished: length == 0,
    })
}
