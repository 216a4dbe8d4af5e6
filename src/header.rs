//! SMF header chunk (`MThd`).

use crate::cache::FileCache;
use crate::config::MAX_TRACKS;
use crate::error::SmfError;
use std::io::{Read, Seek};

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Format {
    /// Single multi-channel track.
    Zero,
    /// One or more simultaneous tracks.
    One,
}

impl Format {
    fn from_u16(value: u16) -> Result<Format, SmfError> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            other => Err(SmfError::UnsupportedFormat(other)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SmfHeader {
    pub format: Format,
    pub track_count: u16,
    pub ticks_per_quarter_note: u16,
}

/// Parses the `MThd` chunk at the current cache position. Per the design's
/// invitation to tighten what the source left loose, this does verify the
/// tag, unlike the track-chunk path in the source reader it was lifted from.
pub fn parse_header<R: Read + Seek>(cache: &mut FileCache<R>) -> Result<SmfHeader, SmfError> {
    let tag = cache.read_tag()?;
    if &tag != b"MThd" {
        return Err(SmfError::InvalidHeaderTag(tag));
    }
    let identify_code = cache.read_u32_be()?;
    if identify_code != 6 {
        return Err(SmfError::InvalidIdentifyCode(identify_code));
    }
    let format = Format::from_u16(cache.read_u16_be()?)?;
    let track_count = cache.read_u16_be()?;
    if track_count as usize > MAX_TRACKS {
        return Err(SmfError::TooManyTracks(track_count));
    }
    let division = cache.read_u16_be()?;
    if division & 0x8000 != 0 {
        return Err(SmfError::UnsupportedDivision(division));
    }
    Ok(SmfHeader {
        format,
        track_count,
        ticks_per_quarter_note: division,
    })
}
