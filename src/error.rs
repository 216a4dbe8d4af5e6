//! Error taxonomy for the SMF core.
//!
//! Only malformations that make a file fundamentally unplayable reach this
//! enum. Everything else in the design's error taxonomy (short reads mid
//! track, truncated meta payloads, clock anomalies, fixed-point overflow,
//! excessive scheduling jitter) is recoverable and is only ever reported
//! through the `log` facade; see `Session::open` and `Session::tick`.

use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum SmfError {
    Io(io::Error),
    InvalidHeaderTag([u8; 4]),
    InvalidIdentifyCode(u32),
    UnsupportedFormat(u16),
    UnsupportedDivision(u16),
    TooManyTracks(u16),
    InvalidTrackTag([u8; 4]),
    MalformedVlq,
}

impl fmt::Display for SmfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SmfError::Io(ref err) => err.fmt(f),
            SmfError::InvalidHeaderTag(tag) => {
                write!(f, "invalid header tag '{:?}', expected MThd", tag)
            }
            SmfError::InvalidIdentifyCode(code) => {
                write!(f, "invalid SMF identify code '{}' at header, expected 6", code)
            }
            SmfError::UnsupportedFormat(format) => {
                write!(f, "unsupported SMF format '{}', only 0 and 1 are supported", format)
            }
            SmfError::UnsupportedDivision(division) => {
                write!(f, "unsupported division '{:#06x}', SMPTE time code is not supported", division)
            }
            SmfError::TooManyTracks(track_count) => {
                write!(f, "header declares {} tracks, more than the compiled-in limit", track_count)
            }
            SmfError::InvalidTrackTag(tag) => {
                write!(f, "invalid track tag '{:?}', expected MTrk", tag)
            }
            SmfError::MalformedVlq => write!(f, "variable length quantity exceeded 4 bytes"),
        }
    }
}

impl error::Error for SmfError {
    fn description(&self) -> &str {
        match *self {
            SmfError::Io(ref err) => err.description(),
            SmfError::InvalidHeaderTag(..) => "this file doesn't follow SMF format",
            SmfError::InvalidIdentifyCode(..) => "this file doesn't follow SMF format",
            SmfError::UnsupportedFormat(..) => "only SMF format 0 and 1 are supported",
            SmfError::UnsupportedDivision(..) => "SMPTE divisions are not supported",
            SmfError::TooManyTracks(..) => "track count exceeds the compiled-in limit",
            SmfError::InvalidTrackTag(..) => "this file doesn't follow SMF format",
            SmfError::MalformedVlq => "variable length quantity exceeded 4 bytes",
        }
    }
}

impl From<io::Error> for SmfError {
    fn from(err: io::Error) -> SmfError {
        SmfError::Io(err)
    }
}
